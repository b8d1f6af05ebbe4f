//! Block identity
//!
//! Every data block carries a [`BlockCore`]: a unique id, a display name, a
//! non-owning back-link to the aggregate or crate that holds it, and an
//! optional weak handle to a consumer. The [`Block`] trait exposes this
//! identity uniformly over all variants.

use std::fmt;

use uuid::Uuid;

use crate::depict::DepictorHandle;

/// Name given to blocks constructed without one
pub const UNNAMED: &str = "unnamed";

/// Unique identity of a block within a session
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BlockId(Uuid);

impl BlockId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identity shared by every block
#[derive(Debug)]
pub struct BlockCore {
    id: BlockId,
    name: String,
    parent: Option<BlockId>,
    depictor: Option<DepictorHandle>,
}

impl BlockCore {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: BlockId::new(),
            name: name.into(),
            parent: None,
            depictor: None,
        }
    }

    pub fn unnamed() -> Self {
        Self::new(UNNAMED)
    }

    pub fn id(&self) -> BlockId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Back-link to the aggregate or crate holding this block, if any.
    /// Lookup only; never implies ownership.
    pub fn parent(&self) -> Option<BlockId> {
        self.parent
    }

    pub(crate) fn set_parent(&mut self, parent: Option<BlockId>) {
        self.parent = parent;
    }

    pub fn attach_depictor(&mut self, handle: DepictorHandle) {
        self.depictor = Some(handle);
    }

    pub fn detach_depictor(&mut self) {
        self.depictor = None;
    }

    /// Synchronously notify the attached consumer, if any, that data
    /// changed. A missing or dropped consumer makes this a no-op.
    pub fn notify(&self) {
        if let Some(handle) = &self.depictor {
            if let Some(depictor) = handle.upgrade() {
                tracing::trace!(block = %self.id, name = %self.name, "notifying consumer");
                depictor.update();
            }
        }
    }
}

/// Behavior shared by every data block
pub trait Block {
    fn core(&self) -> &BlockCore;
    fn core_mut(&mut self) -> &mut BlockCore;

    fn id(&self) -> BlockId {
        self.core().id()
    }

    fn name(&self) -> &str {
        self.core().name()
    }

    fn set_name(&mut self, name: String) {
        self.core_mut().set_name(name);
    }

    fn parent(&self) -> Option<BlockId> {
        self.core().parent()
    }

    fn attach_depictor(&mut self, handle: DepictorHandle) {
        self.core_mut().attach_depictor(handle);
    }

    fn detach_depictor(&mut self) {
        self.core_mut().detach_depictor();
    }
}
