//! Update channel between blocks and their consumers
//!
//! A block optionally holds a weak, non-owning handle to a consumer (a
//! depictor in the rendering layer). Every successful payload mutation
//! invokes the consumer synchronously, carrying no payload: the consumer
//! re-reads state from the block. There is no batching: one mutation, one
//! notification, even under high-frequency updates.

use std::rc::{Rc, Weak};

/// Capability a consumer attached to a block must implement.
pub trait Depict {
    /// Called with no arguments whenever the block's data changes.
    fn update(&self);
}

/// Non-owning handle to a consumer.
///
/// The handle never keeps a dropped consumer alive and must never be used to
/// infer ownership; notification silently becomes a no-op once the consumer
/// is gone.
pub type DepictorHandle = Weak<dyn Depict>;

/// Downgrade a strong consumer reference into an attachable handle.
pub fn handle<D: Depict + 'static>(depictor: &Rc<D>) -> DepictorHandle {
    let weak: Weak<D> = Rc::downgrade(depictor);
    weak
}
