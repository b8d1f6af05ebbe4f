//! Deferred payloads
//!
//! Volumetric data is often too large to materialize eagerly. A
//! [`LazyArray`] is either a materialized array or a loader invoked by an
//! explicit resolve step; consumers always know which state they hold.

use std::fmt;

use ndarray::ArrayD;

/// An image payload that is either materialized or produced on demand
pub enum LazyArray {
    /// Materialized payload
    Eager(ArrayD<f64>),

    /// Payload produced by an explicit resolve step
    Deferred(Box<dyn Fn() -> ArrayD<f64>>),
}

impl LazyArray {
    /// Wrap a loader to be invoked on first resolve.
    pub fn deferred(loader: impl Fn() -> ArrayD<f64> + 'static) -> Self {
        LazyArray::Deferred(Box::new(loader))
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, LazyArray::Eager(_))
    }

    /// Materialize the payload in place and return it. Resolving an already
    /// materialized payload is free; the loader runs at most once.
    pub fn resolve(&mut self) -> &ArrayD<f64> {
        if let LazyArray::Deferred(loader) = self {
            let data = loader();
            *self = LazyArray::Eager(data);
        }
        match self {
            LazyArray::Eager(data) => data,
            LazyArray::Deferred(_) => unreachable!("payload was just materialized"),
        }
    }

    /// The payload, if already materialized.
    pub fn peek(&self) -> Option<&ArrayD<f64>> {
        match self {
            LazyArray::Eager(data) => Some(data),
            LazyArray::Deferred(_) => None,
        }
    }
}

impl From<ArrayD<f64>> for LazyArray {
    fn from(data: ArrayD<f64>) -> Self {
        LazyArray::Eager(data)
    }
}

impl fmt::Debug for LazyArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LazyArray::Eager(data) => write!(f, "Eager{:?}", data.shape()),
            LazyArray::Deferred(_) => write!(f, "Deferred"),
        }
    }
}
