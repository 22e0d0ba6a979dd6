//! Interceptors - per-event transforms applied before an event is queued.
//!
//! Interceptors run in the order they were added, each receiving the output
//! of the previous one:
//!
//! ```text
//! [Event] → [Interceptor 1] → [Interceptor 2] → ... → [Event']
//! ```
//!
//! Interceptors are infallible; anything that cannot be handled is left as-is.

mod error;

pub use error::{ErrorInterceptor, error_interceptor};

use crate::domain::Event;
use std::sync::Arc;

/// A synchronous event transform.
///
/// Implemented for plain closures so callers can add ad-hoc stages.
pub trait Interceptor: Send + Sync {
    fn intercept(&self, event: Event) -> Event;

    /// Name of this interceptor for logging
    fn name(&self) -> &'static str {
        "anonymous"
    }
}

impl<F> Interceptor for F
where
    F: Fn(Event) -> Event + Send + Sync,
{
    fn intercept(&self, event: Event) -> Event {
        self(event)
    }
}

/// Ordered list of interceptors.
#[derive(Clone, Default)]
pub struct InterceptorChain {
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl InterceptorChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an interceptor to the end of the chain.
    pub fn with<I: Interceptor + 'static>(mut self, interceptor: I) -> Self {
        self.push(interceptor);
        self
    }

    pub fn push<I: Interceptor + 'static>(&mut self, interceptor: I) {
        self.interceptors.push(Arc::new(interceptor));
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.interceptors.iter().map(|i| i.name()).collect()
    }

    /// Run the event through every interceptor in order.
    pub fn apply(&self, event: Event) -> Event {
        self.interceptors
            .iter()
            .fold(event, |current, interceptor| interceptor.intercept(current))
    }
}

impl std::fmt::Debug for InterceptorChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterceptorChain")
            .field("interceptors", &self.names())
            .finish()
    }
}
