pub mod http;
pub mod serialization;

pub use http::{HttpTransport, HttpTransportConfig};
pub use serialization::{BatchSerializer, SerializationError};

use crate::domain::Event;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Transport queue full, batch {0} dropped")]
    QueueFull(String),
    #[error("Transport closed")]
    Closed,
    #[error("Serialization failed: {0}")]
    Serialization(#[from] SerializationError),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP error: {status}")]
    HttpError { status: u16 },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Events flushed together from one logger.
#[derive(Debug, Clone)]
pub struct Batch {
    id: String,
    events: Vec<Event>,
}

impl Batch {
    pub fn new(events: Vec<Event>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            events,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn size(&self) -> usize {
        self.events.len()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn into_events(self) -> Vec<Event> {
        self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Destination for flushed batches.
///
/// `deliver` must not block the logging caller; implementations hand the
/// batch off and report only hand-off failures.
pub trait Transport: Send + Sync {
    fn deliver(&self, batch: Batch) -> Result<(), TransportError>;
}

impl<F> Transport for F
where
    F: Fn(Batch) -> Result<(), TransportError> + Send + Sync,
{
    fn deliver(&self, batch: Batch) -> Result<(), TransportError> {
        self(batch)
    }
}
