//! Buffering logger.
//!
//! `log` builds an event, runs it through the interceptor chain and queues
//! it. `flush` hands everything queued to the transport as one batch. Levels
//! in the auto-flush set (by default only `error`) flush immediately.

use crate::config::LoggerConfig;
use crate::domain::{Event, EventData, Level};
use crate::interceptor::{ErrorInterceptor, InterceptorChain};
use crate::sender::{Batch, Transport, TransportError};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, trace, warn};

#[derive(Clone)]
pub struct LoggerOptions {
    pub client_id: Option<String>,
    pub interceptors: InterceptorChain,
    pub transport: Option<Arc<dyn Transport>>,
    pub auto_flush_levels: Vec<Level>,
}

impl Default for LoggerOptions {
    fn default() -> Self {
        Self {
            client_id: None,
            interceptors: InterceptorChain::new(),
            transport: None,
            auto_flush_levels: vec![Level::Error],
        }
    }
}

impl LoggerOptions {
    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    pub fn with_interceptors(mut self, interceptors: InterceptorChain) -> Self {
        self.interceptors = interceptors;
        self
    }

    pub fn with_transport<T: Transport + 'static>(mut self, transport: T) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    pub fn with_auto_flush_levels(mut self, levels: impl IntoIterator<Item = Level>) -> Self {
        self.auto_flush_levels = levels.into_iter().collect();
        self
    }
}

impl std::fmt::Debug for LoggerOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggerOptions")
            .field("client_id", &self.client_id)
            .field("interceptors", &self.interceptors)
            .field("transport", &self.transport.is_some())
            .field("auto_flush_levels", &self.auto_flush_levels)
            .finish()
    }
}

#[derive(Debug)]
pub struct Logger {
    name: String,
    options: LoggerOptions,
    events: Mutex<Vec<Event>>,
}

impl Logger {
    pub fn new(name: impl Into<String>, options: LoggerOptions) -> Self {
        Self {
            name: name.into(),
            options,
            events: Mutex::new(Vec::new()),
        }
    }

    /// Logger with an error interceptor configured from `config.errors`.
    pub fn from_config<T: Transport + 'static>(config: &LoggerConfig, transport: T) -> Self {
        let options = LoggerOptions {
            client_id: config.client_id.clone(),
            interceptors: InterceptorChain::new()
                .with(ErrorInterceptor::new(config.errors.clone())),
            transport: Some(Arc::new(transport)),
            auto_flush_levels: config.auto_flush_levels.clone(),
        };

        Self::new(config.service.clone(), options)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn options(&self) -> &LoggerOptions {
        &self.options
    }

    /// Number of events waiting for the next flush.
    pub fn pending(&self) -> usize {
        self.events.lock().len()
    }

    pub fn log(&self, level: Level, event: impl Into<String>, data: impl Into<EventData>) {
        let event = Event::new(level, event, data)
            .with_service(self.name.clone())
            .with_client_id(self.options.client_id.clone());

        let event = self.options.interceptors.apply(event);
        trace!(logger = %self.name, level = %level, event = %event.event, "Event queued");
        self.events.lock().push(event);

        if self.options.auto_flush_levels.contains(&level)
            && let Err(e) = self.flush()
        {
            warn!(logger = %self.name, error = %e, "Auto-flush failed");
        }
    }

    pub fn debug(&self, event: impl Into<String>, data: impl Into<EventData>) {
        self.log(Level::Debug, event, data);
    }

    pub fn info(&self, event: impl Into<String>, data: impl Into<EventData>) {
        self.log(Level::Info, event, data);
    }

    pub fn warn(&self, event: impl Into<String>, data: impl Into<EventData>) {
        self.log(Level::Warn, event, data);
    }

    pub fn error(&self, event: impl Into<String>, data: impl Into<EventData>) {
        self.log(Level::Error, event, data);
    }

    /// Hand all queued events to the transport as one batch.
    ///
    /// Returns how many events were handed off. The buffer is cleared even
    /// when the hand-off fails.
    pub fn flush(&self) -> Result<usize, TransportError> {
        let events = std::mem::take(&mut *self.events.lock());
        if events.is_empty() {
            return Ok(0);
        }

        let count = events.len();
        let Some(transport) = &self.options.transport else {
            debug!(logger = %self.name, dropped = count, "No transport configured, discarding events");
            return Ok(0);
        };

        let batch = Batch::new(events);
        debug!(logger = %self.name, batch_id = %batch.id(), events = count, "Flushing batch");
        transport.deliver(batch)?;
        Ok(count)
    }
}
