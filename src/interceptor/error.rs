//! Error interceptor - replaces error values in `error` events with their
//! exposed JSON form.
//!
//! Only `data` itself and the first level of a `data` field mapping are
//! scanned. Errors nested deeper are left alone.

use super::Interceptor;
use crate::domain::{Event, EventData, Field, Level};
use crate::expose::{ExposeConfig, expose};
use tracing::trace;

#[derive(Debug, Clone, Default)]
pub struct ErrorInterceptor {
    config: ExposeConfig,
}

impl ErrorInterceptor {
    pub fn new(config: ExposeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExposeConfig {
        &self.config
    }
}

impl Interceptor for ErrorInterceptor {
    fn intercept(&self, mut event: Event) -> Event {
        if event.level != Level::Error {
            return event;
        }

        if let EventData::Error(error) = &event.data {
            trace!(event = %event.event, "Exposing error payload");
            let exposed = expose(error.as_ref(), &self.config);
            event.data = EventData::Value(exposed);
            return event;
        }

        if let EventData::Fields(fields) = &mut event.data {
            for field in fields.values_mut() {
                let exposed = match field {
                    Field::Error(error) => expose(error.as_ref(), &self.config),
                    Field::Value(_) => continue,
                };
                *field = Field::Value(exposed);
            }
        }

        event
    }

    fn name(&self) -> &'static str {
        "error"
    }
}

/// Build the error interceptor as a plain transform function.
pub fn error_interceptor(config: Option<ExposeConfig>) -> impl Fn(Event) -> Event + Send + Sync {
    let interceptor = ErrorInterceptor::new(config.unwrap_or_default());
    move |event| interceptor.intercept(event)
}
