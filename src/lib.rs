#![deny(rust_2024_compatibility)]
// Specific pedantic lints enforced (not blanket allow):
#![deny(
    clippy::explicit_iter_loop,
    clippy::manual_let_else,
    clippy::semicolon_if_nothing_returned,
    clippy::inconsistent_struct_constructor
)]
#![allow(
    clippy::missing_errors_doc,      // Internal API
    clippy::module_name_repetitions, // e.g. ConfigError in config module
    clippy::must_use_candidate,      // Annotated selectively on critical APIs
    clippy::doc_markdown
)]

pub mod config;
pub mod domain;
pub mod expose;
pub mod interceptor;
pub mod logger;
pub mod logging;
pub mod sender;

// Re-export main types for easy access
pub use config::{ConfigError, LoggerConfig};
pub use domain::{Event, EventData, Field, Fields, Level};
pub use expose::{
    CapturedError, ErrorLike, ExposeConfig, Property, PropertyError, PropertyValue, expose,
};
pub use interceptor::{ErrorInterceptor, Interceptor, InterceptorChain, error_interceptor};
pub use logger::{Logger, LoggerOptions};
pub use sender::{Batch, HttpTransport, HttpTransportConfig, Transport, TransportError};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
