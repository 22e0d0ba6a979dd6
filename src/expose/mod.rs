//! Error exposer.
//!
//! Errors carry most of their useful data in properties that standard
//! serialization skips (`message` and `stack` are non-enumerable, `name` is
//! usually inherited). `expose` turns an error-like value into a plain JSON
//! object that can be shipped with an event:
//!
//! 1. A custom override (`ErrorLike::to_json`) wins outright.
//! 2. Otherwise the own-properties walk (optional) is merged with the
//!    whitelist capture, the whitelist overriding on shared keys.

mod captured;
mod error_like;
mod render;

pub use captured::CapturedError;
pub use error_like::{ErrorLike, Property, PropertyError, PropertyValue};
pub use render::MAX_DEPTH;

pub(crate) use render::standard_error;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

/// Options for `expose`. Unknown keys are ignored when deserializing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExposeConfig {
    /// Walk and include own properties beyond the whitelist.
    #[serde(alias = "getOwnProperties", alias = "expose_own_properties")]
    pub expose_own_properties: bool,
    /// Names always captured, regardless of enumerability. Nested objects
    /// and errors under these names keep only these names too.
    pub whitelist: Vec<String>,
}

impl Default for ExposeConfig {
    fn default() -> Self {
        Self {
            expose_own_properties: true,
            whitelist: vec![
                "message".to_string(),
                "name".to_string(),
                "stack".to_string(),
            ],
        }
    }
}

impl ExposeConfig {
    pub fn with_own_properties(mut self, enabled: bool) -> Self {
        self.expose_own_properties = enabled;
        self
    }

    pub fn with_whitelist<I, S>(mut self, whitelist: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.whitelist = whitelist.into_iter().map(Into::into).collect();
        self
    }
}

/// Convert an error-like value into a plain JSON object. Never fails.
pub fn expose(error: &dyn ErrorLike, config: &ExposeConfig) -> Value {
    match error.to_json() {
        Some(Ok(value)) => return value,
        Some(Err(e)) => {
            warn!(
                name = error.name(),
                error = %e,
                "Custom error serialization failed, capturing properties instead"
            );
        }
        None => {}
    }

    let mut exposed = if config.expose_own_properties {
        render::own_properties(error)
    } else {
        Map::new()
    };

    for (key, value) in render::whitelisted(error, &config.whitelist, 0) {
        exposed.insert(key, value);
    }

    Value::Object(exposed)
}
