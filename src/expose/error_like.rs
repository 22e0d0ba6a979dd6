use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// A property getter that failed while being read.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("property getter failed: {0}")]
pub struct PropertyError(pub String);

impl PropertyError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

/// Value held by an own property of an error-like value.
#[derive(Debug, Clone)]
pub enum PropertyValue {
    /// Plain JSON data, captured as-is.
    Json(Value),
    /// A nested object described by its own properties.
    Object(Vec<Property>),
    /// A nested error-like value.
    Error(Arc<dyn ErrorLike>),
    /// A value with no JSON representation (callbacks, handles, ...).
    /// The string is only a description for debugging.
    Opaque(String),
}

impl From<Value> for PropertyValue {
    fn from(value: Value) -> Self {
        PropertyValue::Json(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Json(Value::String(value.to_string()))
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Json(Value::String(value))
    }
}

impl From<Vec<Property>> for PropertyValue {
    fn from(properties: Vec<Property>) -> Self {
        PropertyValue::Object(properties)
    }
}

impl<E: ErrorLike + 'static> From<Arc<E>> for PropertyValue {
    fn from(error: Arc<E>) -> Self {
        PropertyValue::Error(error)
    }
}

/// A property defined directly on a value, enumerable or not.
#[derive(Debug, Clone)]
pub struct Property {
    pub key: String,
    pub enumerable: bool,
    pub value: Result<PropertyValue, PropertyError>,
}

impl Property {
    /// An enumerable property.
    pub fn new(key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        Self {
            key: key.into(),
            enumerable: true,
            value: Ok(value.into()),
        }
    }

    /// A non-enumerable property, skipped by standard serialization.
    pub fn hidden(key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        Self {
            key: key.into(),
            enumerable: false,
            value: Ok(value.into()),
        }
    }

    /// A property whose getter fails when read.
    pub fn failing(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            enumerable: true,
            value: Err(PropertyError::new(reason)),
        }
    }
}

/// Capability shared by every value that represents a failure.
///
/// Anything exposing a `name`, `message` and `stack` qualifies; the exposer
/// never needs to know the concrete type.
pub trait ErrorLike: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    fn message(&self) -> &str;

    /// Stack text exactly as it was captured.
    fn stack(&self) -> &str;

    /// Every property defined directly on this value, in definition order.
    ///
    /// The default mirrors a bare error: `stack` and `message` are own but
    /// non-enumerable, `name` is inherited.
    fn own_properties(&self) -> Vec<Property> {
        vec![
            Property::hidden("stack", self.stack()),
            Property::hidden("message", self.message()),
        ]
    }

    /// Look up a property, falling back to the inherited `name`, `message`
    /// and `stack` accessors when it is not an own property.
    fn property(&self, key: &str) -> Option<Result<PropertyValue, PropertyError>> {
        if let Some(property) = self.own_properties().into_iter().find(|p| p.key == key) {
            return Some(property.value);
        }

        match key {
            "name" => Some(Ok(self.name().into())),
            "message" => Some(Ok(self.message().into())),
            "stack" => Some(Ok(self.stack().into())),
            _ => None,
        }
    }

    /// Custom serialization override. When present it replaces all property
    /// capture.
    fn to_json(&self) -> Option<Result<Value, PropertyError>> {
        None
    }
}
