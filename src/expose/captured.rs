use super::error_like::{ErrorLike, Property, PropertyError, PropertyValue};
use serde_json::Value;
use std::backtrace::Backtrace;
use std::fmt;
use std::sync::Arc;

/// Longest `source()` chain converted into nested `cause` properties.
const MAX_SOURCE_CHAIN: usize = 32;

type JsonOverride = Arc<dyn Fn(&CapturedError) -> Result<Value, PropertyError> + Send + Sync>;

/// Concrete error-like value built by callers before logging.
///
/// `name`, `message` and `stack` are own, non-enumerable properties. Extra
/// properties keep their definition order; defining one with a built-in key
/// replaces the built-in.
#[derive(Clone)]
pub struct CapturedError {
    name: String,
    message: String,
    stack: String,
    properties: Vec<Property>,
    json_override: Option<JsonOverride>,
}

impl CapturedError {
    /// Create an error and capture the current stack.
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        let name = name.into();
        let message = message.into();
        let stack = format!("{}\n{}", header(&name, &message), Backtrace::force_capture());

        Self {
            name,
            message,
            stack,
            properties: Vec::new(),
            json_override: None,
        }
    }

    /// Convert a standard error. The `source()` chain becomes nested `cause`
    /// properties.
    pub fn from_std<E>(error: &E) -> Self
    where
        E: std::error::Error + ?Sized,
    {
        let captured = Self::new(short_type_name(std::any::type_name::<E>()), error.to_string());

        match error.source() {
            Some(source) => captured.with_property("cause", Arc::new(Self::from_chain(source))),
            None => captured,
        }
    }

    /// Sources carry no backtrace of their own; their stack is only the header.
    fn from_chain(first: &(dyn std::error::Error + 'static)) -> Self {
        let mut chain = vec![first];
        let mut current = first;
        while let Some(next) = current.source() {
            if chain.len() >= MAX_SOURCE_CHAIN {
                break;
            }
            chain.push(next);
            current = next;
        }

        let mut cause: Option<CapturedError> = None;
        for error in chain.into_iter().rev() {
            let mut captured = Self::bare("Error", error.to_string());
            if let Some(inner) = cause.take() {
                captured = captured.with_property("cause", Arc::new(inner));
            }
            cause = Some(captured);
        }

        cause.unwrap_or_else(|| Self::bare("Error", first.to_string()))
    }

    fn bare(name: &str, message: String) -> Self {
        Self {
            stack: header(name, &message),
            name: name.to_string(),
            message,
            properties: Vec::new(),
            json_override: None,
        }
    }

    /// Replace the captured stack.
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = stack.into();
        self
    }

    /// Define an enumerable own property.
    pub fn with_property(self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.define(Property::new(key, value))
    }

    /// Define a non-enumerable own property.
    pub fn with_hidden_property(
        self,
        key: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> Self {
        self.define(Property::hidden(key, value))
    }

    /// Define any prepared property, including failing ones.
    pub fn define(mut self, property: Property) -> Self {
        match self.properties.iter_mut().find(|p| p.key == property.key) {
            Some(existing) => *existing = property,
            None => self.properties.push(property),
        }
        self
    }

    /// Install a custom serialization override.
    pub fn with_json_override<F>(self, f: F) -> Self
    where
        F: Fn(&CapturedError) -> Value + Send + Sync + 'static,
    {
        self.with_fallible_json_override(move |error| Ok(f(error)))
    }

    pub fn with_fallible_json_override<F>(mut self, f: F) -> Self
    where
        F: Fn(&CapturedError) -> Result<Value, PropertyError> + Send + Sync + 'static,
    {
        self.json_override = Some(Arc::new(f));
        self
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }
}

impl ErrorLike for CapturedError {
    fn name(&self) -> &str {
        &self.name
    }

    fn message(&self) -> &str {
        &self.message
    }

    fn stack(&self) -> &str {
        &self.stack
    }

    fn own_properties(&self) -> Vec<Property> {
        let mut own = vec![
            Property::hidden("name", self.name.as_str()),
            Property::hidden("message", self.message.as_str()),
            Property::hidden("stack", self.stack.as_str()),
        ];

        for property in &self.properties {
            match own.iter_mut().find(|p| p.key == property.key) {
                Some(builtin) => *builtin = property.clone(),
                None => own.push(property.clone()),
            }
        }

        own
    }

    fn to_json(&self) -> Option<Result<Value, PropertyError>> {
        self.json_override.as_ref().map(|f| f(self))
    }
}

impl fmt::Debug for CapturedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapturedError")
            .field("name", &self.name)
            .field("message", &self.message)
            .field("properties", &self.properties)
            .field("json_override", &self.json_override.is_some())
            .finish_non_exhaustive()
    }
}

impl fmt::Display for CapturedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&header(&self.name, &self.message))
    }
}

impl std::error::Error for CapturedError {}

fn header(name: &str, message: &str) -> String {
    if message.is_empty() {
        name.to_string()
    } else {
        format!("{name}: {message}")
    }
}

/// `std::io::Error` -> `Error`, `my_crate::ParseError<T>` -> `ParseError`.
fn short_type_name(full: &str) -> String {
    let base = full.split('<').next().unwrap_or(full);
    let name = base.rsplit("::").next().unwrap_or(base).trim();

    if name.is_empty() || name.starts_with("dyn ") {
        "Error".to_string()
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stack_starts_with_header() {
        let error = CapturedError::new("TypeError", "bad input");
        assert!(error.stack().starts_with("TypeError: bad input\n"));
    }

    #[test]
    fn test_short_type_name() {
        assert_eq!(short_type_name("std::io::error::Error"), "Error");
        assert_eq!(short_type_name("app::ParseError<u8>"), "ParseError");
        assert_eq!(short_type_name("dyn core::error::Error"), "Error");
    }

    #[test]
    fn test_define_replaces_existing_key() {
        let error = CapturedError::new("Error", "boom")
            .with_property("code", "E1")
            .with_property("code", "E2");

        assert_eq!(error.properties().len(), 1);
        let code = error.property("code").unwrap().unwrap();
        assert!(matches!(code, PropertyValue::Json(Value::String(ref s)) if s == "E2"));
    }

    #[test]
    fn test_builtin_can_be_shadowed() {
        let error = CapturedError::new("Error", "boom").with_property("message", "overridden");
        let own = error.own_properties();

        let message = own.iter().find(|p| p.key == "message").unwrap();
        assert!(message.enumerable);
        assert_eq!(own.iter().filter(|p| p.key == "message").count(), 1);
    }

    #[test]
    fn test_from_std_walks_source_chain() {
        #[derive(Debug)]
        struct Outer(std::io::Error);

        impl fmt::Display for Outer {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("request failed")
            }
        }

        impl std::error::Error for Outer {
            fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
                Some(&self.0)
            }
        }

        let outer = Outer(std::io::Error::other("connection reset"));
        let captured = CapturedError::from_std(&outer);

        assert_eq!(captured.name(), "Outer");
        assert_eq!(captured.message(), "request failed");

        let cause = captured.property("cause").unwrap().unwrap();
        let PropertyValue::Error(cause) = cause else {
            panic!("cause should be a nested error");
        };
        assert_eq!(cause.message(), "connection reset");
        assert_eq!(cause.stack(), "Error: connection reset");
    }
}
