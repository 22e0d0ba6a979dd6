use super::level::Level;
use crate::expose::{ErrorLike, standard_error};
use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};
use serde_json::{Map, Value};
use std::sync::Arc;

/// One value of an event's field mapping.
#[derive(Debug, Clone)]
pub enum Field {
    Value(Value),
    Error(Arc<dyn ErrorLike>),
}

impl Field {
    pub fn error<E: ErrorLike + 'static>(error: E) -> Self {
        Field::Error(Arc::new(error))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Field::Error(_))
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Field::Value(value) => Some(value),
            Field::Error(_) => None,
        }
    }
}

macro_rules! field_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Field {
                fn from(value: $ty) -> Self {
                    Field::Value(Value::from(value))
                }
            }
        )*
    };
}

field_from!(Value, &str, String, bool, i32, i64, u32, u64, f64);

/// Ordered string-keyed mapping attached to an event.
#[derive(Debug, Clone, Default)]
pub struct Fields(Vec<(String, Field)>);

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace, keeping the original position of a replaced key.
    pub fn insert(&mut self, key: impl Into<String>, field: impl Into<Field>) {
        let key = key.into();
        let field = field.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = field,
            None => self.0.push((key, field)),
        }
    }

    pub fn with(mut self, key: impl Into<String>, field: impl Into<Field>) -> Self {
        self.insert(key, field);
        self
    }

    pub fn with_error<E: ErrorLike + 'static>(self, key: impl Into<String>, error: E) -> Self {
        self.with(key, Field::error(error))
    }

    pub fn get(&self, key: &str) -> Option<&Field> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, f)| f)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.0.iter().map(|(k, f)| (k.as_str(), f))
    }

    /// First-level values only.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut Field> {
        self.0.iter_mut().map(|(_, f)| f)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, F: Into<Field>> FromIterator<(K, F)> for Fields {
    fn from_iter<I: IntoIterator<Item = (K, F)>>(iter: I) -> Self {
        let mut fields = Fields::new();
        for (key, field) in iter {
            fields.insert(key, field);
        }
        fields
    }
}

/// Payload of an event.
#[derive(Debug, Clone, Default)]
pub enum EventData {
    #[default]
    Empty,
    Error(Arc<dyn ErrorLike>),
    Fields(Fields),
    Value(Value),
}

impl EventData {
    pub fn error<E: ErrorLike + 'static>(error: E) -> Self {
        EventData::Error(Arc::new(error))
    }

    pub fn as_fields(&self) -> Option<&Fields> {
        match self {
            EventData::Fields(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            EventData::Value(value) => Some(value),
            _ => None,
        }
    }

    /// JSON form as it goes on the wire. Errors that were never exposed get
    /// standard serialization, which usually leaves little more than `{}`.
    pub fn to_json(&self) -> Value {
        match self {
            EventData::Empty => Value::Object(Map::new()),
            EventData::Error(error) => error_json(error.as_ref()),
            EventData::Fields(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(key, field)| (key.to_string(), field_json(field)))
                    .collect(),
            ),
            EventData::Value(value) => value.clone(),
        }
    }
}

impl From<Fields> for EventData {
    fn from(fields: Fields) -> Self {
        EventData::Fields(fields)
    }
}

impl From<Value> for EventData {
    fn from(value: Value) -> Self {
        EventData::Value(value)
    }
}

fn error_json(error: &dyn ErrorLike) -> Value {
    standard_error(error, 0).unwrap_or_else(|| Value::Object(Map::new()))
}

fn field_json(field: &Field) -> Value {
    match field {
        Field::Value(value) => value.clone(),
        Field::Error(error) => error_json(error.as_ref()),
    }
}

/// One log record flowing through the interceptor chain.
#[derive(Debug, Clone)]
pub struct Event {
    pub level: Level,
    pub event: String,
    pub service: String,
    pub client_id: Option<String>,
    pub data: EventData,
}

impl Event {
    pub fn new(level: Level, event: impl Into<String>, data: impl Into<EventData>) -> Self {
        Self {
            level,
            event: event.into(),
            service: String::new(),
            client_id: None,
            data: data.into(),
        }
    }

    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = service.into();
        self
    }

    pub fn with_client_id(mut self, client_id: Option<String>) -> Self {
        self.client_id = client_id;
        self
    }
}

impl Serialize for Event {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.client_id.is_some() { 5 } else { 4 };
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("level", &self.level)?;
        map.serialize_entry("event", &self.event)?;
        map.serialize_entry("service", &self.service)?;
        if let Some(client_id) = &self.client_id {
            map.serialize_entry("clientId", client_id)?;
        }
        map.serialize_entry("data", &self.data.to_json())?;
        map.end()
    }
}
