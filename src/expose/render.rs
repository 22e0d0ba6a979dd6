//! Conversion of properties into plain JSON.
//!
//! Three renderers: the own-properties walk, the whitelist capture (keys
//! filtered at every level) and standard serialization (enumerable only).
//! All of them absorb failures. A getter error, an opaque value or a branch
//! past `MAX_DEPTH` drops that branch and the walk carries on.

use super::error_like::{ErrorLike, Property, PropertyValue};
use serde_json::{Map, Value};
use tracing::{debug, trace};

/// Nesting bound for every walk. Self-referencing errors stop here.
pub const MAX_DEPTH: usize = 32;

/// Every own property, enumerable or not, with nested objects and errors
/// walked the same way.
pub(crate) fn own_properties(error: &dyn ErrorLike) -> Map<String, Value> {
    walk_error(error, 0).unwrap_or_default()
}

fn walk_error(error: &dyn ErrorLike, depth: usize) -> Option<Map<String, Value>> {
    if depth > MAX_DEPTH {
        trace!(name = error.name(), "Depth limit reached, omitting nested error");
        return None;
    }

    Some(walk_properties(&error.own_properties(), depth))
}

fn walk_properties(properties: &[Property], depth: usize) -> Map<String, Value> {
    let mut map = Map::with_capacity(properties.len());

    for property in properties {
        let value = match &property.value {
            Ok(value) => walk_value(value, depth + 1),
            Err(e) => {
                debug!(key = %property.key, error = %e, "Omitting property with failing getter");
                None
            }
        };

        if let Some(value) = value {
            map.insert(property.key.clone(), value);
        }
    }

    map
}

fn walk_value(value: &PropertyValue, depth: usize) -> Option<Value> {
    match value {
        PropertyValue::Json(json) => Some(json.clone()),
        PropertyValue::Object(properties) if depth <= MAX_DEPTH => {
            Some(Value::Object(walk_properties(properties, depth)))
        }
        PropertyValue::Object(_) => None,
        PropertyValue::Error(error) => walk_error(error.as_ref(), depth).map(Value::Object),
        PropertyValue::Opaque(kind) => {
            trace!(kind = %kind, "Omitting opaque value");
            None
        }
    }
}

/// Standard serialization of an error: its override when it has one,
/// otherwise its enumerable own properties.
pub(crate) fn standard_error(error: &dyn ErrorLike, depth: usize) -> Option<Value> {
    if depth > MAX_DEPTH {
        return None;
    }

    match error.to_json() {
        Some(Ok(value)) => Some(value),
        Some(Err(e)) => {
            debug!(name = error.name(), error = %e, "Omitting error whose override failed");
            None
        }
        None => Some(Value::Object(enumerable(&error.own_properties(), depth))),
    }
}

/// Standard serialization of a single property value.
fn standard_value(value: &PropertyValue, depth: usize) -> Option<Value> {
    match value {
        PropertyValue::Json(json) => Some(json.clone()),
        PropertyValue::Object(properties) if depth <= MAX_DEPTH => {
            Some(Value::Object(enumerable(properties, depth)))
        }
        PropertyValue::Object(_) | PropertyValue::Opaque(_) => None,
        PropertyValue::Error(error) => standard_error(error.as_ref(), depth),
    }
}

/// Capture restricted to `keys` at every level. Each key is looked up
/// directly, so hidden properties are included.
pub(crate) fn whitelisted(
    error: &dyn ErrorLike,
    keys: &[String],
    depth: usize,
) -> Map<String, Value> {
    let mut map = Map::with_capacity(keys.len());

    for key in keys {
        let Some(Ok(value)) = error.property(key) else {
            continue;
        };

        if let Some(value) = whitelisted_value(&value, keys, depth + 1) {
            map.insert(key.clone(), value);
        }
    }

    map
}

fn whitelisted_value(value: &PropertyValue, keys: &[String], depth: usize) -> Option<Value> {
    if depth > MAX_DEPTH {
        return None;
    }

    match value {
        PropertyValue::Json(json) => Some(whitelisted_json(json, keys)),
        PropertyValue::Object(properties) => {
            let mut map = Map::new();
            for key in keys {
                let Some(Ok(value)) = properties
                    .iter()
                    .find(|p| p.key == *key)
                    .map(|p| p.value.as_ref())
                else {
                    continue;
                };

                if let Some(value) = whitelisted_value(value, keys, depth + 1) {
                    map.insert(key.clone(), value);
                }
            }
            Some(Value::Object(map))
        }
        PropertyValue::Error(error) => match error.to_json() {
            Some(Ok(json)) => Some(whitelisted_json(&json, keys)),
            Some(Err(e)) => {
                debug!(name = error.name(), error = %e, "Omitting error whose override failed");
                None
            }
            None => Some(Value::Object(whitelisted(error.as_ref(), keys, depth))),
        },
        PropertyValue::Opaque(_) => None,
    }
}

/// Plain JSON objects keep only whitelisted keys, in whitelist order.
fn whitelisted_json(value: &Value, keys: &[String]) -> Value {
    match value {
        Value::Object(object) => Value::Object(
            keys.iter()
                .filter_map(|key| {
                    object
                        .get(key)
                        .map(|v| (key.clone(), whitelisted_json(v, keys)))
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| whitelisted_json(item, keys))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn enumerable(properties: &[Property], depth: usize) -> Map<String, Value> {
    properties
        .iter()
        .filter(|p| p.enumerable)
        .filter_map(|p| {
            let value = p.value.as_ref().ok()?;
            standard_value(value, depth + 1).map(|v| (p.key.clone(), v))
        })
        .collect()
}
