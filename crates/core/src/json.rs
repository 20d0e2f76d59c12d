//! JSON interop for diagnostics tooling
//!
//! JSON is a lossy view: table keys become strings, non-finite floats
//! become `null` and Text that is not UTF-8 is decoded lossily. Keys of
//! different kinds can render to the same string (`true` and `"true"`); the
//! later one in key order wins and the collision is logged. The wire format
//! stays the source of truth.

use crate::stack::Stack;
use crate::value::{Table, TableKey, Value};
use serde_json::{Map, Number, Value as Json};

/// JSON view of a value
pub fn value_to_json(value: &Value) -> Json {
    match value {
        Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Integer(n) => Json::Number(Number::from(*n)),
        Value::Float(f) => Number::from_f64(*f).map_or(Json::Null, Json::Number),
        Value::Text(s) => Json::String(String::from_utf8_lossy(s).into_owned()),
        Value::Array(items) => Json::Array(items.iter().map(value_to_json).collect()),
        Value::Table(table) => {
            let mut object = Map::new();
            for (key, item) in table {
                let name = key_to_string(key);
                if object.contains_key(&name) {
                    tracing::warn!(
                        key = %name,
                        kind = %key.kind(),
                        "table keys collide in JSON view"
                    );
                }
                object.insert(name, value_to_json(item));
            }
            Json::Object(object)
        }
    }
}

/// Value for a JSON document; integers that fit `i64` stay Integer
pub fn value_from_json(json: &Json) -> Value {
    match json {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(*b),
        Json::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        Json::String(s) => Value::from(s.as_str()),
        Json::Array(items) => Value::Array(items.iter().map(value_from_json).collect()),
        Json::Object(object) => Value::Table(
            object
                .iter()
                .map(|(k, v)| (TableKey::from(k.as_str()), value_from_json(v)))
                .collect::<Table>(),
        ),
    }
}

/// A JSON array maps to slots bottom to top; anything else is one slot
pub fn stack_from_json(json: &Json) -> Stack {
    match json {
        Json::Array(items) => items.iter().map(value_from_json).collect(),
        other => Stack::from(vec![value_from_json(other)]),
    }
}

/// JSON array of the slots, bottom to top
pub fn stack_to_json(stack: &Stack) -> Json {
    Json::Array(stack.iter().map(value_to_json).collect())
}

fn key_to_string(key: &TableKey) -> String {
    match key {
        TableKey::Null => "null".to_string(),
        TableKey::Bool(b) => b.to_string(),
        TableKey::Integer(n) => n.to_string(),
        TableKey::Float(f) => f.to_string(),
        TableKey::Text(s) => String::from_utf8_lossy(s).into_owned(),
    }
}
