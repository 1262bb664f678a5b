use std::collections::BTreeMap;

use charter_ast::DateTimeValue;
use rust_decimal::Decimal;
use uuid::Uuid;

/// A runtime value read off an entity during evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Decimal(Decimal),
    String(String),
    Guid(Uuid),
    DateTime(DateTimeValue),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short kind name for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Decimal(_) => "decimal",
            Value::String(_) => "string",
            Value::Guid(_) => "guid",
            Value::DateTime(_) => "datetime",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Converts a JSON value into a runtime value. Strings stay strings here;
    /// guid, datetime and decimal text is only reinterpreted where a typed
    /// comparison requires it.
    pub fn from_json(json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(items) => {
                Value::List(items.iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(map) => Value::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), Value::from_json(v)))
                    .collect(),
            ),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::Number((*i).into()),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Decimal(d) => serde_json::Value::String(d.to_string()),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Guid(g) => serde_json::Value::String(g.to_string()),
            Value::DateTime(dt) => serde_json::Value::String(dt.canonical()),
            Value::List(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Map(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }
}

/// Storage-side view of a single item. Queries read properties through this
/// trait by internal name and never mutate anything.
pub trait Entity {
    /// Concrete type discriminator, when the item carries one. Drives
    /// runtime narrowing for subtype casts.
    fn type_name(&self) -> Option<&str> {
        None
    }

    /// Reads a property by its internal name. A missing key reads as `None`;
    /// evaluation treats that the same as an explicit null.
    fn get(&self, internal_name: &str) -> Option<Value>;
}

impl Entity for serde_json::Value {
    fn type_name(&self) -> Option<&str> {
        self.get("_type").and_then(|v| v.as_str())
    }

    fn get(&self, internal_name: &str) -> Option<Value> {
        self.as_object()
            .and_then(|map| map.get(internal_name))
            .map(Value::from_json)
    }
}

impl Entity for BTreeMap<String, Value> {
    fn type_name(&self) -> Option<&str> {
        match self.get("_type") {
            Some(Value::String(name)) => Some(name.as_str()),
            _ => None,
        }
    }

    fn get(&self, internal_name: &str) -> Option<Value> {
        self.get(internal_name).cloned()
    }
}
