use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
#[error("Failed to read attribute '{attr}': {reason}")]
pub struct AttributeError {
    pub attr: String,
    pub reason: String,
}

impl AttributeError {
    pub fn new(attr: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            attr: attr.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Error, Debug)]
#[error("Event data must be a JSON object, got {0}")]
pub struct EventShapeError(&'static str);

/// Attribute-style access to a provider response that is not a plain mapping.
///
/// SDK response types implement this to expose fields such as `id` and
/// `usage` by name. Returning `Ok(None)` means the attribute does not exist.
pub trait AttributeAccess: Send + Sync + std::fmt::Debug {
    fn get_attr(&self, name: &str) -> Result<Option<Value>, AttributeError>;
}

/// Fields the routing proxy hands to its logging callbacks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventData(Map<String, Value>);

impl EventData {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Call id as a string, for log fields only.
    pub fn call_id(&self) -> Option<&str> {
        self.0.get("litellm_call_id").and_then(Value::as_str)
    }
}

impl From<Map<String, Value>> for EventData {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

impl TryFrom<Value> for EventData {
    type Error = EventShapeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(fields) => Ok(Self(fields)),
            Value::Null => Ok(Self::default()),
            other => Err(EventShapeError(json_type_name(&other))),
        }
    }
}

/// Raw provider response attached to an event. Its shape depends on the
/// provider and is never validated.
#[derive(Debug, Clone, Default)]
pub enum ResponseObject {
    #[default]
    None,
    Mapping(Map<String, Value>),
    Object(Arc<dyn AttributeAccess>),
}

impl ResponseObject {
    /// Read a top-level field by name, using mapping access for mappings and
    /// accessor access for objects.
    pub fn field(&self, name: &str) -> Result<Option<Value>, AttributeError> {
        match self {
            Self::None => Ok(None),
            Self::Mapping(fields) => Ok(fields.get(name).cloned()),
            Self::Object(object) => object.get_attr(name),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

/// Scalars and arrays carry no named fields, so they collapse to `None`.
impl From<Value> for ResponseObject {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(fields) => Self::Mapping(fields),
            _ => Self::None,
        }
    }
}

impl<T: AttributeAccess + 'static> From<Arc<T>> for ResponseObject {
    fn from(object: Arc<T>) -> Self {
        Self::Object(object)
    }
}

/// `null`, `false`, zero, and empty strings/arrays/objects are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
