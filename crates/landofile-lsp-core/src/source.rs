//! Where the Landofile schema comes from.
//!
//! The core never touches the filesystem or network; hosts implement
//! [`SchemaSource`] and hand the loaded document to the facade.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaSourceError {
    #[error("schema not available from {location}: {reason}")]
    Unavailable { location: String, reason: String },

    #[error("schema at {location} is not valid JSON or YAML: {reason}")]
    Malformed { location: String, reason: String },

    #[error("schema at {location} must be an object or boolean, found {found}")]
    NotASchema { location: String, found: String },
}

/// Supplies the raw schema document.
pub trait SchemaSource {
    /// Human-readable location for logs and errors.
    fn location(&self) -> String;

    fn load(&self) -> Result<Value, SchemaSourceError>;
}

/// A schema already in memory.
#[derive(Debug, Clone)]
pub struct StaticSchema {
    name: String,
    schema: Value,
}

impl StaticSchema {
    pub fn new(name: impl Into<String>, schema: Value) -> Self {
        Self {
            name: name.into(),
            schema,
        }
    }
}

impl SchemaSource for StaticSchema {
    fn location(&self) -> String {
        self.name.clone()
    }

    fn load(&self) -> Result<Value, SchemaSourceError> {
        check_schema_shape(&self.location(), self.schema.clone())
    }
}

/// Reject documents that cannot be a JSON Schema at all.
pub fn check_schema_shape(location: &str, schema: Value) -> Result<Value, SchemaSourceError> {
    match &schema {
        Value::Object(_) | Value::Bool(_) => Ok(schema),
        other => Err(SchemaSourceError::NotASchema {
            location: location.to_string(),
            found: json_kind(other).to_string(),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
