//! Property descriptors: the ref-resolved view of a schema node

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::node::{SchemaAnnotations, TypeSpec};

/// What completion and hover need to know about one flattened path
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDescriptor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<TypeSpec>,

    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<Value>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,

    /// Source pattern for `*` paths (never used for matching)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

impl PropertyDescriptor {
    pub fn from_annotations(annotations: &SchemaAnnotations) -> Self {
        Self {
            description: annotations
                .markdown_description
                .clone()
                .or_else(|| annotations.description.clone()),
            schema_type: annotations.schema_type.clone(),
            enum_values: annotations.enum_values.clone().unwrap_or_default(),
            examples: annotations.examples.clone().unwrap_or_default(),
            default: annotations.default.clone(),
            deprecated: annotations.deprecated.unwrap_or(false),
            pattern: None,
        }
    }

    /// Fill unset fields from `other`, leaving everything already set alone.
    ///
    /// `deprecated` is never inherited: one deprecated branch of a union does
    /// not deprecate the union.
    pub fn fill_gaps(&mut self, other: &PropertyDescriptor) {
        if self.description.is_none() {
            self.description = other.description.clone();
        }
        if self.schema_type.is_none() {
            self.schema_type = other.schema_type.clone();
        }
        if self.enum_values.is_empty() {
            self.enum_values = other.enum_values.clone();
        }
        if self.examples.is_empty() {
            self.examples = other.examples.clone();
        }
        if self.default.is_none() {
            self.default = other.default.clone();
        }
        if self.pattern.is_none() {
            self.pattern = other.pattern.clone();
        }
    }

    /// Enum values rendered as plain strings (JSON strings unquoted)
    pub fn enum_labels(&self) -> Vec<String> {
        self.enum_values.iter().map(value_label).collect()
    }
}

/// Render a JSON value for display: strings bare, everything else as JSON
pub fn value_label(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
