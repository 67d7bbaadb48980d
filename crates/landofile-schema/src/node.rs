//! Tagged schema node representation
//!
//! A raw JSON Schema object is classified into one of four shapes according to
//! which keywords it carries, in this order of precedence:
//!
//! 1. `properties`        -> [`NodeKind::Properties`] (keeps any `patternProperties` too)
//! 2. `patternProperties` -> [`NodeKind::PatternProperties`]
//! 3. `oneOf` / `anyOf`   -> [`NodeKind::OneOf`]
//! 4. anything else       -> [`NodeKind::Terminal`]
//!
//! Annotations, `$ref` and `$defs` may appear on any node, so they live on
//! [`SchemaNode`] next to the shape rather than inside it. References are kept
//! as unresolved strings; the schema tree itself is therefore acyclic.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// The `type` keyword: a single type name or a list of alternatives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeSpec {
    Single(String),
    Multiple(Vec<String>),
}

impl TypeSpec {
    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(TypeSpec::Single(s.clone())),
            Value::Array(items) => {
                let names: Vec<String> = items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect();
                if names.is_empty() {
                    None
                } else {
                    Some(TypeSpec::Multiple(names))
                }
            }
            _ => None,
        }
    }

    /// All type names this spec admits
    pub fn names(&self) -> Vec<&str> {
        match self {
            TypeSpec::Single(s) => vec![s.as_str()],
            TypeSpec::Multiple(names) => names.iter().map(String::as_str).collect(),
        }
    }

    /// Whether `name` is one of the admitted types
    pub fn admits(&self, name: &str) -> bool {
        self.names().contains(&name)
    }
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.names().join(" | "))
    }
}

/// Documentation-bearing keywords that may be attached to any node
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaAnnotations {
    pub description: Option<String>,
    /// `markdownDescription` (VS Code extension keyword), preferred for hover
    pub markdown_description: Option<String>,
    pub schema_type: Option<TypeSpec>,
    pub enum_values: Option<Vec<Value>>,
    pub examples: Option<Vec<Value>>,
    pub default: Option<Value>,
    pub deprecated: Option<bool>,
}

impl SchemaAnnotations {
    fn from_object(obj: &Map<String, Value>) -> Self {
        let string = |key: &str| obj.get(key).and_then(Value::as_str).map(str::to_string);
        let array = |key: &str| obj.get(key).and_then(Value::as_array).cloned();

        Self {
            description: string("description"),
            markdown_description: string("markdownDescription"),
            schema_type: obj.get("type").and_then(TypeSpec::from_json),
            enum_values: array("enum"),
            examples: array("examples"),
            default: obj.get("default").cloned(),
            deprecated: obj.get("deprecated").and_then(Value::as_bool),
        }
    }

    /// Overlay `self` on top of `inner`; fields set on `self` win.
    pub fn merged_over(self, inner: SchemaAnnotations) -> SchemaAnnotations {
        SchemaAnnotations {
            description: self.description.or(inner.description),
            markdown_description: self.markdown_description.or(inner.markdown_description),
            schema_type: self.schema_type.or(inner.schema_type),
            enum_values: self.enum_values.or(inner.enum_values),
            examples: self.examples.or(inner.examples),
            default: self.default.or(inner.default),
            deprecated: self.deprecated.or(inner.deprecated),
        }
    }
}

/// Which combinator introduced a [`NodeKind::OneOf`] node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Combinator {
    OneOf,
    AnyOf,
}

impl Combinator {
    /// The JSON Schema keyword for this combinator
    pub fn keyword(&self) -> &'static str {
        match self {
            Combinator::OneOf => "oneOf",
            Combinator::AnyOf => "anyOf",
        }
    }
}

/// A `patternProperties` entry; the pattern is metadata only
#[derive(Debug, Clone, PartialEq)]
pub struct PatternProperty {
    pub pattern: String,
    pub schema: SchemaNode,
}

/// Structural shape of a schema node
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Properties {
        properties: BTreeMap<String, SchemaNode>,
        patterns: Vec<PatternProperty>,
    },
    PatternProperties(Vec<PatternProperty>),
    OneOf {
        combinator: Combinator,
        branches: Vec<SchemaNode>,
    },
    Terminal,
}

/// A schema fragment with its `$ref` left unresolved
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
    pub annotations: SchemaAnnotations,
    pub reference: Option<String>,
    /// `$defs` (and the older `definitions`) declared on this node
    pub defs: BTreeMap<String, SchemaNode>,
    pub kind: NodeKind,
}

impl SchemaNode {
    /// A node with no annotations and no structure (`true`/`{}`)
    pub fn terminal() -> Self {
        Self {
            annotations: SchemaAnnotations::default(),
            reference: None,
            defs: BTreeMap::new(),
            kind: NodeKind::Terminal,
        }
    }

    /// Classify a raw JSON schema value.
    ///
    /// Boolean schemas and non-object values become empty terminals.
    pub fn from_json(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::terminal();
        };

        let mut defs = BTreeMap::new();
        for key in ["definitions", "$defs"] {
            if let Some(Value::Object(entries)) = obj.get(key) {
                for (name, def) in entries {
                    defs.insert(name.clone(), SchemaNode::from_json(def));
                }
            }
        }

        Self {
            annotations: SchemaAnnotations::from_object(obj),
            reference: obj.get("$ref").and_then(Value::as_str).map(str::to_string),
            defs,
            kind: classify(obj),
        }
    }

    /// Overlay this (referencing) node on a node its `$ref` resolved to.
    ///
    /// Local annotations and `$defs` win. The local shape wins unless it is a
    /// bare terminal, in which case the resolved shape is adopted. The
    /// resolved node's own `$ref`, if any, becomes the pending reference.
    pub fn merged_over(self, resolved: SchemaNode) -> SchemaNode {
        let mut defs = resolved.defs;
        defs.extend(self.defs);

        let kind = match self.kind {
            NodeKind::Terminal => resolved.kind,
            local => local,
        };

        SchemaNode {
            annotations: self.annotations.merged_over(resolved.annotations),
            reference: resolved.reference,
            defs,
            kind,
        }
    }
}

fn classify(obj: &Map<String, Value>) -> NodeKind {
    let patterns = obj
        .get("patternProperties")
        .and_then(Value::as_object)
        .map(|entries| {
            entries
                .iter()
                .map(|(pattern, schema)| PatternProperty {
                    pattern: pattern.clone(),
                    schema: SchemaNode::from_json(schema),
                })
                .collect::<Vec<_>>()
        });

    if let Some(Value::Object(props)) = obj.get("properties") {
        let properties = props
            .iter()
            .map(|(name, schema)| (name.clone(), SchemaNode::from_json(schema)))
            .collect();
        return NodeKind::Properties {
            properties,
            patterns: patterns.unwrap_or_default(),
        };
    }

    if let Some(patterns) = patterns {
        return NodeKind::PatternProperties(patterns);
    }

    for combinator in [Combinator::OneOf, Combinator::AnyOf] {
        if let Some(Value::Array(branches)) = obj.get(combinator.keyword()) {
            return NodeKind::OneOf {
                combinator,
                branches: branches.iter().map(SchemaNode::from_json).collect(),
            };
        }
    }

    NodeKind::Terminal
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn classifies_by_keyword_precedence() {
        let node = SchemaNode::from_json(&json!({
            "properties": { "a": {} },
            "patternProperties": { "^x": {} },
            "oneOf": [{}]
        }));
        match node.kind {
            NodeKind::Properties { properties, patterns } => {
                assert!(properties.contains_key("a"));
                assert_eq!(patterns.len(), 1);
                assert_eq!(patterns[0].pattern, "^x");
            }
            other => panic!("Expected Properties, got {:?}", other),
        }

        let node = SchemaNode::from_json(&json!({ "anyOf": [{ "type": "string" }, {}] }));
        match node.kind {
            NodeKind::OneOf { combinator, branches } => {
                assert_eq!(combinator, Combinator::AnyOf);
                assert_eq!(branches.len(), 2);
            }
            other => panic!("Expected OneOf, got {:?}", other),
        }
    }

    #[test]
    fn boolean_schema_is_terminal() {
        let node = SchemaNode::from_json(&json!(true));
        assert!(matches!(node.kind, NodeKind::Terminal));
        assert!(node.reference.is_none());
    }

    #[test]
    fn type_spec_accepts_lists() {
        let node = SchemaNode::from_json(&json!({ "type": ["string", "null"] }));
        let spec = node.annotations.schema_type.unwrap();
        assert!(spec.admits("null"));
        assert_eq!(spec.to_string(), "string | null");
    }

    #[test]
    fn local_fields_win_when_merging() {
        let local = SchemaNode::from_json(&json!({
            "$ref": "#/$defs/svc",
            "description": "local"
        }));
        let resolved = SchemaNode::from_json(&json!({
            "description": "shared",
            "type": "object",
            "properties": { "type": {} }
        }));

        let merged = local.merged_over(resolved);
        assert_eq!(merged.annotations.description.as_deref(), Some("local"));
        assert_eq!(
            merged.annotations.schema_type,
            Some(TypeSpec::Single("object".to_string()))
        );
        assert!(matches!(merged.kind, NodeKind::Properties { .. }));
        assert!(merged.reference.is_none());
    }
}
