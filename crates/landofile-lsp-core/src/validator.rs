//! Landofile validation.
//!
//! Text is parsed with `serde_yaml`, converted to a JSON tree, and checked
//! against the schema with `jsonschema` in collect-all-errors mode. Each
//! structured error is mapped back to a source range through the key-path
//! heuristic in [`crate::paths`]. Lint rules run afterwards on any document
//! that parsed.

use std::fmt;

use jsonschema::error::{TypeKind, ValidationErrorKind};
use jsonschema::{Retrieve, Uri, ValidationError, Validator};
use landofile_schema::{SchemaIndex, value_label};
use serde_json::Value;
use tracing::warn;

use crate::config::EngineConfig;
use crate::document::utf16_columns;
use crate::lint::{LintContext, run_lints};
use crate::paths::{locate, pointer_to_key_path};
use crate::types::{Diagnostic, Range};

/// Diagnostic code for YAML syntax errors.
pub const PARSE_ERROR_CODE: &str = "parse";

/// Diagnostic code for a document whose root is not a mapping.
pub const ROOT_TYPE_CODE: &str = "root-type";

/// Refuses every external `$ref`; validation never touches the network or disk.
struct NoExternalRefs;

impl Retrieve for NoExternalRefs {
    fn retrieve(&self, uri: &Uri<&str>) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        Err(format!("external schema reference not supported: {}", uri.as_str()).into())
    }
}

/// A schema compiled once and reused for every document.
pub struct DocumentValidator {
    compiled: Option<Validator>,
}

impl fmt::Debug for DocumentValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentValidator")
            .field("compiled", &self.compiled.is_some())
            .finish()
    }
}

impl DocumentValidator {
    /// Compile `schema` with the configured required keys injected.
    ///
    /// A schema that fails to compile is logged and yields a validator that
    /// only parses and lints.
    pub fn compile(schema: &Value, config: &EngineConfig) -> Self {
        let augmented = with_required(schema, &config.required_properties);
        let mut options = jsonschema::options();
        options.with_retriever(NoExternalRefs);
        let compiled = match options.build(&augmented) {
            Ok(validator) => Some(validator),
            Err(error) => {
                warn!(%error, "Landofile schema failed to compile; schema checks disabled");
                None
            }
        };
        Self { compiled }
    }

    /// Parse and lint only.
    pub fn without_schema() -> Self {
        Self { compiled: None }
    }

    pub fn is_compiled(&self) -> bool {
        self.compiled.is_some()
    }

    pub fn check(&self, text: &str, index: Option<&SchemaIndex>, config: &EngineConfig) -> Vec<Diagnostic> {
        let data = match parse_landofile(text) {
            Ok(data) => data,
            Err(diagnostic) => return vec![diagnostic.with_source(&config.diagnostic_source)],
        };

        let mut diagnostics = Vec::new();
        match &data {
            Value::Null => {}
            Value::Object(_) => {
                if let Some(validator) = &self.compiled {
                    for error in validator.iter_errors(&data) {
                        diagnostics.extend(error_diagnostics(&error, text, &data, config));
                    }
                }
            }
            _ => {
                let range = locate::<&str>(text, &[], config.indent_width).unwrap_or_default();
                diagnostics.push(
                    Diagnostic::error(range, "A Landofile must be a mapping of keys to values.")
                        .with_code(ROOT_TYPE_CODE),
                );
            }
        }

        diagnostics.extend(run_lints(&LintContext {
            text,
            data: &data,
            index,
            schema_enforced: self.compiled.is_some(),
            config,
        }));

        diagnostics.sort_by(|a, b| a.range.start.cmp(&b.range.start));
        for diagnostic in &mut diagnostics {
            diagnostic.source = Some(config.diagnostic_source.clone());
        }
        diagnostics
    }
}

/// Validate `text` in one shot, compiling `schema` for this call only.
pub fn validate_document(
    text: &str,
    schema: Option<&Value>,
    index: Option<&SchemaIndex>,
    config: &EngineConfig,
) -> Vec<Diagnostic> {
    let validator = match schema {
        Some(schema) => DocumentValidator::compile(schema, config),
        None => DocumentValidator::without_schema(),
    };
    validator.check(text, index, config)
}

/// Parse Landofile text into a JSON tree, or a single parse diagnostic.
pub fn parse_landofile(text: &str) -> Result<Value, Diagnostic> {
    match serde_yaml::from_str::<serde_yaml::Value>(text) {
        Ok(value) => Ok(yaml_to_json(value)),
        Err(error) => {
            let range = error.location().map_or_else(Range::default, |location| {
                parse_error_range(text, location.line(), location.column())
            });
            Err(Diagnostic::error(range, format!("Invalid YAML: {error}")).with_code(PARSE_ERROR_CODE))
        }
    }
}

/// Range from a 1-based parser location to the end of that line.
fn parse_error_range(text: &str, line: usize, column: usize) -> Range {
    let line = line.saturating_sub(1);
    let column = column.saturating_sub(1);
    let Some(content) = text.lines().nth(line) else {
        return Range::on_line(line as u32, 0, 0);
    };
    let mut start = None;
    let mut end = 0;
    for (n, (col, c)) in utf16_columns(content).enumerate() {
        if n == column {
            start = Some(col);
        }
        end = col + c.len_utf16() as u32;
    }
    let start = start.unwrap_or(end);
    Range::on_line(line as u32, start, end)
}

/// Convert a YAML value to JSON, stringifying non-string mapping keys.
pub fn yaml_to_json(value: serde_yaml::Value) -> Value {
    use serde_yaml::Value as Yaml;

    match value {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(b),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map_or(Value::Null, Value::Number)
            }
        }
        Yaml::String(s) => Value::String(s),
        Yaml::Sequence(items) => Value::Array(items.into_iter().map(yaml_to_json).collect()),
        Yaml::Mapping(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key_string(key), yaml_to_json(value)))
                .collect(),
        ),
        Yaml::Tagged(tagged) => yaml_to_json(tagged.value),
    }
}

fn key_string(key: serde_yaml::Value) -> String {
    match yaml_to_json(key) {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

fn with_required(schema: &Value, required: &[String]) -> Value {
    let mut augmented = schema.clone();
    if let Value::Object(map) = &mut augmented
        && !required.is_empty()
    {
        let mut names = map
            .get("required")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        for name in required {
            let name = Value::String(name.clone());
            if !names.contains(&name) {
                names.push(name);
            }
        }
        map.insert("required".to_string(), Value::Array(names));
    }
    augmented
}

fn error_diagnostics(
    error: &ValidationError<'_>,
    text: &str,
    data: &Value,
    config: &EngineConfig,
) -> Vec<Diagnostic> {
    let path = pointer_to_key_path(&error.instance_path.to_string(), data);
    let width = config.indent_width;

    if let ValidationErrorKind::AdditionalProperties { unexpected } = &error.kind {
        return unexpected
            .iter()
            .filter_map(|key| {
                let mut target = path.clone();
                target.push(key.clone());
                let range = locate(text, &target, width)?;
                Some(
                    Diagnostic::error(range, format!("Property \"{key}\" is not allowed."))
                        .with_code("additionalProperties"),
                )
            })
            .collect();
    }

    let Some(range) = locate(text, &path, width) else {
        return Vec::new();
    };
    let (code, message) = describe(error);
    vec![Diagnostic::error(range, message).with_code(code)]
}

/// Keyword code and editor-facing message for one validation error.
fn describe(error: &ValidationError<'_>) -> (&'static str, String) {
    match &error.kind {
        ValidationErrorKind::Required { property, .. } => (
            "required",
            format!("Missing property \"{}\".", value_label(property)),
        ),
        ValidationErrorKind::Type {
            kind: TypeKind::Single(expected),
            ..
        } => ("type", format!("Incorrect type. Expected \"{expected}\".")),
        ValidationErrorKind::Type { .. } => ("type", format!("Incorrect type: {error}.")),
        ValidationErrorKind::Enum { options, .. } => {
            ("enum", format!("Value is not accepted. Valid values: {}.", quoted_list(options)))
        }
        ValidationErrorKind::Pattern { pattern, .. } => (
            "pattern",
            format!("String does not match the pattern of \"{pattern}\"."),
        ),
        ValidationErrorKind::Format { format, .. } => {
            ("format", format!("String is not a valid \"{format}\"."))
        }
        ValidationErrorKind::MinLength { limit, .. } => (
            "minLength",
            format!("String is shorter than the minimum length of {limit}."),
        ),
        ValidationErrorKind::MaxLength { limit, .. } => (
            "maxLength",
            format!("String is longer than the maximum length of {limit}."),
        ),
        ValidationErrorKind::MinItems { limit, .. } => (
            "minItems",
            format!("Array has too few items. Expected {limit} or more."),
        ),
        ValidationErrorKind::MaxItems { limit, .. } => (
            "maxItems",
            format!("Array has too many items. Expected {limit} or fewer."),
        ),
        ValidationErrorKind::MinProperties { limit, .. } => (
            "minProperties",
            format!("Object has fewer properties than the required number of {limit}."),
        ),
        ValidationErrorKind::MaxProperties { limit, .. } => (
            "maxProperties",
            format!("Object has more properties than the limit of {limit}."),
        ),
        ValidationErrorKind::Minimum { limit, .. } => {
            ("minimum", format!("Value is below the minimum of {limit}."))
        }
        ValidationErrorKind::Maximum { limit, .. } => {
            ("maximum", format!("Value is above the maximum of {limit}."))
        }
        ValidationErrorKind::ExclusiveMinimum { limit, .. } => (
            "exclusiveMinimum",
            format!("Value must be greater than {limit}."),
        ),
        ValidationErrorKind::ExclusiveMaximum { limit, .. } => {
            ("exclusiveMaximum", format!("Value must be less than {limit}."))
        }
        _ => ("schema", error.to_string()),
    }
}

fn quoted_list(options: &Value) -> String {
    match options {
        Value::Array(values) => values
            .iter()
            .map(|v| format!("\"{}\"", value_label(v)))
            .collect::<Vec<_>>()
            .join(", "),
        other => value_label(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "name": { "type": "string" },
                "recipe": { "type": "string", "enum": ["lamp", "lemp"] },
                "config": {
                    "type": "object",
                    "properties": { "webroot": { "type": "string", "minLength": 1 } },
                    "additionalProperties": false
                }
            }
        })
    }

    fn check(text: &str) -> Vec<Diagnostic> {
        validate_document(text, Some(&schema()), None, &EngineConfig::default())
    }

    fn codes(diagnostics: &[Diagnostic]) -> Vec<&str> {
        diagnostics.iter().filter_map(|d| d.code.as_deref()).collect()
    }

    #[test]
    fn valid_document_is_clean() {
        assert!(check("name: app\nrecipe: lamp\n").is_empty());
    }

    #[test]
    fn empty_document_is_clean() {
        assert!(check("").is_empty());
        assert!(check("# just a comment\n").is_empty());
    }

    #[test]
    fn missing_required_names_both_keys() {
        let diagnostics = check("config:\n  webroot: web\n");
        let messages: Vec<&str> = diagnostics.iter().map(|d| d.message.as_str()).collect();
        assert!(messages.contains(&"Missing property \"name\"."));
        assert!(messages.contains(&"Missing property \"recipe\"."));
        assert!(diagnostics.iter().all(|d| d.range.start.line == 0));
    }

    #[test]
    fn type_error_points_at_key() {
        let diagnostics = check("name: 123\nrecipe: lamp\n");
        assert_eq!(codes(&diagnostics), vec!["type"]);
        assert_eq!(diagnostics[0].message, "Incorrect type. Expected \"string\".");
        assert_eq!(diagnostics[0].range, Range::on_line(0, 0, 9));
    }

    #[test]
    fn enum_error_lists_values() {
        let diagnostics = check("name: app\nrecipe: lamb\n");
        let enum_error = diagnostics.iter().find(|d| d.code.as_deref() == Some("enum")).unwrap();
        assert_eq!(
            enum_error.message,
            "Value is not accepted. Valid values: \"lamp\", \"lemp\"."
        );
        assert_eq!(enum_error.range.start.line, 1);
    }

    #[test]
    fn additional_property_highlights_offending_key() {
        let diagnostics = check("name: app\nrecipe: lamp\nconfig:\n  webroot: web\n  php: '8.2'\n");
        assert_eq!(codes(&diagnostics), vec!["additionalProperties"]);
        assert_eq!(diagnostics[0].message, "Property \"php\" is not allowed.");
        assert_eq!(diagnostics[0].range, Range::on_line(4, 2, 12));
    }

    #[test]
    fn min_length_message() {
        let diagnostics = check("name: app\nrecipe: lamp\nconfig:\n  webroot: ''\n");
        assert_eq!(codes(&diagnostics), vec!["minLength"]);
        assert_eq!(
            diagnostics[0].message,
            "String is shorter than the minimum length of 1."
        );
    }

    #[test]
    fn parse_error_is_single_diagnostic() {
        let diagnostics = check("name: \"unterminated\nrecipe: lamp\n");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code.as_deref(), Some(PARSE_ERROR_CODE));
        assert!(diagnostics[0].message.starts_with("Invalid YAML"));
    }

    #[test]
    fn malformed_input_never_panics() {
        for text in [
            "",
            "\t\tname: app\n",
            "name:\n\t- tab",
            "'",
            ":\n:\n",
            "- a\n- b\n",
            "name: [unclosed\n",
            "{a: 1}: b\n",
            "? complex\n: key\n",
            "services:\n  web:\n      deep: 1\n   bad: 2\n",
        ] {
            let _ = check(text);
        }
    }

    #[test]
    fn non_mapping_root() {
        let diagnostics = check("- lamp\n- lemp\n");
        assert_eq!(codes(&diagnostics), vec![ROOT_TYPE_CODE]);
        assert_eq!(diagnostics[0].range.start.line, 0);
    }

    #[test]
    fn required_injection_dedupes() {
        let augmented = with_required(
            &json!({ "required": ["name", "services"] }),
            &["name".to_string(), "recipe".to_string()],
        );
        assert_eq!(augmented["required"], json!(["name", "services", "recipe"]));
    }

    #[test]
    fn uncompilable_schema_still_lints() {
        let bad = json!({ "type": "no-such-type" });
        let validator = DocumentValidator::compile(&bad, &EngineConfig::default());
        assert!(!validator.is_compiled());

        let diagnostics = validator.check("name: app\nrecipe: mystery\n", None, &EngineConfig::default());
        assert_eq!(codes(&diagnostics), vec!["unknown-recipe"]);
    }

    #[test]
    fn uncompilable_schema_with_recipe_enum_still_warns() {
        let bad = json!({
            "type": "no-such-type",
            "properties": { "recipe": { "enum": ["lamp"] } }
        });
        let index = SchemaIndex::flatten(&bad);
        let validator = DocumentValidator::compile(&bad, &EngineConfig::default());
        assert!(!validator.is_compiled());

        let diagnostics = validator.check("name: app\nrecipe: mystery\n", Some(&index), &EngineConfig::default());
        assert_eq!(codes(&diagnostics), vec!["unknown-recipe"]);
    }

    #[test]
    fn yaml_keys_are_stringified() {
        let yaml: serde_yaml::Value = serde_yaml::from_str("1: one\ntrue: yes\nnull: nothing\n").unwrap();
        assert_eq!(
            yaml_to_json(yaml),
            json!({ "1": "one", "true": "yes", "null": "nothing" })
        );
    }
}
