//! Loading the Landofile schema from disk.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use landofile_lsp_core::source::{SchemaSource, SchemaSourceError, check_schema_shape};

/// A schema file, JSON unless the extension says YAML.
#[derive(Debug, Clone)]
pub struct FileSchemaSource {
    path: PathBuf,
}

impl FileSchemaSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn is_yaml(&self) -> bool {
        self.path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
    }
}

impl SchemaSource for FileSchemaSource {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<Value, SchemaSourceError> {
        let text = fs::read_to_string(&self.path).map_err(|e| SchemaSourceError::Unavailable {
            location: self.location(),
            reason: e.to_string(),
        })?;

        let parsed = if self.is_yaml() {
            serde_yaml::from_str::<Value>(&text).map_err(|e| e.to_string())
        } else {
            serde_json::from_str::<Value>(&text).map_err(|e| e.to_string())
        };
        let schema = parsed.map_err(|reason| SchemaSourceError::Malformed {
            location: self.location(),
            reason,
        })?;

        check_schema_shape(&self.location(), schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_json_schema() {
        let file = write_temp(".json", r#"{ "properties": { "name": { "type": "string" } } }"#);
        let schema = FileSchemaSource::new(file.path()).load().unwrap();
        assert_eq!(schema["properties"]["name"]["type"], "string");
    }

    #[test]
    fn loads_yaml_schema() {
        let file = write_temp(".yml", "properties:\n  recipe:\n    enum: [lamp, lemp]\n");
        let schema = FileSchemaSource::new(file.path()).load().unwrap();
        assert_eq!(schema["properties"]["recipe"]["enum"][1], "lemp");
    }

    #[test]
    fn missing_file_is_unavailable() {
        let err = FileSchemaSource::new("/definitely/not/here.json").load().unwrap_err();
        assert!(matches!(err, SchemaSourceError::Unavailable { .. }));
    }

    #[test]
    fn yaml_content_in_json_file_is_malformed() {
        let file = write_temp(".json", "properties: {}\n");
        let err = FileSchemaSource::new(file.path()).load().unwrap_err();
        assert!(matches!(err, SchemaSourceError::Malformed { .. }));
    }
}
