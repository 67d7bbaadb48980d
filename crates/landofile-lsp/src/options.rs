//! `initializationOptions` sent by the client.

use std::path::PathBuf;

use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InitializationOptions {
    /// Schema file to load when the server was started without `--schema`.
    pub schema_path: Option<PathBuf>,

    /// Raw `EngineConfig` JSON, validated separately so a bad value only
    /// costs the engine settings.
    pub engine: Value,
}

impl InitializationOptions {
    pub fn from_value(value: Option<Value>) -> Result<Self, serde_json::Error> {
        match value {
            None | Some(Value::Null) => Ok(Self::default()),
            Some(value) => serde_json::from_value(value),
        }
    }
}
