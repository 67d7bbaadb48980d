//! Engine configuration.
//!
//! Editors pass this as JSON (`initializationOptions.engine`), so every field
//! has a default and unknown fields are ignored.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::types::DIAGNOSTIC_SOURCE;

/// Recipes that ship with Lando.
pub const BUILTIN_RECIPES: &[&str] = &[
    "acquia",
    "backdrop",
    "drupal6",
    "drupal7",
    "drupal8",
    "drupal9",
    "drupal10",
    "drupal11",
    "joomla",
    "lagoon",
    "lamp",
    "laravel",
    "lemp",
    "mean",
    "pantheon",
    "platformsh",
    "symfony",
    "wordpress",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid engine configuration: {0}")]
    Invalid(#[from] serde_json::Error),

    #[error("indentWidth must be at least 1")]
    ZeroIndentWidth,
}

/// Tunables for path tracking, validation and lints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Spaces per nesting level assumed by the line heuristics.
    pub indent_width: usize,

    /// Top-level keys every Landofile must declare, on top of whatever the
    /// schema itself requires.
    pub required_properties: Vec<String>,

    /// Recipe names accepted without a warning.
    pub known_recipes: Vec<String>,

    pub diagnostic_source: String,

    pub lints: LintConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            indent_width: 2,
            required_properties: vec!["name".to_string(), "recipe".to_string()],
            known_recipes: BUILTIN_RECIPES.iter().map(|r| r.to_string()).collect(),
            diagnostic_source: DIAGNOSTIC_SOURCE.to_string(),
            lints: LintConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parse configuration from editor-provided JSON. `null` yields the defaults.
    pub fn from_json(value: Value) -> Result<Self, ConfigError> {
        let config: EngineConfig = if value.is_null() {
            EngineConfig::default()
        } else {
            serde_json::from_value(value)?
        };
        config.check()?;
        Ok(config)
    }

    pub fn check(&self) -> Result<(), ConfigError> {
        if self.indent_width == 0 {
            return Err(ConfigError::ZeroIndentWidth);
        }
        Ok(())
    }

    pub fn is_known_recipe(&self, recipe: &str) -> bool {
        self.known_recipes.iter().any(|known| known == recipe)
    }
}

/// Per-rule lint switches, all on by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LintConfig {
    pub unknown_recipe: bool,
    pub deprecated_property: bool,
    pub indentation: bool,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            unknown_recipe: true,
            deprecated_property: true,
            indentation: true,
        }
    }
}
