//! The query surface editors talk to.
//!
//! [`QueryFacade`] owns an [`EngineContext`] (configuration plus the loaded
//! schema) and answers completion, hover and validation requests against
//! it. Panics never escape a facade call: they are logged and turned into an
//! empty answer.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};

use landofile_schema::SchemaIndex;
use serde_json::Value;
use tracing::{error, info};

use crate::completion::complete;
use crate::config::EngineConfig;
use crate::document::Document;
use crate::hover::hover;
use crate::source::{SchemaSource, SchemaSourceError};
use crate::types::{CompletionItem, Diagnostic, Hover, Position, Range};
use crate::validator::DocumentValidator;

/// Diagnostic code reported when validation itself failed.
pub const INTERNAL_ERROR_CODE: &str = "internal";

/// A schema with everything derived from it.
#[derive(Debug)]
pub struct LoadedSchema {
    raw: Value,
    index: SchemaIndex,
    validator: DocumentValidator,
}

impl LoadedSchema {
    pub fn new(raw: Value, config: &EngineConfig) -> Self {
        let index = SchemaIndex::flatten(&raw);
        let validator = DocumentValidator::compile(&raw, config);
        Self {
            raw,
            index,
            validator,
        }
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn index(&self) -> &SchemaIndex {
        &self.index
    }
}

/// Everything a query depends on.
#[derive(Debug, Default)]
pub struct EngineContext {
    pub config: EngineConfig,
    pub schema: Option<LoadedSchema>,
}

impl EngineContext {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            schema: None,
        }
    }
}

#[derive(Debug, Default)]
pub struct QueryFacade {
    context: EngineContext,
}

impl QueryFacade {
    pub fn new(context: EngineContext) -> Self {
        Self { context }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.context.config
    }

    pub fn schema(&self) -> Option<&LoadedSchema> {
        self.context.schema.as_ref()
    }

    /// Replace the configuration, recompiling the schema it affects.
    pub fn set_config(&mut self, config: EngineConfig) {
        self.context.config = config;
        if let Some(loaded) = self.context.schema.take() {
            self.load_schema(loaded.raw);
        }
    }

    /// Flatten and compile `raw`, replacing any previously loaded schema.
    pub fn load_schema(&mut self, raw: Value) {
        let config = &self.context.config;
        let loaded = guarded("load_schema", || None, || Some(LoadedSchema::new(raw, config)));
        if let Some(loaded) = &loaded {
            info!(paths = loaded.index.len(), "Landofile schema loaded");
        }
        self.context.schema = loaded;
    }

    pub fn load_from(&mut self, source: &dyn SchemaSource) -> Result<(), SchemaSourceError> {
        let raw = source.load()?;
        info!(location = %source.location(), "Loading Landofile schema");
        self.load_schema(raw);
        Ok(())
    }

    pub fn completions_at(&self, doc: &Document, pos: Position) -> Vec<CompletionItem> {
        let Some(schema) = self.schema() else {
            return Vec::new();
        };
        guarded("completions_at", Vec::new, || {
            complete(doc, pos, &schema.index, &self.context.config)
        })
    }

    pub fn hover_at(&self, doc: &Document, pos: Position, word: Option<&str>) -> Option<Hover> {
        let schema = self.schema()?;
        guarded("hover_at", || None, || {
            hover(doc, pos, word, &schema.index, &self.context.config)
        })
    }

    /// The key-like word under the cursor.
    pub fn word_at(&self, doc: &Document, pos: Position) -> Option<String> {
        guarded("word_at", || None, || doc.word_at(pos).map(|(word, _)| word))
    }

    pub fn validate(&self, doc: &Document) -> Vec<Diagnostic> {
        let config = &self.context.config;
        guarded(
            "validate",
            || {
                vec![
                    Diagnostic::error(Range::default(), "Internal error while validating this Landofile.")
                        .with_code(INTERNAL_ERROR_CODE)
                        .with_source(&config.diagnostic_source),
                ]
            },
            || match self.schema() {
                Some(schema) => schema.validator.check(doc.content(), Some(&schema.index), config),
                None => DocumentValidator::without_schema().check(doc.content(), None, config),
            },
        )
    }
}

fn guarded<T>(operation: &'static str, fallback: impl FnOnce() -> T, f: impl FnOnce() -> T) -> T {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => value,
        Err(payload) => {
            error!(operation, panic = panic_message(payload.as_ref()), "Landofile query panicked");
            fallback()
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}
