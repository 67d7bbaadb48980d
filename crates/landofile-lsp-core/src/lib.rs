//! Transport-agnostic editor assistance for Landofiles.
//!
//! This crate answers the three questions an editor asks about a Landofile:
//! what can be typed here ([`QueryFacade::completions_at`]), what does this
//! key mean ([`QueryFacade::hover_at`]), and what is wrong with the document
//! ([`QueryFacade::validate`]). It is used by `landofile-lsp` over stdio and
//! by the `landofile check` command.
//!
//! Types here are plain serde structs; conversion to `lsp-types` happens in
//! the server crate.
//!
//! # Example
//!
//! ```rust
//! use landofile_lsp_core::{Document, QueryFacade};
//! use serde_json::json;
//!
//! let mut facade = QueryFacade::default();
//! facade.load_schema(json!({
//!     "properties": { "name": { "type": "string" }, "recipe": { "type": "string" } }
//! }));
//!
//! let doc = Document::new(".lando.yml", "name: 123\nrecipe: lamp\n");
//! let diagnostics = facade.validate(&doc);
//! assert_eq!(diagnostics[0].code.as_deref(), Some("type"));
//! ```

pub mod completion;
pub mod config;
pub mod document;
pub mod facade;
pub mod hover;
pub mod lint;
pub mod paths;
pub mod source;
pub mod types;
pub mod validator;

pub use config::{ConfigError, EngineConfig, LintConfig};
pub use document::{Document, DocumentStore};
pub use facade::{EngineContext, LoadedSchema, QueryFacade};
pub use paths::{KeyPath, PathTracker, context_at, locate, pointer_to_key_path, resolve_path};
pub use source::{SchemaSource, SchemaSourceError, StaticSchema};
pub use types::{
    CompletionItem, CompletionItemKind, Diagnostic, DiagnosticSeverity, Hover, Position, Range,
};
pub use validator::{DocumentValidator, validate_document};
