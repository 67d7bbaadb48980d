//! Error types for schema reference resolution.
//!
//! None of these escape [`SchemaIndex::flatten`](crate::SchemaIndex::flatten):
//! a failed resolution truncates the affected subtree and is logged. They are
//! public so that callers resolving pointers directly get a typed reason.

use thiserror::Error;

/// Result type for schema resolution operations
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Reasons a `$ref` could not be followed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// The pointer does not address anything inside the schema document
    #[error("Unresolved schema reference: {0}")]
    UnresolvedRef(String),

    /// The reference points outside the schema document
    #[error("External schema references are not supported: {0}")]
    ExternalRef(String),

    /// The reference is already being expanded further up the current path
    #[error("Schema reference cycle through {0}")]
    RefCycle(String),
}
