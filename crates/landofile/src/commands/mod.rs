//! Command implementations for the Landofile CLI
//!
//! Each command module handles the CLI interface and delegates to
//! landofile-lsp-core for the actual work.

pub mod check;
pub mod lsp;
pub mod schema;
