//! Landofile Language Server Protocol implementation.
//!
//! This crate provides the LSP server for Landofiles (`.lando.yml`),
//! wrapping `landofile-lsp-core` with the tower-lsp framework.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        landofile-lsp                          │
//! │   tower-lsp wrapper, JSON-RPC/stdio, `landofile lsp` command  │
//! │                                                               │
//! │  ┌─────────────┐  ┌─────────────┐  ┌──────────────────────┐   │
//! │  │  server.rs  │  │ convert.rs  │  │   schema_file.rs     │   │
//! │  │LanguageServer│ │ Core ↔ LSP  │  │ JSON/YAML from disk  │   │
//! │  └──────┬──────┘  └──────┬──────┘  └──────────┬───────────┘   │
//! │         └────────────────┴────────────────────┘               │
//! │  ┌────────────────────────▼───────────────────────────────┐   │
//! │  │                  landofile-lsp-core                     │   │
//! │  │        (Transport-agnostic analysis logic)              │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```bash
//! landofile lsp --schema landofile.schema.json
//! ```
//!
//! Or programmatically:
//!
//! ```rust,ignore
//! landofile_lsp::run_server(Some("landofile.schema.json".into())).await;
//! ```

pub mod capabilities;
pub mod convert;
pub mod options;
pub mod schema_file;
pub mod server;

pub use schema_file::FileSchemaSource;
pub use server::run_server;
