//! LSP server command implementation.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;

/// Execute the LSP server.
///
/// This starts the Landofile Language Server Protocol server,
/// communicating over stdio with JSON-RPC messages.
pub fn execute(schema: Option<PathBuf>) -> Result<ExitCode> {
    tracing::info!(schema = ?schema, "starting language server");
    // Create a new tokio runtime for the LSP server
    let runtime = tokio::runtime::Runtime::new()?;

    runtime.block_on(async {
        landofile_lsp::run_server(schema).await;
    });

    Ok(ExitCode::SUCCESS)
}
