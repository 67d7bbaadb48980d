//! Landofile CLI - Main entry point

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "landofile")]
#[command(version)]
#[command(about = "Validation, completion and hover for Lando's .lando.yml files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the language server over stdio
    Lsp {
        /// Landofile JSON Schema (JSON or YAML); overrides initializationOptions.schemaPath
        #[arg(long)]
        schema: Option<PathBuf>,
    },

    /// Validate Landofiles and print their diagnostics
    Check {
        /// Landofile JSON Schema (JSON or YAML)
        #[arg(long)]
        schema: PathBuf,

        /// Engine options as JSON (same shape as initializationOptions.engine)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Landofiles to check
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Print the flattened schema index as JSON
    Schema {
        /// Landofile JSON Schema (JSON or YAML)
        #[arg(long)]
        schema: PathBuf,

        /// Only print the entry for this flattened path (e.g. `services/*/type`)
        #[arg(long)]
        path: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<ExitCode> {
    // Logs go to stderr: stdout carries JSON-RPC in LSP mode
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "landofile=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Lsp { schema } => commands::lsp::execute(schema),
        Commands::Check {
            schema,
            config,
            format,
            files,
        } => commands::check::execute(&schema, config.as_deref(), format, &files),
        Commands::Schema { schema, path } => commands::schema::execute(&schema, path.as_deref()),
    }
}
