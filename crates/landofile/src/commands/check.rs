//! `landofile check`: validate files the way the language server would.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use landofile_lsp::FileSchemaSource;
use landofile_lsp_core::{
    Diagnostic, DiagnosticSeverity, Document, EngineConfig, EngineContext, QueryFacade,
};

use crate::OutputFormat;

#[derive(Debug, Serialize)]
struct FileReport {
    file: String,
    diagnostics: Vec<Diagnostic>,
}

pub fn execute(
    schema: &Path,
    config: Option<&Path>,
    format: OutputFormat,
    files: &[PathBuf],
) -> Result<ExitCode> {
    let config = match config {
        Some(path) => load_config(path)?,
        None => EngineConfig::default(),
    };

    let mut facade = QueryFacade::new(EngineContext::new(config));
    facade
        .load_from(&FileSchemaSource::new(schema))
        .with_context(|| format!("Failed to load schema {}", schema.display()))?;

    let mut reports = Vec::with_capacity(files.len());
    for file in files {
        let text = fs::read_to_string(file)
            .with_context(|| format!("Failed to read {}", file.display()))?;
        let name = file.display().to_string();
        let diagnostics = facade.validate(&Document::new(name.clone(), text));
        debug!(file = %name, count = diagnostics.len(), "checked");
        reports.push(FileReport {
            file: name,
            diagnostics,
        });
    }

    match format {
        OutputFormat::Text => {
            for report in &reports {
                for diagnostic in &report.diagnostics {
                    println!("{}", format_diagnostic(&report.file, diagnostic));
                }
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
    }

    let failed = reports
        .iter()
        .flat_map(|report| &report.diagnostics)
        .any(|diagnostic| diagnostic.severity == DiagnosticSeverity::Error);
    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn load_config(path: &Path) -> Result<EngineConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read engine options {}", path.display()))?;
    let value: Value = serde_json::from_str(&text)
        .with_context(|| format!("Engine options in {} are not JSON", path.display()))?;
    EngineConfig::from_json(value).with_context(|| format!("Invalid engine options in {}", path.display()))
}

/// `file:line:col: severity[code]: message`, with 1-based line and column.
fn format_diagnostic(file: &str, diagnostic: &Diagnostic) -> String {
    let start = diagnostic.range.start;
    let code = diagnostic
        .code
        .as_deref()
        .map_or_else(String::new, |code| format!("[{code}]"));
    format!(
        "{file}:{}:{}: {}{code}: {}",
        start.line + 1,
        start.character + 1,
        diagnostic.severity,
        diagnostic.message
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use landofile_lsp_core::Range;

    #[test]
    fn diagnostic_line_format() {
        let diagnostic = Diagnostic::error(Range::on_line(2, 4, 10), "Missing property \"cmd\".")
            .with_code("required");
        assert_eq!(
            format_diagnostic(".lando.yml", &diagnostic),
            ".lando.yml:3:5: error[required]: Missing property \"cmd\"."
        );
    }

    #[test]
    fn diagnostic_without_code() {
        let diagnostic = Diagnostic::warning(Range::default(), "odd");
        assert_eq!(format_diagnostic("f", &diagnostic), "f:1:1: warning: odd");
    }
}
