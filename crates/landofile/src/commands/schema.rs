//! `landofile schema`: dump the flattened schema index.

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use serde_json::{Map, Value};

use landofile_lsp::FileSchemaSource;
use landofile_lsp_core::SchemaSource;
use landofile_schema::SchemaIndex;

pub fn execute(schema: &Path, path: Option<&str>) -> Result<ExitCode> {
    let raw = FileSchemaSource::new(schema)
        .load()
        .with_context(|| format!("Failed to load schema {}", schema.display()))?;
    let index = SchemaIndex::flatten(&raw);

    let output = match path {
        Some(path) => match index.get(path) {
            Some(descriptor) => serde_json::to_value(descriptor)?,
            None => bail!("No schema entry at \"{path}\""),
        },
        None => index_to_json(&index)?,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(ExitCode::SUCCESS)
}

fn index_to_json(index: &SchemaIndex) -> Result<Value> {
    let mut entries = Map::new();
    for (path, descriptor) in index.iter() {
        entries.insert(path.to_string(), serde_json::to_value(descriptor)?);
    }
    Ok(Value::Object(entries))
}
