//! Completion: child keys at the cursor's nesting level, or allowed values
//! after `key:`.

use landofile_schema::{PropertyDescriptor, SchemaIndex};

use crate::config::EngineConfig;
use crate::document::Document;
use crate::paths::{KeyLine, context_at, resolve_path};
use crate::types::{CompletionItem, CompletionItemKind, Position};

pub fn complete(
    doc: &Document,
    pos: Position,
    index: &SchemaIndex,
    config: &EngineConfig,
) -> Vec<CompletionItem> {
    let line = pos.line as usize;

    if let Some(text) = doc.line(pos.line)
        && let Some(key_line) = KeyLine::parse(text)
        && pos.character > key_line.key_end
    {
        let path = resolve_path(doc.content(), line, config.indent_width);
        return value_completions(index, &path);
    }

    let parent = context_at(doc.content(), line, pos.character as usize, config.indent_width);
    property_completions(index, &parent)
}

/// Keys documented directly under `parent`.
pub fn property_completions<S: AsRef<str>>(index: &SchemaIndex, parent: &[S]) -> Vec<CompletionItem> {
    let Some(resolved) = index.resolve_segments(parent) else {
        return Vec::new();
    };
    index
        .children(&resolved)
        .into_iter()
        .map(|(name, descriptor)| property_item(name, descriptor))
        .collect()
}

fn property_item(name: &str, descriptor: &PropertyDescriptor) -> CompletionItem {
    CompletionItem {
        label: name.to_string(),
        kind: CompletionItemKind::Property,
        detail: descriptor.schema_type.as_ref().map(ToString::to_string),
        documentation: descriptor.description.clone(),
        deprecated: descriptor.deprecated,
        insert_text: Some(format!("{name}: ")),
    }
}

/// Values the schema allows for the key at `path`.
pub fn value_completions<S: AsRef<str>>(index: &SchemaIndex, path: &[S]) -> Vec<CompletionItem> {
    let Some((_, descriptor)) = index.lookup(path) else {
        return Vec::new();
    };

    let labels = if !descriptor.enum_values.is_empty() {
        descriptor.enum_labels()
    } else if descriptor
        .schema_type
        .as_ref()
        .is_some_and(|ty| ty.admits("boolean"))
    {
        vec!["true".to_string(), "false".to_string()]
    } else {
        return Vec::new();
    };

    labels
        .into_iter()
        .map(|label| CompletionItem {
            label,
            kind: CompletionItemKind::Value,
            detail: None,
            documentation: None,
            deprecated: false,
            insert_text: None,
        })
        .collect()
}
