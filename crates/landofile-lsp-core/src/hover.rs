//! Hover documentation for keys.

use landofile_schema::{PropertyDescriptor, SchemaIndex, WILDCARD, value_label};

use crate::config::EngineConfig;
use crate::document::Document;
use crate::paths::{KeyPath, resolve_path};
use crate::types::{Hover, Position};

/// Hover for `word` (or the word under the cursor when `None`).
pub fn hover(
    doc: &Document,
    pos: Position,
    word: Option<&str>,
    index: &SchemaIndex,
    config: &EngineConfig,
) -> Option<Hover> {
    let under_cursor = doc.word_at(pos);
    let word = match word {
        Some(word) => word.to_string(),
        None => under_cursor.as_ref()?.0.clone(),
    };
    let range = under_cursor
        .filter(|(found, _)| *found == word)
        .map(|(_, range)| range);

    let mut path = resolve_path(doc.content(), pos.line as usize, config.indent_width);
    if path.last() == Some(&word) {
        path.pop();
    }

    let descriptor = hover_candidates(&path, &word)
        .iter()
        .find_map(|candidate| index.lookup(candidate).map(|(_, descriptor)| descriptor))?;

    Some(Hover {
        contents: render_markdown(&word, descriptor),
        range,
    })
}

/// Paths to try for `word` in context `path`, most specific first.
pub fn hover_candidates(path: &[String], word: &str) -> Vec<KeyPath> {
    let with = |prefix: &[String], last: &str| {
        let mut candidate = prefix.to_vec();
        candidate.push(last.to_string());
        candidate
    };

    let mut candidates = vec![
        with(path, word),
        vec![word.to_string()],
        with(path, WILDCARD),
        vec![WILDCARD.to_string()],
    ];
    for len in (0..path.len()).rev() {
        let candidate = with(&path[..len], word);
        if !candidates.contains(&candidate) {
            candidates.push(candidate);
        }
    }
    candidates
}

pub fn render_markdown(name: &str, descriptor: &PropertyDescriptor) -> String {
    let mut sections = Vec::new();

    if descriptor.deprecated {
        sections.push("**Deprecated**: avoid in new Landofiles.".to_string());
    }

    let mut heading = format!("**{name}**");
    if let Some(ty) = &descriptor.schema_type {
        heading.push_str(&format!(" `{ty}`"));
    }
    sections.push(heading);

    if let Some(description) = &descriptor.description {
        sections.push(description.clone());
    }

    let mut facts = Vec::new();
    if !descriptor.enum_values.is_empty() {
        facts.push(format!("- Allowed values: {}", code_list(&descriptor.enum_labels())));
    }
    if let Some(default) = &descriptor.default {
        facts.push(format!("- Default: `{}`", value_label(default)));
    }
    if !descriptor.examples.is_empty() {
        let examples: Vec<String> = descriptor.examples.iter().map(value_label).collect();
        facts.push(format!("- Examples: {}", code_list(&examples)));
    }
    if !facts.is_empty() {
        sections.push(facts.join("\n"));
    }

    sections.join("\n\n")
}

fn code_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("`{item}`"))
        .collect::<Vec<_>>()
        .join(", ")
}
