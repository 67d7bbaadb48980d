//! Conversion between landofile-lsp-core types and tower_lsp::lsp_types.

use tower_lsp::lsp_types::{
    CompletionItem as LspCompletionItem, CompletionItemKind as LspCompletionItemKind,
    Diagnostic as LspDiagnostic, DiagnosticSeverity as LspSeverity, Documentation,
    Hover as LspHover, HoverContents, MarkupContent, MarkupKind, NumberOrString,
    Position as LspPosition, Range as LspRange,
};

use landofile_lsp_core::types::{
    CompletionItem, CompletionItemKind, Diagnostic, DiagnosticSeverity, Hover, Position, Range,
};

/// Convert a core Position to an lsp-types Position.
pub fn position_to_lsp(pos: &Position) -> LspPosition {
    LspPosition {
        line: pos.line,
        character: pos.character,
    }
}

/// Convert an lsp-types Position to a core Position.
pub fn position_from_lsp(pos: &LspPosition) -> Position {
    Position::new(pos.line, pos.character)
}

/// Convert a core Range to an lsp-types Range.
pub fn range_to_lsp(range: &Range) -> LspRange {
    LspRange {
        start: position_to_lsp(&range.start),
        end: position_to_lsp(&range.end),
    }
}

/// Convert a core DiagnosticSeverity to an lsp-types DiagnosticSeverity.
pub fn severity_to_lsp(severity: &DiagnosticSeverity) -> LspSeverity {
    match severity {
        DiagnosticSeverity::Error => LspSeverity::ERROR,
        DiagnosticSeverity::Warning => LspSeverity::WARNING,
        DiagnosticSeverity::Information => LspSeverity::INFORMATION,
        DiagnosticSeverity::Hint => LspSeverity::HINT,
    }
}

/// Convert a core Diagnostic to an lsp-types Diagnostic.
pub fn diagnostic_to_lsp(diag: &Diagnostic) -> LspDiagnostic {
    LspDiagnostic {
        range: range_to_lsp(&diag.range),
        severity: Some(severity_to_lsp(&diag.severity)),
        code: diag.code.clone().map(NumberOrString::String),
        code_description: None,
        source: diag.source.clone(),
        message: diag.message.clone(),
        related_information: None,
        tags: None,
        data: None,
    }
}

fn markdown(value: &str) -> MarkupContent {
    MarkupContent {
        kind: MarkupKind::Markdown,
        value: value.to_string(),
    }
}

pub fn completion_item_to_lsp(item: &CompletionItem) -> LspCompletionItem {
    LspCompletionItem {
        label: item.label.clone(),
        kind: Some(match item.kind {
            CompletionItemKind::Property => LspCompletionItemKind::PROPERTY,
            CompletionItemKind::Value => LspCompletionItemKind::VALUE,
        }),
        detail: item.detail.clone(),
        documentation: item
            .documentation
            .as_deref()
            .map(|doc| Documentation::MarkupContent(markdown(doc))),
        deprecated: item.deprecated.then_some(true),
        insert_text: item.insert_text.clone(),
        ..Default::default()
    }
}

pub fn hover_to_lsp(hover: &Hover) -> LspHover {
    LspHover {
        contents: HoverContents::Markup(markdown(&hover.contents)),
        range: hover.range.as_ref().map(range_to_lsp),
    }
}
