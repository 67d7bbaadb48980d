//! Document abstraction for Landofile analysis.
//!
//! Documents are plain text buffers; every query re-derives what it needs from
//! the current content, so there is no parsed state to keep in sync.

use std::collections::HashMap;

use crate::types::{Position, Range};

/// A Landofile open in the editor or read from disk.
#[derive(Debug, Clone)]
pub struct Document {
    /// The document's URI or path.
    uri: String,
    /// The document content.
    content: String,
    /// Version number for tracking changes (optional, used by LSP).
    version: Option<i32>,
}

impl Document {
    /// Create a new document with the given URI and content.
    pub fn new(uri: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            content: content.into(),
            version: None,
        }
    }

    /// Create a new document with a version number.
    pub fn with_version(uri: impl Into<String>, content: impl Into<String>, version: i32) -> Self {
        Self {
            uri: uri.into(),
            content: content.into(),
            version: Some(version),
        }
    }

    /// Get the document's URI.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Get the document's content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Get the document's version, if set.
    pub fn version(&self) -> Option<i32> {
        self.version
    }

    /// Update the document content with a new version.
    pub fn set_content_with_version(&mut self, content: impl Into<String>, version: i32) {
        self.content = content.into();
        self.version = Some(version);
    }

    /// The text of a zero-based line, without its terminator.
    pub fn line(&self, line: u32) -> Option<&str> {
        self.content.lines().nth(line as usize)
    }

    /// The identifier-like word touching `pos`, with its range.
    ///
    /// Word characters are ASCII alphanumerics, `-` and `_`, which covers
    /// every Landofile key and recipe name.
    pub fn word_at(&self, pos: Position) -> Option<(String, Range)> {
        let text = self.line(pos.line)?;
        let chars: Vec<(u32, char)> = utf16_columns(text).collect();
        let cursor = chars
            .iter()
            .position(|&(col, _)| col >= pos.character)
            .unwrap_or(chars.len());

        let touches = |idx: usize| chars.get(idx).is_some_and(|&(_, c)| is_word_char(c));
        let anchor = if touches(cursor) {
            cursor
        } else if cursor > 0 && touches(cursor - 1) {
            cursor - 1
        } else {
            return None;
        };

        let mut start = anchor;
        while start > 0 && touches(start - 1) {
            start -= 1;
        }
        let mut end = anchor;
        while touches(end + 1) {
            end += 1;
        }

        let word: String = chars[start..=end].iter().map(|&(_, c)| c).collect();
        let (last_col, last_char) = chars[end];
        let range = Range::on_line(pos.line, chars[start].0, last_col + last_char.len_utf16() as u32);
        Some((word, range))
    }
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// Pair each char of `text` with its UTF-16 column.
pub(crate) fn utf16_columns(text: &str) -> impl Iterator<Item = (u32, char)> + '_ {
    text.chars().scan(0u32, |col, c| {
        let start = *col;
        *col += c.len_utf16() as u32;
        Some((start, c))
    })
}

/// UTF-16 length of `text`.
pub(crate) fn utf16_len(text: &str) -> u32 {
    text.encode_utf16().count() as u32
}

/// A document store for managing open documents.
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: HashMap<String, Document>,
}

impl DocumentStore {
    /// Create a new empty document store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open or update a document in the store.
    pub fn open(&mut self, uri: impl Into<String>, content: impl Into<String>, version: i32) {
        let uri = uri.into();
        self.documents
            .insert(uri.clone(), Document::with_version(uri, content, version));
    }

    /// Update a document's content.
    pub fn change(&mut self, uri: &str, content: impl Into<String>, version: i32) {
        if let Some(doc) = self.documents.get_mut(uri) {
            doc.set_content_with_version(content, version);
        }
    }

    /// Close a document (remove from store).
    pub fn close(&mut self, uri: &str) {
        self.documents.remove(uri);
    }

    /// Get a document by URI.
    pub fn get(&self, uri: &str) -> Option<&Document> {
        self.documents.get(uri)
    }
}
