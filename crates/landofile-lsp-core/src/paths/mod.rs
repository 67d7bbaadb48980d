//! Mapping between text positions and key paths.
//!
//! Landofiles are edited while invalid, so nothing here parses YAML. A line
//! declares a key iff it matches `^(\s*)([A-Za-z0-9_-]+):`, and nesting is
//! inferred from indentation alone. Completion, hover, diagnostic placement
//! and the lints all go through this one heuristic so they agree with each
//! other even when it is wrong.

mod locator;
mod tracker;

pub use locator::{locate, pointer_to_key_path};
pub use tracker::{PathTracker, context_at, resolve_path};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::document::utf16_len;

/// Sequence of mapping keys from the document root.
///
/// Never contains sequence indices.
pub type KeyPath = Vec<String>;

static KEY_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\s*)([A-Za-z0-9_-]+):").unwrap());

/// A line that declares a mapping key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyLine<'a> {
    /// Leading whitespace, in characters.
    pub indent: usize,
    pub key: &'a str,
    /// UTF-16 column of the key's first character.
    pub key_start: u32,
    /// UTF-16 column just past the key (where the colon sits).
    pub key_end: u32,
}

impl<'a> KeyLine<'a> {
    pub fn parse(line: &'a str) -> Option<Self> {
        let caps = KEY_LINE.captures(line)?;
        let ws = caps.get(1)?.as_str();
        let key = caps.get(2)?.as_str();
        let key_start = utf16_len(ws);
        Some(Self {
            indent: ws.chars().count(),
            key,
            key_start,
            key_end: key_start + utf16_len(key),
        })
    }
}

/// Compare a tracked path against any slice of string-likes.
pub(crate) fn same_path<S: AsRef<str>>(path: &[String], target: &[S]) -> bool {
    path.len() == target.len() && path.iter().zip(target).all(|(a, b)| a == b.as_ref())
}
