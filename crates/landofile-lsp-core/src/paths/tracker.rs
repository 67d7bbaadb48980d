use super::{KeyLine, KeyPath};

/// Indentation-driven key path state machine.
///
/// Feed it key lines top to bottom; [`PathTracker::path`] is then the path
/// of the most recent key. Dedents jump to depth `indent / indent_width + 1`,
/// which is only exact when the document uses `indent_width` consistently.
#[derive(Debug, Clone)]
pub struct PathTracker {
    indent_width: usize,
    path: KeyPath,
    indent: usize,
}

impl PathTracker {
    pub fn new(indent_width: usize) -> Self {
        Self {
            indent_width: indent_width.max(1),
            path: KeyPath::new(),
            indent: 0,
        }
    }

    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Parent path a key at `indent` would have, without consuming it.
    pub fn parent_for(&self, indent: usize) -> KeyPath {
        if indent == 0 {
            return KeyPath::new();
        }
        let kept = if indent > self.indent {
            self.path.len()
        } else if indent == self.indent {
            self.path.len().saturating_sub(1)
        } else {
            let target = indent / self.indent_width + 1;
            self.path.len().min(target).saturating_sub(1)
        };
        self.path[..kept].to_vec()
    }

    pub fn push_key(&mut self, indent: usize, key: &str) {
        let mut path = self.parent_for(indent);
        path.push(key.to_string());
        self.path = path;
        self.indent = indent;
    }

    /// Consume one line; returns the key line when it declared a key.
    pub fn feed_line<'a>(&mut self, line: &'a str) -> Option<KeyLine<'a>> {
        let key_line = KeyLine::parse(line)?;
        self.push_key(key_line.indent, key_line.key);
        Some(key_line)
    }
}

/// Key path in effect at `line`: lines `0..=line` are scanned, so a key on
/// `line` itself is the last segment.
pub fn resolve_path(text: &str, line: usize, indent_width: usize) -> KeyPath {
    let mut tracker = PathTracker::new(indent_width);
    for current in text.lines().take(line.saturating_add(1)) {
        tracker.feed_line(current);
    }
    tracker.path
}

/// Parent path for a key typed at (`line`, `column`).
///
/// Only lines before `line` are scanned; the cursor line contributes its
/// indentation (capped at the cursor column) as a virtual key.
pub fn context_at(text: &str, line: usize, column: usize, indent_width: usize) -> KeyPath {
    let mut tracker = PathTracker::new(indent_width);
    let mut cursor_line = "";
    for (n, current) in text.lines().enumerate() {
        if n == line {
            cursor_line = current;
            break;
        }
        tracker.feed_line(current);
    }
    let indent = cursor_line
        .chars()
        .take_while(|c| c.is_whitespace())
        .count()
        .min(column);
    tracker.parent_for(indent)
}
