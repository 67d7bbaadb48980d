use serde_json::Value;

use super::{KeyLine, KeyPath, PathTracker, same_path};
use crate::document::utf16_len;
use crate::types::Range;

/// Best-effort range for `target`.
///
/// Replays the tracker and returns the first key line whose path equals
/// `target`, spanning from the key to the end of the line. Failing that, the
/// first line whose key equals the last segment; failing that, the first
/// line. Returns `None` only when the text has no lines at all.
pub fn locate<S: AsRef<str>>(text: &str, target: &[S], indent_width: usize) -> Option<Range> {
    let lines: Vec<&str> = text.lines().collect();
    let first = lines.first()?;

    let mut tracker = PathTracker::new(indent_width);
    for (n, line) in lines.iter().enumerate() {
        if let Some(key_line) = tracker.feed_line(line)
            && same_path(tracker.path(), target)
        {
            return Some(key_range(n, &key_line, line));
        }
    }

    if let Some(last) = target.last() {
        let last = last.as_ref();
        for (n, line) in lines.iter().enumerate() {
            if let Some(key_line) = KeyLine::parse(line)
                && key_line.key == last
            {
                return Some(key_range(n, &key_line, line));
            }
        }
    }

    Some(Range::on_line(0, 0, utf16_len(first)))
}

fn key_range(line: usize, key_line: &KeyLine<'_>, text: &str) -> Range {
    Range::on_line(line as u32, key_line.key_start, utf16_len(text))
}

/// Convert a JSON pointer into the document's key path.
///
/// `data` is walked alongside the pointer so that sequence indices can be
/// told apart from mapping keys that happen to be numeric; the former are
/// dropped. Segments past the end of `data` are kept as keys.
pub fn pointer_to_key_path(pointer: &str, data: &Value) -> KeyPath {
    let mut path = KeyPath::new();
    let mut current = Some(data);
    for raw in pointer.split('/').skip(1) {
        let segment = raw.replace("~1", "/").replace("~0", "~");
        current = match current {
            Some(Value::Array(items)) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            Some(Value::Object(map)) => {
                let next = map.get(&segment);
                path.push(segment);
                next
            }
            _ => {
                path.push(segment);
                None
            }
        };
    }
    path
}
