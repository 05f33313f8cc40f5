//! Unified diff text handling: parsing into the domain model and inline
//! change splitting for paired lines.

pub mod inline;
pub mod parser;

pub use inline::{InlinePair, diff_pair};
pub use parser::parse_unified_diff;

use std::borrow::Cow;

/// Rewrites `\r\n` and bare `\r` line endings to `\n`.
pub fn normalize_newlines(text: &str) -> Cow<'_, str> {
    if !text.contains('\r') {
        return Cow::Borrowed(text);
    }
    Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
}

/// Splits file contents into lines, 1-indexed by position + 1.
///
/// A trailing newline does not produce an extra empty line.
pub fn split_lines(text: &str) -> Vec<String> {
    let normalized = normalize_newlines(text);
    if normalized.is_empty() {
        return Vec::new();
    }
    let body = normalized.strip_suffix('\n').unwrap_or(&normalized);
    body.split('\n').map(str::to_string).collect()
}
