use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Role of a single line inside a hunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    Context,
    Added,
    Removed,
}

/// One line of a hunk body.
///
/// `old_line_number` is set iff the line exists in the old file (context or
/// removed), `new_line_number` iff it exists in the new file (context or added).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffLine {
    pub kind: LineKind,
    /// Line text without the leading diff marker.
    pub content: Arc<str>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_line_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_line_number: Option<u32>,
}

impl DiffLine {
    pub fn context(content: &str, old: u32, new: u32) -> Self {
        Self {
            kind: LineKind::Context,
            content: Arc::from(content),
            old_line_number: Some(old),
            new_line_number: Some(new),
        }
    }

    pub fn added(content: &str, new: u32) -> Self {
        Self {
            kind: LineKind::Added,
            content: Arc::from(content),
            old_line_number: None,
            new_line_number: Some(new),
        }
    }

    pub fn removed(content: &str, old: u32) -> Self {
        Self {
            kind: LineKind::Removed,
            content: Arc::from(content),
            old_line_number: Some(old),
            new_line_number: None,
        }
    }
}

/// A contiguous change region of a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffHunk {
    /// The `@@ ... @@` line as it appeared in the input.
    pub header: String,
    pub old_start: u32,
    pub old_lines: u32,
    pub new_start: u32,
    pub new_lines: u32,
    /// Trailing text after the closing `@@` (usually the enclosing function).
    #[serde(default)]
    pub section: String,
    pub lines: Vec<DiffLine>,
}

impl DiffHunk {
    /// First old-file line number that follows this hunk.
    ///
    /// A zero-length side (`-12,0`) describes an insertion after line 12, so the
    /// line after the hunk is 13, not 12.
    pub fn old_end(&self) -> u32 {
        side_end(self.old_start, self.old_lines)
    }

    /// First new-file line number that follows this hunk.
    pub fn new_end(&self) -> u32 {
        side_end(self.new_start, self.new_lines)
    }

    /// First old-file line number covered by (or following) this hunk.
    pub fn old_first(&self) -> u32 {
        side_first(self.old_start, self.old_lines)
    }

    /// First new-file line number covered by (or following) this hunk.
    pub fn new_first(&self) -> u32 {
        side_first(self.new_start, self.new_lines)
    }

    pub fn additions(&self) -> usize {
        self.lines
            .iter()
            .filter(|line| line.kind == LineKind::Added)
            .count()
    }

    pub fn deletions(&self) -> usize {
        self.lines
            .iter()
            .filter(|line| line.kind == LineKind::Removed)
            .count()
    }
}

fn side_first(start: u32, count: u32) -> u32 {
    if count == 0 {
        start.saturating_add(1)
    } else {
        start.max(1)
    }
}

fn side_end(start: u32, count: u32) -> u32 {
    if count == 0 {
        start.saturating_add(1)
    } else {
        start.max(1).saturating_add(count)
    }
}

/// Change status of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Added,
    #[default]
    Modified,
    Deleted,
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileStatus::Added => write!(f, "added"),
            FileStatus::Modified => write!(f, "modified"),
            FileStatus::Deleted => write!(f, "deleted"),
        }
    }
}

/// One file section of a unified diff.
///
/// A `None` path means the file does not exist on that side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffFile {
    pub old_path: Option<String>,
    pub new_path: Option<String>,
    pub status: FileStatus,
    pub hunks: Vec<DiffHunk>,
    #[serde(default)]
    pub binary: bool,
}

impl DiffFile {
    /// Path shown to the user: the new path, or the old one for deletions.
    pub fn display_path(&self) -> &str {
        self.new_path
            .as_deref()
            .or(self.old_path.as_deref())
            .unwrap_or("")
    }

    pub fn additions(&self) -> usize {
        self.hunks.iter().map(DiffHunk::additions).sum()
    }

    pub fn deletions(&self) -> usize {
        self.hunks.iter().map(DiffHunk::deletions).sum()
    }

    pub fn lines(&self) -> impl Iterator<Item = &DiffLine> {
        self.hunks.iter().flat_map(|hunk| hunk.lines.iter())
    }
}

/// Every file section found in a diff, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffParseResult {
    pub files: Vec<DiffFile>,
}

impl DiffParseResult {
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DiffFile> {
        self.files.iter()
    }

    pub fn get(&self, index: usize) -> Option<&DiffFile> {
        self.files.get(index)
    }

    /// Looks a file up by either of its paths.
    pub fn find(&self, path: &str) -> Option<(usize, &DiffFile)> {
        self.files.iter().enumerate().find(|(_, file)| {
            file.new_path.as_deref() == Some(path) || file.old_path.as_deref() == Some(path)
        })
    }
}

impl<'a> IntoIterator for &'a DiffParseResult {
    type Item = &'a DiffFile;
    type IntoIter = std::slice::Iter<'a, DiffFile>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hunk(old_start: u32, old_lines: u32, new_start: u32, new_lines: u32) -> DiffHunk {
        DiffHunk {
            header: String::new(),
            old_start,
            old_lines,
            new_start,
            new_lines,
            section: String::new(),
            lines: Vec::new(),
        }
    }

    #[test]
    fn hunk_end_accounts_for_zero_length_sides() {
        let inserted = hunk(12, 0, 13, 2);
        assert_eq!(inserted.old_first(), 13);
        assert_eq!(inserted.old_end(), 13);
        assert_eq!(inserted.new_first(), 13);
        assert_eq!(inserted.new_end(), 15);

        let new_file = hunk(0, 0, 1, 3);
        assert_eq!(new_file.old_end(), 1);
        assert_eq!(new_file.new_end(), 4);
    }

    #[test]
    fn file_status_display() {
        assert_eq!(FileStatus::Added.to_string(), "added");
        assert_eq!(FileStatus::Deleted.to_string(), "deleted");
    }

    #[test]
    fn display_path_falls_back_to_old_path() {
        let file = DiffFile {
            old_path: Some("gone.rs".into()),
            new_path: None,
            status: FileStatus::Deleted,
            hunks: Vec::new(),
            binary: false,
        };
        assert_eq!(file.display_path(), "gone.rs");
    }
}
