//! Best-effort unified diff parser.
//!
//! Unrecognized lines are skipped and the parser never fails; input without any
//! `diff --git` header yields an empty result.

use super::normalize_newlines;
use crate::domain::{DiffFile, DiffHunk, DiffLine, DiffParseResult, FileStatus};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref FILE_HEADER_RE: Regex =
        Regex::new(r"^diff --git a/(.+) b/(.+)$").expect("diff --git header regex");
    static ref HUNK_HEADER_RE: Regex =
        Regex::new(r"^@@ -(\d+)(?:,(\d+))? \+(\d+)(?:,(\d+))? @@ ?(.*)$")
            .expect("hunk header regex");
}

const DEV_NULL: &str = "/dev/null";

/// Parses unified diff text (any mix of `\n`, `\r\n`, `\r`) into files, hunks and lines.
pub fn parse_unified_diff(diff_text: &str) -> DiffParseResult {
    let normalized = normalize_newlines(diff_text);
    let mut parser = Parser::default();
    // A final newline terminates the last line; it does not start an empty one.
    let body = normalized.strip_suffix('\n').unwrap_or(&normalized);
    for line in body.split('\n') {
        parser.feed(line);
    }
    let result = parser.finish();
    log::debug!(
        "Parsed {} file(s), {} hunk(s) from diff text",
        result.len(),
        result.iter().map(|f| f.hunks.len()).sum::<usize>()
    );
    result
}

#[derive(Default)]
struct Parser {
    files: Vec<DiffFile>,
    current: Option<PendingFile>,
}

struct PendingFile {
    file: DiffFile,
    explicit_status: bool,
    hunk: Option<OpenHunk>,
}

struct OpenHunk {
    hunk: DiffHunk,
    old_line: u32,
    new_line: u32,
    old_remaining: u32,
    new_remaining: u32,
}

impl Parser {
    fn feed(&mut self, line: &str) {
        if line.starts_with("diff --git ") {
            self.start_file(line);
            return;
        }

        let Some(pending) = self.current.as_mut() else {
            return;
        };

        // While the open hunk still expects lines, body lines win over headers so
        // that a removed "-- x" line (rendered "--- x") is not taken as a path.
        if let Some(open) = pending.hunk.as_mut()
            && open.expects_more()
            && open.push_body(line, true)
        {
            return;
        }

        if line.starts_with("new file mode") {
            pending.file.status = FileStatus::Added;
            pending.explicit_status = true;
        } else if line.starts_with("deleted file mode") {
            pending.file.status = FileStatus::Deleted;
            pending.explicit_status = true;
        } else if let Some(rest) = line.strip_prefix("--- ") {
            pending.file.old_path = header_path(rest, "a/");
        } else if let Some(rest) = line.strip_prefix("+++ ") {
            pending.file.new_path = header_path(rest, "b/");
        } else if line.starts_with("@@") {
            pending.close_hunk();
            match parse_hunk_header(line) {
                Some(hunk) => pending.hunk = Some(OpenHunk::new(hunk)),
                None => log::debug!("Skipping malformed hunk header: {}", line),
            }
        } else if line.starts_with("Binary files ") || line.starts_with("GIT binary patch") {
            pending.file.binary = true;
        } else if let Some(open) = pending.hunk.as_mut() {
            // Header counts can be wrong; keep accepting marked lines.
            open.push_body(line, false);
        }
    }

    fn start_file(&mut self, header: &str) {
        self.finish_file();

        let (old_path, new_path) = match FILE_HEADER_RE.captures(header) {
            Some(caps) => (caps[1].to_string(), caps[2].to_string()),
            None => {
                let rest = header.trim_start_matches("diff --git ").trim();
                match rest.split_once(' ') {
                    Some((old, new)) => (old.to_string(), new.to_string()),
                    None => (rest.to_string(), rest.to_string()),
                }
            }
        };

        self.current = Some(PendingFile {
            file: DiffFile {
                old_path: Some(old_path),
                new_path: Some(new_path),
                status: FileStatus::Modified,
                hunks: Vec::new(),
                binary: false,
            },
            explicit_status: false,
            hunk: None,
        });
    }

    fn finish_file(&mut self) {
        if let Some(pending) = self.current.take() {
            self.files.push(pending.finalize());
        }
    }

    fn finish(mut self) -> DiffParseResult {
        self.finish_file();
        DiffParseResult { files: self.files }
    }
}

impl PendingFile {
    fn close_hunk(&mut self) {
        if let Some(open) = self.hunk.take() {
            self.file.hunks.push(open.hunk);
        }
    }

    fn finalize(mut self) -> DiffFile {
        self.close_hunk();
        let mut file = self.file;

        if self.explicit_status {
            match file.status {
                FileStatus::Added => file.old_path = None,
                FileStatus::Deleted => file.new_path = None,
                FileStatus::Modified => {}
            }
        } else {
            file.status = match (&file.old_path, &file.new_path) {
                (None, Some(_)) => FileStatus::Added,
                (Some(_), None) => FileStatus::Deleted,
                _ => FileStatus::Modified,
            };
        }

        file
    }
}

impl OpenHunk {
    fn new(hunk: DiffHunk) -> Self {
        Self {
            old_line: hunk.old_start,
            new_line: hunk.new_start,
            old_remaining: hunk.old_lines,
            new_remaining: hunk.new_lines,
            hunk,
        }
    }

    fn expects_more(&self) -> bool {
        self.old_remaining > 0 || self.new_remaining > 0
    }

    /// Appends a body line. `in_budget` is true while the header counts say more
    /// lines belong to this hunk. Returns false for lines that are not body lines.
    fn push_body(&mut self, line: &str, in_budget: bool) -> bool {
        match line.as_bytes().first() {
            Some(b'+') => {
                if line.starts_with("+++") && !(in_budget && self.new_remaining > 0) {
                    return false;
                }
                self.push_added(&line[1..]);
                true
            }
            Some(b'-') => {
                if line.starts_with("---") && !(in_budget && self.old_remaining > 0) {
                    return false;
                }
                self.push_removed(&line[1..]);
                true
            }
            Some(b' ') => {
                self.push_context(&line[1..]);
                true
            }
            // "\ No newline at end of file"
            Some(b'\\') => true,
            None if in_budget && self.old_remaining > 0 && self.new_remaining > 0 => {
                self.push_context("");
                true
            }
            _ => false,
        }
    }

    fn push_added(&mut self, content: &str) {
        self.hunk.lines.push(DiffLine::added(content, self.new_line));
        self.new_line = self.new_line.saturating_add(1);
        self.new_remaining = self.new_remaining.saturating_sub(1);
    }

    fn push_removed(&mut self, content: &str) {
        self.hunk
            .lines
            .push(DiffLine::removed(content, self.old_line));
        self.old_line = self.old_line.saturating_add(1);
        self.old_remaining = self.old_remaining.saturating_sub(1);
    }

    fn push_context(&mut self, content: &str) {
        self.hunk
            .lines
            .push(DiffLine::context(content, self.old_line, self.new_line));
        self.old_line = self.old_line.saturating_add(1);
        self.new_line = self.new_line.saturating_add(1);
        self.old_remaining = self.old_remaining.saturating_sub(1);
        self.new_remaining = self.new_remaining.saturating_sub(1);
    }
}

fn parse_hunk_header(line: &str) -> Option<DiffHunk> {
    let caps = HUNK_HEADER_RE.captures(line)?;
    let number = |idx: usize, default: u32| -> Option<u32> {
        match caps.get(idx) {
            Some(m) => m.as_str().parse().ok(),
            None => Some(default),
        }
    };

    let (old_start, old_lines) = (number(1, 1)?, number(2, 1)?);
    let (new_start, new_lines) = (number(3, 1)?, number(4, 1)?);
    // The line after each side must still be a representable line number.
    old_start.checked_add(old_lines)?.checked_add(1)?;
    new_start.checked_add(new_lines)?.checked_add(1)?;

    Some(DiffHunk {
        header: line.to_string(),
        old_start,
        old_lines,
        new_start,
        new_lines,
        section: caps
            .get(5)
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default(),
        lines: Vec::new(),
    })
}

/// Path from a `---`/`+++` header: `/dev/null` means absent, the git prefix is dropped.
fn header_path(rest: &str, prefix: &str) -> Option<String> {
    // Plain `diff -u` appends a tab and a timestamp.
    let raw = rest.split('\t').next().unwrap_or(rest).trim_end();
    let raw = raw.trim_matches('"');
    if raw == DEV_NULL {
        return None;
    }
    Some(raw.strip_prefix(prefix).unwrap_or(raw).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LineKind;

    #[test]
    fn parses_modified_file_with_change_pair() {
        let diff = "diff --git a/a.txt b/a.txt\n@@ -1,2 +1,2 @@\n-hello\n+hello world\n keep";
        let result = parse_unified_diff(diff);
        assert_eq!(result.len(), 1);

        let file = &result.files[0];
        assert_eq!(file.status, FileStatus::Modified);
        assert_eq!(file.old_path.as_deref(), Some("a.txt"));
        assert_eq!(file.new_path.as_deref(), Some("a.txt"));
        assert_eq!(file.hunks.len(), 1);

        let lines = &file.hunks[0].lines;
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], DiffLine::removed("hello", 1));
        assert_eq!(lines[1], DiffLine::added("hello world", 1));
        assert_eq!(lines[2], DiffLine::context("keep", 2, 2));
    }

    #[test]
    fn new_file_has_no_old_path() {
        let diff = "diff --git a/x.txt b/x.txt\nnew file mode 100644\nindex 0000000..e69de29\n--- /dev/null\n+++ b/x.txt\n@@ -0,0 +1,2 @@\n+one\n+two\n";
        let result = parse_unified_diff(diff);
        let file = &result.files[0];
        assert_eq!(file.old_path, None);
        assert_eq!(file.new_path.as_deref(), Some("x.txt"));
        assert_eq!(file.status, FileStatus::Added);
        assert_eq!(file.hunks[0].old_start, 0);
        assert_eq!(file.hunks[0].old_lines, 0);
        assert_eq!(file.hunks[0].lines[1], DiffLine::added("two", 2));
    }

    #[test]
    fn deleted_file_status_is_inferred_from_paths() {
        let diff = "diff --git a/old.rs b/old.rs\n--- a/old.rs\n+++ /dev/null\n@@ -1 +0,0 @@\n-fn main() {}\n";
        let file = &parse_unified_diff(diff).files[0];
        assert_eq!(file.status, FileStatus::Deleted);
        assert_eq!(file.new_path, None);
        assert_eq!(file.hunks[0].old_lines, 1);
        assert_eq!(file.hunks[0].new_lines, 0);
        assert_eq!(file.hunks[0].lines[0], DiffLine::removed("fn main() {}", 1));
    }

    #[test]
    fn explicit_mode_without_paths_still_clears_missing_side() {
        let diff = "diff --git a/empty.txt b/empty.txt\nnew file mode 100644\nindex 0000000..e69de29\n";
        let file = &parse_unified_diff(diff).files[0];
        assert_eq!(file.status, FileStatus::Added);
        assert_eq!(file.old_path, None);
        assert!(file.hunks.is_empty());
    }

    #[test]
    fn counts_default_to_one() {
        let diff = "diff --git a/f b/f\n@@ -3 +3 @@ fn helper()\n-a\n+b\n";
        let hunk = &parse_unified_diff(diff).files[0].hunks[0];
        assert_eq!((hunk.old_start, hunk.old_lines), (3, 1));
        assert_eq!((hunk.new_start, hunk.new_lines), (3, 1));
        assert_eq!(hunk.section, "fn helper()");
        assert_eq!(hunk.header, "@@ -3 +3 @@ fn helper()");
    }

    #[test]
    fn multiple_files_and_hunks() {
        let diff = "\
diff --git a/one.txt b/one.txt
index 1111111..2222222 100644
--- a/one.txt
+++ b/one.txt
@@ -1,3 +1,3 @@
 a
-b
+B
 c
@@ -10,2 +10,3 @@
 j
+k
 l
diff --git a/two.txt b/two.txt
--- a/two.txt
+++ b/two.txt
@@ -5,1 +5,1 @@
-x
+y
";
        let result = parse_unified_diff(diff);
        assert_eq!(result.len(), 2);
        assert_eq!(result.files[0].hunks.len(), 2);
        assert_eq!(result.files[0].additions(), 2);
        assert_eq!(result.files[0].deletions(), 1);

        let second = &result.files[0].hunks[1];
        assert_eq!(second.lines[1], DiffLine::added("k", 11));
        assert_eq!(second.lines[2], DiffLine::context("l", 11, 12));

        assert_eq!(result.files[1].display_path(), "two.txt");
        assert_eq!(result.files[1].hunks[0].lines[0].old_line_number, Some(5));
    }

    #[test]
    fn no_newline_marker_is_ignored() {
        let diff = "diff --git a/f b/f\n@@ -1 +1 @@\n-old\n\\ No newline at end of file\n+new\n\\ No newline at end of file\n";
        let lines = &parse_unified_diff(diff).files[0].hunks[0].lines;
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].kind, LineKind::Removed);
        assert_eq!(lines[1].kind, LineKind::Added);
    }

    #[test]
    fn removed_line_starting_with_dashes_stays_in_hunk() {
        let diff = "diff --git a/notes.md b/notes.md\n--- a/notes.md\n+++ b/notes.md\n@@ -1,2 +1,2 @@\n--- separator\n+++ banner\n keep\n";
        let file = &parse_unified_diff(diff).files[0];
        assert_eq!(file.old_path.as_deref(), Some("notes.md"));
        assert_eq!(file.new_path.as_deref(), Some("notes.md"));
        let lines = &file.hunks[0].lines;
        assert_eq!(lines[0], DiffLine::removed("-- separator", 1));
        assert_eq!(lines[1], DiffLine::added("++ banner", 1));
        assert_eq!(lines[2], DiffLine::context("keep", 2, 2));
    }

    #[test]
    fn stripped_blank_context_line_is_kept() {
        let diff = "diff --git a/f b/f\n@@ -1,3 +1,3 @@\n a\n\n-b\n+c\n";
        let lines = &parse_unified_diff(diff).files[0].hunks[0].lines;
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[1], DiffLine::context("", 2, 2));
        assert_eq!(lines[2], DiffLine::removed("b", 3));
    }

    #[test]
    fn garbage_input_yields_nothing() {
        assert!(parse_unified_diff("").is_empty());
        assert!(parse_unified_diff("hello\n+not a diff\n@@ nope @@\n").is_empty());
    }

    #[test]
    fn lines_before_first_hunk_are_ignored() {
        let diff = "diff --git a/f b/f\n+stray\n-stray\n@@ -1 +1 @@\n-a\n+b\n";
        let file = &parse_unified_diff(diff).files[0];
        assert_eq!(file.hunks.len(), 1);
        assert_eq!(file.hunks[0].lines.len(), 2);
    }

    #[test]
    fn binary_files_are_flagged() {
        let diff = "diff --git a/logo.png b/logo.png\nindex 1..2 100644\nBinary files a/logo.png and b/logo.png differ\n";
        let file = &parse_unified_diff(diff).files[0];
        assert!(file.binary);
        assert!(file.hunks.is_empty());
        assert_eq!(file.status, FileStatus::Modified);
    }

    #[test]
    fn header_without_prefixes_is_accepted() {
        let diff = "diff --git src/x.rs src/x.rs\n@@ -1 +1 @@\n-a\n+b\n";
        let file = &parse_unified_diff(diff).files[0];
        assert_eq!(file.old_path.as_deref(), Some("src/x.rs"));
        assert_eq!(file.new_path.as_deref(), Some("src/x.rs"));
    }

    #[test]
    fn plain_diff_timestamps_are_stripped() {
        assert_eq!(
            header_path("a/src/lib.rs\t2024-01-01 00:00:00", "a/").as_deref(),
            Some("src/lib.rs")
        );
        assert_eq!(header_path("/dev/null", "a/"), None);
    }

    #[test]
    fn crlf_and_lf_inputs_parse_identically() {
        let lf = "diff --git a/a b/a\n--- a/a\n+++ b/a\n@@ -1,2 +1,2 @@\n-x\n+y\n z\n";
        let crlf = lf.replace('\n', "\r\n");
        let cr = lf.replace('\n', "\r");
        assert_eq!(parse_unified_diff(lf), parse_unified_diff(&crlf));
        assert_eq!(parse_unified_diff(lf), parse_unified_diff(&cr));
        assert!(
            parse_unified_diff(&crlf).files[0]
                .lines()
                .all(|line| !line.content.contains('\r'))
        );
    }

    #[test]
    fn oversized_hunk_header_is_rejected() {
        assert!(parse_hunk_header("@@ -4294967295,2 +1,2 @@").is_none());
        assert!(parse_hunk_header("@@ -1,2 +4294967290,10 @@").is_none());
        assert!(parse_hunk_header("@@ -99999999999 +1 @@").is_none());

        let hunk = parse_hunk_header("@@ -4294967294,0 +1 @@").unwrap();
        assert_eq!(hunk.old_start, 4294967294);
        assert_eq!(hunk.old_first(), u32::MAX);
    }

    #[test]
    fn lines_after_rejected_header_are_dropped() {
        let diff = "diff --git a/f b/f\n@@ -1 +1 @@\n-a\n+b\n@@ -4294967295,2 +1,2 @@\n-x\n+y\n";
        let file = &parse_unified_diff(diff).files[0];
        assert_eq!(file.hunks.len(), 1);
        assert_eq!(
            file.hunks[0].lines,
            vec![DiffLine::removed("a", 1), DiffLine::added("b", 1)]
        );
    }

    #[test]
    fn lines_past_the_header_count_saturate_at_the_limit() {
        let diff = "diff --git a/f b/f\n@@ -4294967292,2 +4294967292,2 @@\n a\n-b\n+c\n+d\n+e\n+f\n";
        let lines = &parse_unified_diff(diff).files[0].hunks[0].lines;
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], DiffLine::context("a", 4294967292, 4294967292));
        assert_eq!(lines[1], DiffLine::removed("b", 4294967293));
        assert_eq!(lines[4].new_line_number, Some(u32::MAX));
        assert_eq!(lines[5].new_line_number, Some(u32::MAX));
    }

    #[test]
    fn truncated_hunk_keeps_only_present_lines() {
        let diff = "diff --git a/f b/f\n@@ -1,3 +1,3 @@\n a\n";
        let lines = &parse_unified_diff(diff).files[0].hunks[0].lines;
        assert_eq!(lines, &vec![DiffLine::context("a", 1, 1)]);

        let without_newline = "diff --git a/f b/f\n@@ -1,3 +1,3 @@\n a";
        assert_eq!(parse_unified_diff(without_newline), parse_unified_diff(diff));
    }
}
