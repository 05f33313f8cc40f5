use super::group_connectors;
use crate::domain::{
    Cell, ConnectorKind, ConnectorMeta, DiffFile, DiffHunk, DiffLine, LineKind, RowModel,
    VisualRow,
};
use crate::infra::diff::diff_pair;
use std::sync::Arc;

/// Full old/new file contents, one entry per line (line `n` is at index `n - 1`).
#[derive(Debug, Clone, Copy)]
pub struct FullContents<'a> {
    pub old: &'a [String],
    pub new: &'a [String],
}

impl<'a> FullContents<'a> {
    /// Both sides are needed to synthesize context rows; one side alone is ignored.
    pub fn from_sides(old: Option<&'a [String]>, new: Option<&'a [String]>) -> Option<Self> {
        match (old, new) {
            (Some(old), Some(new)) => Some(Self { old, new }),
            _ => None,
        }
    }

    fn old_line(&self, line: u32) -> Option<&'a str> {
        line_at(self.old, line)
    }

    fn new_line(&self, line: u32) -> Option<&'a str> {
        line_at(self.new, line)
    }
}

fn line_at(lines: &[String], line: u32) -> Option<&str> {
    let index = (line as usize).checked_sub(1)?;
    lines.get(index).map(String::as_str)
}

/// Fold state threaded through the row pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cursor {
    /// Most recent line number emitted on each side (0 = none yet).
    last_old: u32,
    last_new: u32,
    /// Next line number expected on each side.
    next_old: u32,
    next_new: u32,
}

impl Default for Cursor {
    fn default() -> Self {
        Self {
            last_old: 0,
            last_new: 0,
            next_old: 1,
            next_new: 1,
        }
    }
}

impl Cursor {
    fn saw_old(self, line: u32) -> Self {
        Self {
            last_old: line,
            next_old: self.next_old.max(line.saturating_add(1)),
            ..self
        }
    }

    fn saw_new(self, line: u32) -> Self {
        Self {
            last_new: line,
            next_new: self.next_new.max(line.saturating_add(1)),
            ..self
        }
    }

    fn past_hunk(self, hunk: &DiffHunk) -> Self {
        Self {
            next_old: self.next_old.max(hunk.old_end()),
            next_new: self.next_new.max(hunk.new_end()),
            ..self
        }
    }
}

#[derive(Default)]
struct RowSink {
    rows: Vec<VisualRow>,
    connectors: Vec<ConnectorMeta>,
}

impl RowSink {
    fn push(&mut self, left: Cell, right: Cell, connector: Option<(ConnectorKind, Option<u32>)>) {
        let Some(row) = VisualRow::new(left, right) else {
            return;
        };
        let index = self.rows.len();
        if let Some((kind, anchor)) = connector {
            self.connectors.push(ConnectorMeta {
                kind,
                first_row: row.id(),
                last_row: row.id(),
                first_index: index,
                last_index: index,
                anchor,
            });
        }
        self.rows.push(row);
    }
}

/// Builds the unified row sequence for one file.
///
/// With full contents, unchanged regions before, between and after hunks are
/// filled with context rows so the rows span the whole file. Without them only
/// hunk rows are produced. A file without hunks yields an empty model.
pub fn build_rows(
    file: &DiffFile,
    old_lines: Option<&[String]>,
    new_lines: Option<&[String]>,
) -> RowModel {
    if file.hunks.is_empty() {
        return RowModel::default();
    }

    let full = FullContents::from_sides(old_lines, new_lines);
    let mut sink = RowSink::default();
    let mut cursor = Cursor::default();

    for hunk in &file.hunks {
        if let Some(full) = full {
            cursor = emit_gap(cursor, hunk.old_first(), hunk.new_first(), full, &mut sink);
        }
        cursor = emit_hunk(cursor, hunk, &mut sink);
    }

    if let Some(full) = full {
        emit_gap(cursor, u32::MAX, u32::MAX, full, &mut sink);
    }

    let connectors = group_connectors(sink.connectors);
    log::debug!(
        "Built {} rows and {} connectors for {}",
        sink.rows.len(),
        connectors.len(),
        file.display_path()
    );
    RowModel::new(sink.rows, connectors)
}

/// Emits context rows for old lines `[next_old, old_until)` and new lines
/// `[next_new, new_until)`, paired positionally. Both ends are clamped to the
/// lines the contents actually have.
fn emit_gap(
    cursor: Cursor,
    old_until: u32,
    new_until: u32,
    full: FullContents<'_>,
    sink: &mut RowSink,
) -> Cursor {
    let old_range = cursor.next_old..old_until.min(end_of(full.old));
    let new_range = cursor.next_new..new_until.min(end_of(full.new));
    if old_range.len() != new_range.len() {
        log::warn!(
            "Gap ranges differ: old {:?}, new {:?}; unmatched lines are shown one-sided",
            old_range,
            new_range
        );
    }

    let mut old_iter = old_range.filter_map(|n| full.old_line(n).map(|text| (n, text)));
    let mut new_iter = new_range.filter_map(|n| full.new_line(n).map(|text| (n, text)));
    let mut cursor = cursor;

    loop {
        let left = old_iter.next();
        let right = new_iter.next();
        if left.is_none() && right.is_none() {
            break;
        }

        let left_cell = match left {
            Some((line, text)) => {
                cursor = cursor.saw_old(line);
                Cell::Context {
                    line,
                    content: Arc::from(text),
                }
            }
            None => Cell::Spacer,
        };
        let right_cell = match right {
            Some((line, text)) => {
                cursor = cursor.saw_new(line);
                Cell::Context {
                    line,
                    content: Arc::from(text),
                }
            }
            None => Cell::Spacer,
        };
        sink.push(left_cell, right_cell, None);
    }

    cursor
}

/// One past the last line number of `lines`.
fn end_of(lines: &[String]) -> u32 {
    u32::try_from(lines.len())
        .unwrap_or(u32::MAX)
        .saturating_add(1)
}

/// Emits the rows of one hunk, pairing adjacent removed/added lines into change rows.
fn emit_hunk(cursor: Cursor, hunk: &DiffHunk, sink: &mut RowSink) -> Cursor {
    let lines = &hunk.lines;
    let mut cursor = cursor;
    let mut i = 0;

    while i < lines.len() {
        let line = &lines[i];
        let next_kind = lines.get(i + 1).map(|next| next.kind);

        match (line.kind, next_kind) {
            (LineKind::Removed, Some(LineKind::Added)) => {
                cursor = emit_change(cursor, line, &lines[i + 1], sink);
                i += 2;
            }
            (LineKind::Added, Some(LineKind::Removed)) => {
                cursor = emit_change(cursor, &lines[i + 1], line, sink);
                i += 2;
            }
            (LineKind::Removed, _) => {
                let number = line.old_line_number.unwrap_or(cursor.next_old);
                sink.push(
                    Cell::Removed {
                        line: number,
                        content: line.content.clone(),
                    },
                    Cell::Spacer,
                    Some((ConnectorKind::Removed, Some(cursor.last_new))),
                );
                cursor = cursor.saw_old(number);
                i += 1;
            }
            (LineKind::Added, _) => {
                let number = line.new_line_number.unwrap_or(cursor.next_new);
                sink.push(
                    Cell::Spacer,
                    Cell::Added {
                        line: number,
                        content: line.content.clone(),
                    },
                    Some((ConnectorKind::Added, Some(cursor.last_old))),
                );
                cursor = cursor.saw_new(number);
                i += 1;
            }
            (LineKind::Context, _) => {
                let old = line.old_line_number.unwrap_or(cursor.next_old);
                let new = line.new_line_number.unwrap_or(cursor.next_new);
                sink.push(
                    Cell::Context {
                        line: old,
                        content: line.content.clone(),
                    },
                    Cell::Context {
                        line: new,
                        content: line.content.clone(),
                    },
                    None,
                );
                cursor = cursor.saw_old(old).saw_new(new);
                i += 1;
            }
        }
    }

    cursor.past_hunk(hunk)
}

fn emit_change(cursor: Cursor, removed: &DiffLine, added: &DiffLine, sink: &mut RowSink) -> Cursor {
    let old = removed.old_line_number.unwrap_or(cursor.next_old);
    let new = added.new_line_number.unwrap_or(cursor.next_new);
    let pair = diff_pair(&removed.content, &added.content);

    sink.push(
        Cell::Change {
            line: old,
            content: removed.content.clone(),
            segments: pair.old,
        },
        Cell::Change {
            line: new,
            content: added.content.clone(),
            segments: pair.next,
        },
        Some((ConnectorKind::Change, None)),
    );

    cursor.saw_old(old).saw_new(new)
}
