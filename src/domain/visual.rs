//! Derived visual model: the single ordered row sequence shared by both panes,
//! and the connector descriptors linking changed regions across the gutter.
//!
//! Everything here is rebuilt from a `DiffFile` (plus optional full contents)
//! and handed out immutably.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::ops::RangeInclusive;
use std::sync::Arc;

/// One of the two panes. `Left` shows the old file, `Right` the new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

/// Shared prefix, changed middle and shared suffix of one side of a changed pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineSegments {
    pub before: String,
    pub changed: String,
    pub after: String,
}

/// Stable row identifier: the (old line, new line) pair the row shows.
///
/// Every line number appears on at most one row per side, and no row is empty on
/// both sides, so the pair is unique within a model and survives rebuilds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RowId {
    pub old: Option<u32>,
    pub new: Option<u32>,
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.old, self.new) {
            (Some(old), Some(new)) => write!(f, "o{}-n{}", old, new),
            (Some(old), None) => write!(f, "o{}", old),
            (None, Some(new)) => write!(f, "n{}", new),
            (None, None) => write!(f, "empty"),
        }
    }
}

/// Content of one side of a visual row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Cell {
    /// Unchanged line, present on both sides.
    Context { line: u32, content: Arc<str> },
    /// Old-only line.
    Removed { line: u32, content: Arc<str> },
    /// New-only line.
    Added { line: u32, content: Arc<str> },
    /// One half of a replaced pair, with its inline highlight split.
    Change {
        line: u32,
        content: Arc<str>,
        segments: InlineSegments,
    },
    /// Placeholder keeping the opposite side aligned. Carries no line data.
    Spacer,
}

impl Cell {
    pub fn line_number(&self) -> Option<u32> {
        match self {
            Cell::Context { line, .. }
            | Cell::Removed { line, .. }
            | Cell::Added { line, .. }
            | Cell::Change { line, .. } => Some(*line),
            Cell::Spacer => None,
        }
    }

    pub fn content(&self) -> Option<&str> {
        match self {
            Cell::Context { content, .. }
            | Cell::Removed { content, .. }
            | Cell::Added { content, .. }
            | Cell::Change { content, .. } => Some(content),
            Cell::Spacer => None,
        }
    }

    pub fn is_spacer(&self) -> bool {
        matches!(self, Cell::Spacer)
    }
}

/// One row of the unified scroll space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisualRow {
    id: RowId,
    left: Cell,
    right: Cell,
}

impl VisualRow {
    /// Builds a row from its two cells. Returns `None` for a spacer/spacer pair.
    pub fn new(left: Cell, right: Cell) -> Option<Self> {
        if left.is_spacer() && right.is_spacer() {
            return None;
        }
        let id = RowId {
            old: left.line_number(),
            new: right.line_number(),
        };
        Some(Self { id, left, right })
    }

    pub fn id(&self) -> RowId {
        self.id
    }

    pub fn left(&self) -> &Cell {
        &self.left
    }

    pub fn right(&self) -> &Cell {
        &self.right
    }

    pub fn cell(&self, side: Side) -> &Cell {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    /// Whether the given side shows real content on this row.
    pub fn is_real(&self, side: Side) -> bool {
        !self.cell(side).is_spacer()
    }

    /// Both sides carry content, so both panes must place this row at the same height.
    pub fn is_aligned(&self) -> bool {
        self.is_real(Side::Left) && self.is_real(Side::Right)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectorKind {
    Change,
    Added,
    Removed,
}

impl ConnectorKind {
    /// The side that has no rows of its own and is positioned by the anchor line.
    pub fn anchored_side(self) -> Option<Side> {
        match self {
            ConnectorKind::Change => None,
            ConnectorKind::Added => Some(Side::Left),
            ConnectorKind::Removed => Some(Side::Right),
        }
    }
}

impl fmt::Display for ConnectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectorKind::Change => write!(f, "change"),
            ConnectorKind::Added => write!(f, "added"),
            ConnectorKind::Removed => write!(f, "removed"),
        }
    }
}

/// A connector spanning a run of consecutive rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorMeta {
    pub kind: ConnectorKind,
    pub first_row: RowId,
    pub last_row: RowId,
    pub first_index: usize,
    pub last_index: usize,
    /// Line on the anchored side after which the change sits (0 = file top).
    /// Old-file line for `Added`, new-file line for `Removed`, `None` for `Change`.
    pub anchor: Option<u32>,
}

impl ConnectorMeta {
    pub fn rows(&self) -> RangeInclusive<usize> {
        self.first_index..=self.last_index
    }

    pub fn row_count(&self) -> usize {
        self.last_index - self.first_index + 1
    }
}

/// Rows and grouped connectors for one file, plus per-side line lookups.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RowModel {
    rows: Vec<VisualRow>,
    connectors: Vec<ConnectorMeta>,
    #[serde(skip)]
    old_rows: HashMap<u32, usize>,
    #[serde(skip)]
    new_rows: HashMap<u32, usize>,
}

impl RowModel {
    pub fn new(rows: Vec<VisualRow>, connectors: Vec<ConnectorMeta>) -> Self {
        let mut old_rows = HashMap::with_capacity(rows.len());
        let mut new_rows = HashMap::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            if let Some(line) = row.left().line_number() {
                old_rows.insert(line, index);
            }
            if let Some(line) = row.right().line_number() {
                new_rows.insert(line, index);
            }
        }
        Self {
            rows,
            connectors,
            old_rows,
            new_rows,
        }
    }

    pub fn rows(&self) -> &[VisualRow] {
        &self.rows
    }

    pub fn connectors(&self) -> &[ConnectorMeta] {
        &self.connectors
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the row showing `line` on `side`.
    pub fn row_for_line(&self, side: Side, line: u32) -> Option<usize> {
        match side {
            Side::Left => self.old_rows.get(&line).copied(),
            Side::Right => self.new_rows.get(&line).copied(),
        }
    }

    pub fn index_of(&self, id: RowId) -> Option<usize> {
        id.old
            .and_then(|line| self.row_for_line(Side::Left, line))
            .or_else(|| id.new.and_then(|line| self.row_for_line(Side::Right, line)))
    }

    /// Number of rows with real content on `side`.
    pub fn real_rows(&self, side: Side) -> usize {
        match side {
            Side::Left => self.old_rows.len(),
            Side::Right => self.new_rows.len(),
        }
    }
}
