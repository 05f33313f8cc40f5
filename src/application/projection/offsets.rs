use crate::domain::{Side, VisualRow};
use serde::Serialize;

/// Scroll offset of each pane, in pixels of that pane's own (spacer-free) content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SideOffsets {
    pub left: f32,
    pub right: f32,
}

impl SideOffsets {
    pub fn get(&self, side: Side) -> f32 {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }
}

/// Running count of real rows per side: `before(side, i)` is the number of rows
/// in `0..i` that show content on `side`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunningOffsets {
    left: Vec<u32>,
    right: Vec<u32>,
}

impl RunningOffsets {
    pub fn new(rows: &[VisualRow]) -> Self {
        let mut left = Vec::with_capacity(rows.len() + 1);
        let mut right = Vec::with_capacity(rows.len() + 1);
        let (mut l, mut r) = (0u32, 0u32);
        left.push(l);
        right.push(r);
        for row in rows {
            l += u32::from(row.is_real(Side::Left));
            r += u32::from(row.is_real(Side::Right));
            left.push(l);
            right.push(r);
        }
        Self { left, right }
    }

    /// Number of visual rows covered.
    pub fn rows(&self) -> usize {
        self.left.len().saturating_sub(1)
    }

    pub fn before(&self, side: Side, index: usize) -> u32 {
        let table = match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        };
        let index = index.min(table.len().saturating_sub(1));
        table.get(index).copied().unwrap_or(0)
    }

    pub fn total(&self, side: Side) -> u32 {
        self.before(side, self.rows())
    }
}
