//! Analytical scroll/connector projection.
//!
//! One unified scroll position drives both panes. Each pane lays out only its
//! real rows at a fixed row height, and its offset is derived from running
//! counts of real rows, so no layout measurement is needed and the two sides
//! never drift apart.

mod connectors;
mod offsets;

pub use connectors::{
    ConnectorPalette, ConnectorShape, GutterBounds, VerticalSpan, Viewport,
};
pub use offsets::{RunningOffsets, SideOffsets};

use crate::domain::{RowModel, Side};
use crate::infra::app_config::AppConfig;
use connectors::ConnectorContext;
use serde::Serialize;
use std::sync::Arc;

/// Fixed vertical metrics. `row_height` applies to every row on both sides,
/// spacers included; this is the only place row height is defined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutMetrics {
    pub row_height: f32,
    /// Gap kept between a connector and the row borders it spans.
    pub inset: f32,
    /// Half height of a connector end that is positioned by an anchor line.
    pub anchor_half_band: f32,
}

const MIN_ROW_HEIGHT: f32 = 1.0;

impl Default for LayoutMetrics {
    fn default() -> Self {
        Self {
            row_height: 20.0,
            inset: 1.0,
            anchor_half_band: 2.0,
        }
    }
}

impl LayoutMetrics {
    pub fn from_config(config: &AppConfig) -> Self {
        let row_height = if config.row_height.is_finite() {
            config.row_height.max(MIN_ROW_HEIGHT)
        } else {
            MIN_ROW_HEIGHT
        };
        Self {
            row_height,
            inset: config.connector_inset.clamp(0.0, row_height / 2.0),
            anchor_half_band: config.anchor_half_band.clamp(0.0, row_height / 2.0),
        }
    }
}

/// Everything the presentation surface needs for one scroll/resize tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub scroll_top: f32,
    pub offsets: SideOffsets,
    pub connectors: Vec<ConnectorShape>,
}

/// Projection of one immutable row model.
#[derive(Debug, Clone)]
pub struct Projection {
    model: Arc<RowModel>,
    running: RunningOffsets,
    metrics: LayoutMetrics,
}

impl Projection {
    pub fn new(model: Arc<RowModel>, metrics: LayoutMetrics) -> Self {
        let running = RunningOffsets::new(model.rows());
        Self {
            model,
            running,
            metrics,
        }
    }

    pub fn model(&self) -> &RowModel {
        &self.model
    }

    pub fn metrics(&self) -> LayoutMetrics {
        self.metrics
    }

    pub fn running(&self) -> &RunningOffsets {
        &self.running
    }

    /// Height of the unified scroll space.
    pub fn total_height(&self) -> f32 {
        self.model.len() as f32 * self.metrics.row_height
    }

    /// Height of one pane's content (real rows only).
    pub fn side_height(&self, side: Side) -> f32 {
        self.running.total(side) as f32 * self.metrics.row_height
    }

    pub fn max_scroll(&self, viewport_height: f32) -> f32 {
        (self.total_height() - viewport_height.max(0.0)).max(0.0)
    }

    pub fn clamp_scroll(&self, scroll_top: f32, viewport_height: Option<f32>) -> f32 {
        let max = match viewport_height {
            Some(height) => self.max_scroll(height),
            None => self.total_height(),
        };
        if scroll_top.is_finite() {
            scroll_top.clamp(0.0, max)
        } else {
            0.0
        }
    }

    /// Row under the unified scroll position and how far into it the view is.
    pub fn cursor(&self, scroll_top: f32) -> (usize, f32) {
        let h = self.metrics.row_height;
        let scroll_top = scroll_top.max(0.0);
        let row = ((scroll_top / h).floor() as usize).min(self.model.len());
        let fraction = if row < self.model.len() {
            scroll_top - row as f32 * h
        } else {
            0.0
        };
        (row, fraction)
    }

    /// Per-side offsets for a unified scroll position.
    ///
    /// A side only advances through the fraction of the cursor row when that row
    /// has real content on it; across a spacer run the side holds still while the
    /// other side scrolls through the inserted or deleted lines.
    pub fn offsets(&self, scroll_top: f32) -> SideOffsets {
        let (row, fraction) = self.cursor(scroll_top);
        SideOffsets {
            left: self.side_offset(Side::Left, row, fraction),
            right: self.side_offset(Side::Right, row, fraction),
        }
    }

    fn side_offset(&self, side: Side, row: usize, fraction: f32) -> f32 {
        let base = self.running.before(side, row) as f32 * self.metrics.row_height;
        let real = self
            .model
            .rows()
            .get(row)
            .is_some_and(|visual| visual.is_real(side));
        if real { base + fraction } else { base }
    }

    /// Top of a row in the unified space; identical for both sides of the row.
    pub fn row_top(&self, index: usize) -> f32 {
        index as f32 * self.metrics.row_height
    }

    /// Top of a row in one pane's content, or `None` if the row is a spacer there.
    pub fn side_row_top(&self, side: Side, index: usize) -> Option<f32> {
        let row = self.model.rows().get(index)?;
        if !row.is_real(side) {
            return None;
        }
        Some(self.running.before(side, index) as f32 * self.metrics.row_height)
    }

    /// On-screen top of a row in one pane for the given offsets.
    pub fn screen_y(&self, side: Side, index: usize, offsets: SideOffsets) -> Option<f32> {
        self.side_row_top(side, index)
            .map(|top| top - offsets.get(side))
    }

    /// Scroll position of the first connector starting below `scroll_top`.
    pub fn next_change_after(&self, scroll_top: f32) -> Option<f32> {
        let threshold = scroll_top + self.metrics.row_height / 2.0;
        self.model
            .connectors()
            .iter()
            .map(|c| self.row_top(c.first_index))
            .find(|top| *top >= threshold)
    }

    /// Scroll position of the last connector starting above `scroll_top`.
    pub fn previous_change_before(&self, scroll_top: f32) -> Option<f32> {
        let threshold = scroll_top - self.metrics.row_height / 2.0;
        self.model
            .connectors()
            .iter()
            .map(|c| self.row_top(c.first_index))
            .rev()
            .find(|top| *top <= threshold)
    }

    /// Connector shapes intersecting the viewport.
    ///
    /// Without a measured viewport nothing is produced; the next tick with a
    /// viewport recomputes everything.
    pub fn connectors(
        &self,
        scroll_top: f32,
        viewport: Option<&Viewport>,
        palette: &ConnectorPalette,
    ) -> Vec<ConnectorShape> {
        let Some(viewport) = viewport else {
            return Vec::new();
        };

        let context = ConnectorContext {
            model: &self.model,
            running: &self.running,
            metrics: self.metrics,
            offsets: self.offsets(scroll_top),
        };

        self.model
            .connectors()
            .iter()
            .map(|meta| context.project(meta, viewport.gutter, palette))
            .filter(|shape| {
                shape.left.intersects(viewport.height) || shape.right.intersects(viewport.height)
            })
            .collect()
    }

    pub fn frame(
        &self,
        scroll_top: f32,
        viewport: Option<&Viewport>,
        palette: &ConnectorPalette,
    ) -> Frame {
        Frame {
            scroll_top,
            offsets: self.offsets(scroll_top),
            connectors: self.connectors(scroll_top, viewport, palette),
        }
    }
}
