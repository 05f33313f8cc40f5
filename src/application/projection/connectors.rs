use super::{LayoutMetrics, RunningOffsets, SideOffsets};
use crate::domain::{ConnectorKind, ConnectorMeta, RowId, RowModel, Side};
use crate::infra::app_config::AppConfig;
use serde::Serialize;
use std::fmt::Write;

/// Horizontal geometry of the gutter between the two panes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GutterBounds {
    /// Right edge of the left column.
    pub left_x: f32,
    pub curve_start_x: f32,
    pub curve_end_x: f32,
    /// Left edge of the right column.
    pub right_x: f32,
}

impl GutterBounds {
    /// Gutter of `gutter_width` centered in a container of `width`, with the
    /// curve inset by `curve_margin` on both ends.
    pub fn centered(width: f32, gutter_width: f32, curve_margin: f32) -> Self {
        let gutter_width = gutter_width.clamp(0.0, width.max(0.0));
        let left_x = ((width - gutter_width) / 2.0).max(0.0);
        let right_x = left_x + gutter_width;
        let margin = curve_margin.clamp(0.0, gutter_width / 2.0);
        Self {
            left_x,
            curve_start_x: left_x + margin,
            curve_end_x: right_x - margin,
            right_x,
        }
    }

    pub fn mid_x(&self) -> f32 {
        (self.curve_start_x + self.curve_end_x) / 2.0
    }
}

/// Measured viewport. Connectors are only produced once one is known.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub height: f32,
    pub gutter: GutterBounds,
}

impl Viewport {
    pub fn new(width: f32, height: f32, config: &AppConfig) -> Self {
        Self {
            height: height.max(0.0),
            gutter: GutterBounds::centered(width, config.gutter_width, config.curve_margin),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectorPalette {
    pub change: String,
    pub removed: String,
    pub added: String,
    pub opacity: f32,
}

impl Default for ConnectorPalette {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

impl ConnectorPalette {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            change: config.colors.change.clone(),
            removed: config.colors.removed.clone(),
            added: config.colors.added.clone(),
            opacity: config.connector_opacity.clamp(0.0, 1.0),
        }
    }

    pub fn color_for(&self, kind: ConnectorKind) -> &str {
        match kind {
            ConnectorKind::Change => &self.change,
            ConnectorKind::Removed => &self.removed,
            ConnectorKind::Added => &self.added,
        }
    }
}

/// Vertical extent on one side, in screen pixels relative to the viewport top.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VerticalSpan {
    pub top: f32,
    pub bottom: f32,
}

impl VerticalSpan {
    fn shifted(self, dy: f32) -> Self {
        Self {
            top: self.top - dy,
            bottom: self.bottom - dy,
        }
    }

    pub fn intersects(&self, height: f32) -> bool {
        self.bottom >= 0.0 && self.top <= height
    }
}

/// A connector resolved to pixel space, ready to be drawn as a filled curve.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorShape {
    pub kind: ConnectorKind,
    pub first_row: RowId,
    pub last_row: RowId,
    pub left: VerticalSpan,
    pub right: VerticalSpan,
    pub bounds: GutterBounds,
    pub color: String,
}

impl ConnectorShape {
    /// Closed SVG outline: straight into the gutter, a cubic across to the right
    /// top, down the right edge, a cubic back to the left bottom.
    pub fn path_data(&self) -> String {
        let b = &self.bounds;
        let mid = b.mid_x();
        let (lt, lb) = (self.left.top, self.left.bottom);
        let (rt, rb) = (self.right.top, self.right.bottom);

        let mut d = String::with_capacity(160);
        let _ = write!(d, "M {:.1} {:.1} ", b.left_x, lt);
        let _ = write!(d, "L {:.1} {:.1} ", b.curve_start_x, lt);
        let _ = write!(
            d,
            "C {:.1} {:.1} {:.1} {:.1} {:.1} {:.1} ",
            mid, lt, mid, rt, b.curve_end_x, rt
        );
        let _ = write!(d, "L {:.1} {:.1} ", b.right_x, rt);
        let _ = write!(d, "L {:.1} {:.1} ", b.right_x, rb);
        let _ = write!(d, "L {:.1} {:.1} ", b.curve_end_x, rb);
        let _ = write!(
            d,
            "C {:.1} {:.1} {:.1} {:.1} {:.1} {:.1} ",
            mid, rb, mid, lb, b.curve_start_x, lb
        );
        let _ = write!(d, "L {:.1} {:.1} Z", b.left_x, lb);
        d
    }
}

pub(super) struct ConnectorContext<'a> {
    pub model: &'a RowModel,
    pub running: &'a RunningOffsets,
    pub metrics: LayoutMetrics,
    pub offsets: SideOffsets,
}

impl ConnectorContext<'_> {
    pub fn project(
        &self,
        meta: &ConnectorMeta,
        gutter: GutterBounds,
        palette: &ConnectorPalette,
    ) -> ConnectorShape {
        ConnectorShape {
            kind: meta.kind,
            first_row: meta.first_row,
            last_row: meta.last_row,
            left: self.side_span(meta, Side::Left).shifted(self.offsets.left),
            right: self.side_span(meta, Side::Right).shifted(self.offsets.right),
            bounds: gutter,
            color: palette.color_for(meta.kind).to_string(),
        }
    }

    /// Span in the side's content coordinates (before scrolling).
    fn side_span(&self, meta: &ConnectorMeta, side: Side) -> VerticalSpan {
        let h = self.metrics.row_height;

        if meta.kind.anchored_side() == Some(side) {
            let y = self.anchor_y(side, meta.anchor);
            let band = self.metrics.anchor_half_band;
            return VerticalSpan {
                top: y - band,
                bottom: y + band,
            };
        }

        let top = self.running.before(side, meta.first_index) as f32 * h;
        let bottom = self.running.before(side, meta.last_index + 1) as f32 * h;
        let inset = self.metrics.inset;
        VerticalSpan {
            top: top + inset,
            bottom: (bottom - inset).max(top + inset),
        }
    }

    /// Bottom edge of the anchor line on `side`; the file top when the anchor is
    /// 0 or not present in this model.
    fn anchor_y(&self, side: Side, anchor: Option<u32>) -> f32 {
        let Some(line) = anchor.filter(|line| *line > 0) else {
            return 0.0;
        };
        match self.model.row_for_line(side, line) {
            Some(row) => (self.running.before(side, row) + 1) as f32 * self.metrics.row_height,
            None => {
                log::warn!("Connector anchor line {} not found on {:?} side", line, side);
                0.0
            }
        }
    }
}
