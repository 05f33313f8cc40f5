//! Serializable payloads for the presentation surface, and the handlers that
//! produce them from a `ViewerState`.

use crate::application::projection::{Frame, LayoutMetrics, Viewport};
use crate::domain::{Cell, ConnectorKind, DiffParseResult, FileStatus, RowModel};
use crate::infra::cli::diff::FileContents;
use crate::state::ViewerState;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSummary {
    pub index: usize,
    pub path: String,
    pub old_path: Option<String>,
    pub new_path: Option<String>,
    pub status: FileStatus,
    pub additions: usize,
    pub deletions: usize,
    pub hunks: usize,
    pub binary: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowView {
    /// Display form of the row id, usable as a DOM key.
    pub id: String,
    pub index: usize,
    pub left: Cell,
    pub right: Cell,
    /// Kind of the connector covering this row, if any.
    pub connector: Option<ConnectorKind>,
}

/// Everything needed to draw the current view in one payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub files: Vec<FileSummary>,
    pub selected: Option<usize>,
    pub metrics: LayoutMetrics,
    pub total_height: f32,
    pub rows: Vec<RowView>,
    pub frame: Option<Frame>,
    /// SVG for the connector overlay, present once a viewport is known.
    pub overlay: Option<String>,
}

pub fn file_summaries(parsed: &DiffParseResult) -> Vec<FileSummary> {
    parsed
        .iter()
        .enumerate()
        .map(|(index, file)| FileSummary {
            index,
            path: file.display_path().to_string(),
            old_path: file.old_path.clone(),
            new_path: file.new_path.clone(),
            status: file.status,
            additions: file.additions(),
            deletions: file.deletions(),
            hunks: file.hunks.len(),
            binary: file.binary,
        })
        .collect()
}

pub fn row_views(model: &RowModel) -> Vec<RowView> {
    let mut covering = vec![None; model.len()];
    for connector in model.connectors() {
        for index in connector.rows() {
            if let Some(slot) = covering.get_mut(index) {
                *slot = Some(connector.kind);
            }
        }
    }

    model
        .rows()
        .iter()
        .zip(covering)
        .enumerate()
        .map(|(index, (row, connector))| RowView {
            id: row.id().to_string(),
            index,
            left: row.left().clone(),
            right: row.right().clone(),
            connector,
        })
        .collect()
}

/// Renders the connectors of a frame as a standalone SVG sized to the viewport.
pub fn render_svg_overlay(frame: &Frame, viewport: &Viewport, opacity: f32) -> String {
    let width = viewport.gutter.right_x + viewport.gutter.left_x;
    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{:.1}" height="{:.1}" viewBox="0 0 {:.1} {:.1}">"#,
        width, viewport.height, width, viewport.height
    );
    for shape in &frame.connectors {
        let _ = write!(
            svg,
            r#"<path data-kind="{}" data-rows="{}:{}" d="{}" fill="{}" fill-opacity="{:.2}"/>"#,
            shape.kind,
            shape.first_row,
            shape.last_row,
            shape.path_data(),
            shape.color,
            opacity
        );
    }
    svg.push_str("</svg>");
    svg
}

pub fn load_diff(state: &mut ViewerState, diff_text: &str) -> Vec<FileSummary> {
    state.load_diff(diff_text);
    file_summaries(state.files())
}

pub fn select_file(
    state: &mut ViewerState,
    index: usize,
    contents: Option<&FileContents>,
) -> Result<Vec<RowView>, String> {
    if !state.select_file(index, contents) {
        return Err(format!("No file at index {}", index));
    }
    Ok(row_views(state.model()))
}

pub fn scroll_to(state: &mut ViewerState, scroll_top: f32) -> Option<Frame> {
    state.on_scroll_to(scroll_top);
    state.frame()
}

pub fn resize(state: &mut ViewerState, width: f32, height: f32) -> Option<Frame> {
    let viewport = Viewport::new(width, height, state.config());
    state.on_resize(viewport);
    state.frame()
}

pub fn snapshot(state: &ViewerState) -> Snapshot {
    let frame = state.frame();
    let overlay = match (&frame, state.viewport()) {
        (Some(frame), Some(viewport)) => Some(render_svg_overlay(
            frame,
            viewport,
            state.palette().opacity,
        )),
        _ => None,
    };

    Snapshot {
        files: file_summaries(state.files()),
        selected: state.selected(),
        metrics: state.projection().metrics(),
        total_height: state.projection().total_height(),
        rows: row_views(state.model()),
        frame,
        overlay,
    }
}
