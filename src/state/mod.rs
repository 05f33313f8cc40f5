use crate::application::projection::{ConnectorPalette, Frame, LayoutMetrics, Projection, Viewport};
use crate::application::rows::build_rows;
use crate::domain::{DiffFile, DiffParseResult, RowModel};
use crate::infra::app_config::AppConfig;
use crate::infra::cli::diff::FileContents;
use crate::infra::diff::parse_unified_diff;
use crate::infra::hash::hash_diff;
use std::sync::Arc;

/// Event-driven holder of everything the viewer shows.
///
/// Every handler runs to completion and leaves the state consistent; row
/// models are rebuilt into fresh `Arc`s and never mutated once handed out.
#[derive(Debug, Clone)]
pub struct ViewerState {
    config: AppConfig,
    palette: ConnectorPalette,
    diff_hash: Option<u64>,
    parsed: DiffParseResult,
    selected: Option<usize>,
    projection: Projection,
    scroll_top: f32,
    viewport: Option<Viewport>,
}

impl ViewerState {
    pub fn new(config: AppConfig) -> Self {
        let metrics = LayoutMetrics::from_config(&config);
        Self {
            palette: ConnectorPalette::from_config(&config),
            config,
            diff_hash: None,
            parsed: DiffParseResult::default(),
            selected: None,
            projection: Projection::new(Arc::new(RowModel::default()), metrics),
            scroll_top: 0.0,
            viewport: None,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn palette(&self) -> &ConnectorPalette {
        &self.palette
    }

    /// Parses new diff text. Returns `false` when the text is unchanged and
    /// the current selection was kept.
    pub fn load_diff(&mut self, diff_text: &str) -> bool {
        let hash = hash_diff(diff_text);
        if self.diff_hash == Some(hash) {
            log::debug!("Diff text unchanged; keeping current model");
            return false;
        }

        self.parsed = parse_unified_diff(diff_text);
        self.diff_hash = Some(hash);
        self.selected = None;
        self.replace_model(RowModel::default());
        true
    }

    pub fn files(&self) -> &DiffParseResult {
        &self.parsed
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_file(&self) -> Option<&DiffFile> {
        self.selected.and_then(|index| self.parsed.get(index))
    }

    /// Selects a file and rebuilds its rows. Without contents only hunk rows
    /// are shown. Scroll resets to the top.
    pub fn select_file(&mut self, index: usize, contents: Option<&FileContents>) -> bool {
        let Some(file) = self.parsed.get(index) else {
            log::warn!(
                "File index {} out of range ({} files)",
                index,
                self.parsed.len()
            );
            return false;
        };

        let model = build_rows(
            file,
            contents.map(|c| c.old.as_slice()),
            contents.map(|c| c.new.as_slice()),
        );
        self.selected = Some(index);
        self.replace_model(model);
        true
    }

    fn replace_model(&mut self, model: RowModel) {
        self.projection = Projection::new(Arc::new(model), self.projection.metrics());
        self.scroll_top = 0.0;
    }

    pub fn model(&self) -> &RowModel {
        self.projection.model()
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn scroll_top(&self) -> f32 {
        self.scroll_top
    }

    pub fn viewport(&self) -> Option<&Viewport> {
        self.viewport.as_ref()
    }

    pub fn on_scroll_to(&mut self, scroll_top: f32) -> f32 {
        self.scroll_top = self
            .projection
            .clamp_scroll(scroll_top, self.viewport.map(|v| v.height));
        self.scroll_top
    }

    pub fn on_scroll_by(&mut self, dy: f32) -> f32 {
        self.on_scroll_to(self.scroll_top + dy)
    }

    pub fn on_resize(&mut self, viewport: Viewport) {
        self.viewport = Some(viewport);
        self.on_scroll_to(self.scroll_top);
    }

    pub fn jump_next_change(&mut self) -> bool {
        match self.projection.next_change_after(self.scroll_top) {
            Some(target) => {
                self.on_scroll_to(target);
                true
            }
            None => false,
        }
    }

    pub fn jump_previous_change(&mut self) -> bool {
        match self.projection.previous_change_before(self.scroll_top) {
            Some(target) => {
                self.on_scroll_to(target);
                true
            }
            None => false,
        }
    }

    /// Offsets and connectors for the current scroll position, or `None`
    /// when no file is selected.
    pub fn frame(&self) -> Option<Frame> {
        self.selected?;
        Some(
            self.projection
                .frame(self.scroll_top, self.viewport.as_ref(), &self.palette),
        )
    }
}

impl Default for ViewerState {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}
