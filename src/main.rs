//! diffpane CLI entry point.
//!
//! Loads a diff, builds the aligned side-by-side rows for one file and prints
//! them to the terminal, or dumps the full view as JSON.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use diffpane::application::projection::Viewport;
use diffpane::commands::{self, FileSummary, RowView};
use diffpane::domain::{Cell, ConnectorKind, DiffParseResult, FileStatus};
use diffpane::infra::app_config::load_config;
use diffpane::infra::cli::diff::{
    DiffSource, acquire_diff, load_contents, read_stdin_diff, try_read_stdin_diff,
};
use diffpane::state::ViewerState;

#[derive(Parser, Debug)]
#[command(name = "diffpane")]
#[command(version)]
#[command(about = "Side-by-side diff viewer with aligned panes and change connectors", long_about = None)]
struct Args {
    /// Repository to read changes from
    #[arg(long, default_value = ".")]
    repo: PathBuf,

    /// Show staged changes instead of unstaged ones
    #[arg(long)]
    staged: bool,

    /// Branch, tag, or commit to diff from
    #[arg(long)]
    from: Option<String>,

    /// Branch, tag, or commit to diff to (requires --from; default: working tree)
    #[arg(long, requires = "from")]
    to: Option<String>,

    /// Old file of a file pair
    #[arg(long, requires = "new", conflicts_with = "from")]
    old: Option<PathBuf>,

    /// New file of a file pair
    #[arg(long, requires = "old")]
    new: Option<PathBuf>,

    /// Read the diff from stdin
    #[arg(long, conflicts_with_all = ["from", "old"])]
    stdin: bool,

    /// File to show, by path or index (default: first file)
    #[arg(long)]
    file: Option<String>,

    /// Unified scroll position in pixels
    #[arg(long, default_value_t = 0.0)]
    scroll: f32,

    /// Viewport height in pixels; enables connectors and limits the printed rows
    #[arg(long)]
    height: Option<f32>,

    /// Viewport width in pixels
    #[arg(long, default_value_t = 1200.0)]
    width: f32,

    /// Terminal columns used for the side-by-side rendering
    #[arg(long, default_value_t = 160)]
    columns: usize,

    /// Print the view as JSON
    #[arg(long)]
    json: bool,

    /// List the files of the diff and exit
    #[arg(long)]
    list: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    let config = load_config();
    let source = resolve_source(&args)?;
    let diff_text = acquire_diff(&source, config.context_lines)?;

    let mut state = ViewerState::new(config);
    state.load_diff(&diff_text);

    if args.list {
        for file in commands::file_summaries(state.files()) {
            println!("{}", summary_line(&file));
        }
        return Ok(());
    }

    let Some(index) = resolve_file(state.files(), args.file.as_deref())? else {
        println!("No files in diff.");
        return Ok(());
    };

    let contents = match state.files().get(index) {
        Some(file) => load_contents(&source, file).unwrap_or_else(|err| {
            log::warn!("Showing hunks only for {}: {:#}", file.display_path(), err);
            None
        }),
        None => None,
    };
    if !state.select_file(index, contents.as_ref()) {
        anyhow::bail!("No file at index {}", index);
    }

    if let Some(height) = args.height {
        let viewport = Viewport::new(args.width, height, state.config());
        state.on_resize(viewport);
    }
    state.on_scroll_to(args.scroll);

    if args.json {
        let snapshot = commands::snapshot(&state);
        let json = serde_json::to_string_pretty(&snapshot).context("Failed to serialize view")?;
        println!("{}", json);
        return Ok(());
    }

    print_view(&state, args.columns);
    Ok(())
}

fn resolve_source(args: &Args) -> Result<DiffSource> {
    if let (Some(old), Some(new)) = (&args.old, &args.new) {
        return Ok(DiffSource::FilePair {
            old: old.clone(),
            new: new.clone(),
        });
    }

    if args.stdin {
        let diff = read_stdin_diff()?;
        if diff.trim().is_empty() {
            anyhow::bail!("No diff provided via stdin");
        }
        return Ok(DiffSource::Stdin(diff));
    }

    if let Some(from) = &args.from {
        return Ok(DiffSource::GitRange {
            repo: args.repo.clone(),
            from: from.clone(),
            to: args.to.clone(),
        });
    }

    if let Some(diff) = try_read_stdin_diff()? {
        return Ok(DiffSource::Stdin(diff));
    }

    Ok(DiffSource::WorkingTree {
        repo: args.repo.clone(),
        staged: args.staged,
    })
}

fn resolve_file(parsed: &DiffParseResult, selector: Option<&str>) -> Result<Option<usize>> {
    if parsed.is_empty() {
        return Ok(None);
    }
    let Some(selector) = selector else {
        return Ok(Some(0));
    };

    if let Some((index, _)) = parsed.find(selector) {
        return Ok(Some(index));
    }
    match selector.parse::<usize>() {
        Ok(index) if index < parsed.len() => Ok(Some(index)),
        _ => anyhow::bail!(
            "No file matching '{}'. Use --list to see the files in the diff.",
            selector
        ),
    }
}

fn summary_line(file: &FileSummary) -> String {
    let status = match file.status {
        FileStatus::Added => 'A',
        FileStatus::Modified => 'M',
        FileStatus::Deleted => 'D',
    };
    let binary = if file.binary { " (binary)" } else { "" };
    format!(
        "{:>3} {} {} +{} -{}{}",
        file.index, status, file.path, file.additions, file.deletions, binary
    )
}

fn print_view(state: &ViewerState, columns: usize) {
    if let Some(file) = state.selected_file() {
        println!(
            "{} ({}, +{} -{})",
            file.display_path(),
            file.status,
            file.additions(),
            file.deletions()
        );
    }

    let rows = commands::row_views(state.model());
    let projection = state.projection();
    let (first, _) = projection.cursor(state.scroll_top());
    let visible = match state.viewport() {
        Some(viewport) => (viewport.height / projection.metrics().row_height).ceil() as usize,
        None => rows.len(),
    };

    // line number (5) + marker (2) per pane, 3 for the gutter
    let pane = columns.saturating_sub(3) / 2;
    let text_width = pane.saturating_sub(7);

    for row in rows.iter().skip(first).take(visible) {
        println!(
            "{}{}{}",
            render_cell(&row.left, text_width),
            gutter_glyph(row),
            render_cell(&row.right, text_width)
        );
    }
}

fn gutter_glyph(row: &RowView) -> &'static str {
    match row.connector {
        Some(ConnectorKind::Change) => " ~ ",
        Some(ConnectorKind::Removed) => " < ",
        Some(ConnectorKind::Added) => " > ",
        None => " | ",
    }
}

fn render_cell(cell: &Cell, width: usize) -> String {
    let marker = match cell {
        Cell::Context { .. } => ' ',
        Cell::Removed { .. } => '-',
        Cell::Added { .. } => '+',
        Cell::Change { .. } => '~',
        Cell::Spacer => ' ',
    };
    let number = cell
        .line_number()
        .map(|n| n.to_string())
        .unwrap_or_default();
    let content: String = cell
        .content()
        .unwrap_or_default()
        .replace('\t', "    ")
        .chars()
        .take(width)
        .collect();
    format!("{:>5}{} {:<width$}", number, marker, content, width = width)
}
