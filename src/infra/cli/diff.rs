//! Diff acquisition from various sources.

use crate::domain::{DiffFile, SourceError};
use crate::infra::diff::split_lines;
use anyhow::{Context, Result};
use similar::TextDiff;
use std::io::{IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Source of diff input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffSource {
    /// Diff text read from stdin; full contents are not available
    Stdin(String),

    /// Uncommitted changes (working tree vs. index, or index vs. HEAD when staged)
    WorkingTree { repo: PathBuf, staged: bool },

    /// Diff between git revisions; without `to` the working tree is the new side
    GitRange {
        repo: PathBuf,
        from: String,
        to: Option<String>,
    },

    /// Two files on disk compared directly
    FilePair { old: PathBuf, new: PathBuf },
}

/// Full old/new contents of one file, one entry per line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileContents {
    pub old: Vec<String>,
    pub new: Vec<String>,
}

/// Try to read diff from stdin (non-destructive check)
/// Returns Some(diff) if stdin has content, None otherwise
pub fn try_read_stdin_diff() -> Result<Option<String>> {
    if std::io::stdin().is_terminal() {
        return Ok(None);
    }

    let mut buffer = String::new();
    match std::io::stdin().read_to_string(&mut buffer) {
        Ok(0) => Ok(None),
        Ok(_) => Ok(Some(buffer)),
        Err(_) => Ok(None),
    }
}

/// Acquire diff text from stdin (blocking - assumes stdin has content)
pub fn read_stdin_diff() -> Result<String> {
    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .context("Failed to read from stdin")?;
    Ok(buffer)
}

/// Acquire unified diff text from a source.
///
/// An empty result is an error for every source except stdin, so callers can
/// tell "nothing changed" apart from a successful load.
pub fn acquire_diff(source: &DiffSource, context_lines: u32) -> Result<String> {
    let context_arg = format!("-U{}", context_lines);

    match source {
        DiffSource::Stdin(diff) => Ok(diff.clone()),

        DiffSource::WorkingTree { repo, staged } => {
            let root = require_repo(repo)?;
            let mut args = vec!["diff", "--no-color", "--no-ext-diff", context_arg.as_str()];
            if *staged {
                args.push("--cached");
            }
            let diff = run_git_text(&root, &args)?;

            if diff.is_empty() {
                if *staged {
                    anyhow::bail!("No staged changes. Stage some changes first with `git add`.");
                }
                anyhow::bail!("No uncommitted changes in {}.", root.display());
            }

            Ok(diff)
        }

        DiffSource::GitRange { repo, from, to } => {
            let root = require_repo(repo)?;
            let mut args = vec![
                "diff",
                "--no-color",
                "--no-ext-diff",
                context_arg.as_str(),
                from.as_str(),
            ];
            if let Some(to) = to {
                args.push(to.as_str());
            }

            let diff = run_git_text(&root, &args).map_err(|err| match err {
                SourceError::CommandFailed { ref stderr, .. }
                    if stderr.contains("unknown revision") =>
                {
                    anyhow::anyhow!(
                        "Could not find reference '{}'{}. Run `git branch -a` to see available refs.",
                        from,
                        to.as_ref().map(|t| format!(" or '{}'", t)).unwrap_or_default()
                    )
                }
                other => other.into(),
            })?;

            if diff.is_empty() {
                anyhow::bail!(
                    "No diff between '{}' and '{}'.",
                    from,
                    to.as_deref().unwrap_or("the working tree")
                );
            }

            Ok(diff)
        }

        DiffSource::FilePair { old, new } => {
            let old_text = read_file(old)?;
            let new_text = read_file(new)?;
            let diff = file_pair_diff(
                &pair_label(old),
                &old_text,
                &pair_label(new),
                &new_text,
                context_lines,
            );

            if diff.is_empty() {
                anyhow::bail!(
                    "{} and {} are identical.",
                    old.display(),
                    new.display()
                );
            }

            Ok(diff)
        }
    }
}

/// Load the full old/new contents of `file` from the place its diff came from.
///
/// Returns `None` when the source cannot supply contents (stdin) or the file is
/// binary. The missing side of an added or deleted file is empty.
pub fn load_contents(source: &DiffSource, file: &DiffFile) -> Result<Option<FileContents>> {
    if file.binary {
        return Ok(None);
    }

    let contents = match source {
        DiffSource::Stdin(_) => return Ok(None),

        DiffSource::WorkingTree { repo, staged } => {
            let root = require_repo(repo)?;
            let old_rev = if *staged { "HEAD" } else { "" };
            let old = git_side(&root, old_rev, file.old_path.as_deref())?;
            let new = if *staged {
                git_side(&root, "", file.new_path.as_deref())?
            } else {
                worktree_side(&root, file.new_path.as_deref())?
            };
            FileContents { old, new }
        }

        DiffSource::GitRange { repo, from, to } => {
            let root = require_repo(repo)?;
            let old = git_side(&root, from, file.old_path.as_deref())?;
            let new = match to {
                Some(to) => git_side(&root, to, file.new_path.as_deref())?,
                None => worktree_side(&root, file.new_path.as_deref())?,
            };
            FileContents { old, new }
        }

        DiffSource::FilePair { old, new } => FileContents {
            old: split_lines(&read_file(old)?),
            new: split_lines(&read_file(new)?),
        },
    };

    log::debug!(
        "Loaded {} old and {} new lines for {}",
        contents.old.len(),
        contents.new.len(),
        file.display_path()
    );
    Ok(Some(contents))
}

/// Unified diff of two texts with a `diff --git` header, as git would print it.
pub fn file_pair_diff(
    old_label: &str,
    old_text: &str,
    new_label: &str,
    new_text: &str,
    context_lines: u32,
) -> String {
    let diff = TextDiff::from_lines(old_text, new_text);
    let old_header = format!("a/{}", old_label);
    let new_header = format!("b/{}", new_label);
    let body = diff
        .unified_diff()
        .context_radius(context_lines as usize)
        .header(&old_header, &new_header)
        .to_string();

    if body.is_empty() {
        return body;
    }
    format!("diff --git {} {}\n{}", old_header, new_header, body)
}

/// Get the git root directory for a given path
pub fn find_repo_root(path: &Path) -> Option<PathBuf> {
    let mut current = Some(path);

    while let Some(p) = current {
        // `.git` is a file in linked worktrees and submodules
        if p.join(".git").exists() {
            return Some(p.to_path_buf());
        }
        current = p.parent();
    }

    None
}

fn require_repo(repo: &Path) -> Result<PathBuf, SourceError> {
    let absolute = if repo.is_absolute() {
        repo.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|source| SourceError::Io {
                path: repo.display().to_string(),
                source,
            })?
            .join(repo)
    };
    find_repo_root(&absolute).ok_or_else(|| SourceError::NotARepository(repo.display().to_string()))
}

fn run_git(root: &Path, args: &[&str]) -> Result<Vec<u8>, SourceError> {
    let git_path = which::which("git").map_err(|_| SourceError::BinaryNotFound("git".into()))?;
    let output = Command::new(git_path)
        .arg("-C")
        .arg(root)
        .args(args)
        .output()
        .map_err(|source| SourceError::Io {
            path: root.display().to_string(),
            source,
        })?;

    if !output.status.success() {
        return Err(SourceError::CommandFailed {
            command: format!("git {}", args.join(" ")),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(output.stdout)
}

fn run_git_text(root: &Path, args: &[&str]) -> Result<String, SourceError> {
    run_git(root, args).map(|stdout| String::from_utf8_lossy(&stdout).into_owned())
}

/// Lines of `path` at `rev` (an empty rev reads the index).
fn git_side(root: &Path, rev: &str, path: Option<&str>) -> Result<Vec<String>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    let object = format!("{}:{}", rev, path);
    let text = run_git_text(root, &["show", &object])
        .with_context(|| format!("Failed to load {}", object))?;
    Ok(split_lines(&text))
}

fn worktree_side(root: &Path, path: Option<&str>) -> Result<Vec<String>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    Ok(split_lines(&read_file(&root.join(path))?))
}

fn read_file(path: &Path) -> Result<String, SourceError> {
    std::fs::read(path)
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .map_err(|source| SourceError::Io {
            path: path.display().to_string(),
            source,
        })
}

fn pair_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
