//! Applying parsed patch documents to files in a workspace

use super::{FileOperation, Hunk, HunkLine, PatchDocument};
use crate::config::EditorConfig;
use crate::core::ToolError;
use crate::file_navigation::TextFile;
use crate::workspace::Workspace;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Shown as the actual text when a hunk runs past the end of the file
const END_OF_FILE: &str = "<end of file>";

/// Applies parsed patch documents inside a workspace
pub struct PatchApplicator<'a> {
    workspace: &'a Workspace,
    config: &'a EditorConfig,
}

impl<'a> PatchApplicator<'a> {
    pub fn new(workspace: &'a Workspace, config: &'a EditorConfig) -> Self {
        Self { workspace, config }
    }

    /// Apply operations in document order and return their descriptions.
    ///
    /// Each file is only written once its new content is fully computed, but
    /// a failure does not undo operations that were already applied.
    pub fn apply(&self, document: &PatchDocument) -> Result<Vec<String>, ToolError> {
        let mut applied = Vec::with_capacity(document.operations.len());

        for operation in &document.operations {
            if let Err(e) = self.apply_operation(operation) {
                warn!(
                    failed = %operation.describe(),
                    applied = ?applied,
                    error = %e,
                    "patch aborted, earlier operations remain applied"
                );
                return Err(e);
            }
            applied.push(operation.describe());
        }

        Ok(applied)
    }

    fn apply_operation(&self, operation: &FileOperation) -> Result<(), ToolError> {
        let path = self.workspace.resolve_patch_path(operation.path())?;
        let shown = || operation.path().to_string();

        match operation {
            FileOperation::AddFile { content, .. } => {
                if path.exists() {
                    return Err(ToolError::AlreadyExists { path: shown() });
                }
                let mut lines = content.clone();
                lines.push(String::new());
                TextFile { path: path.clone(), lines }.write_creating_dirs()?;
                info!(path = %shown(), lines = content.len(), "added file");
            }
            FileOperation::DeleteFile { .. } => {
                if !path.exists() {
                    return Err(ToolError::NotFound { path: shown() });
                }
                if path.is_dir() {
                    return Err(ToolError::IsADirectory { path: shown() });
                }
                fs::remove_file(&path)?;
                info!(path = %shown(), "deleted file");
            }
            FileOperation::UpdateFile { hunks, .. } => {
                if path.is_dir() {
                    return Err(ToolError::IsADirectory { path: shown() });
                }
                let original = TextFile::read(&path)?;
                let (lines, crlf) = strip_carriage_returns(original.lines);
                let lines = apply_hunks(
                    Path::new(operation.path()),
                    &lines,
                    hunks,
                    self.config.strict_anchors,
                )?;
                let lines = if crlf { restore_carriage_returns(lines) } else { lines };
                TextFile { path, lines }.write()?;
                info!(path = %shown(), hunks = hunks.len(), "updated file");
            }
        }
        Ok(())
    }
}

/// Run hunks over the lines of a file and return the new lines.
///
/// A cursor walks the original lines. Context and removed lines must match
/// at the cursor; added lines are emitted without moving it. An anchor copies
/// everything up to the next line equal to it; if there is none the anchor is
/// ignored, or rejected when `strict_anchors` is set.
pub fn apply_hunks(
    path: &Path,
    lines: &[String],
    hunks: &[Hunk],
    strict_anchors: bool,
) -> Result<Vec<String>, ToolError> {
    let mut output = Vec::with_capacity(lines.len());
    let mut idx = 0;

    for hunk_line in hunks.iter().flat_map(|hunk| &hunk.lines) {
        match hunk_line {
            HunkLine::Anchor(anchor) => match lines[idx..].iter().position(|l| l == anchor) {
                Some(found) => {
                    output.extend_from_slice(&lines[idx..idx + found]);
                    idx += found;
                }
                None if strict_anchors => {
                    return Err(ToolError::AnchorNotFound {
                        path: path.display().to_string(),
                        anchor: anchor.clone(),
                    });
                }
                None => {
                    warn!(path = %path.display(), anchor = %anchor, offset = idx, "anchor not found, ignoring");
                }
            },
            HunkLine::Context(expected) => {
                expect_line(path, lines, idx, expected)?;
                output.push(lines[idx].clone());
                idx += 1;
            }
            HunkLine::Remove(expected) => {
                expect_line(path, lines, idx, expected)?;
                idx += 1;
            }
            HunkLine::Add(text) => output.push(text.clone()),
        }
    }

    output.extend_from_slice(&lines[idx..]);
    Ok(output)
}

/// Drop `\r` line endings so lines compare against patch text, and report
/// whether the file used CRLF.
fn strip_carriage_returns(mut lines: Vec<String>) -> (Vec<String>, bool) {
    let crlf = lines.len() > 1 && lines[0].ends_with('\r');
    for line in &mut lines {
        if line.ends_with('\r') {
            line.pop();
        }
    }
    (lines, crlf)
}

/// Put `\r` back before every line break
fn restore_carriage_returns(mut lines: Vec<String>) -> Vec<String> {
    let breaks = lines.len().saturating_sub(1);
    for line in &mut lines[..breaks] {
        line.push('\r');
    }
    lines
}

fn expect_line(path: &Path, lines: &[String], idx: usize, expected: &str) -> Result<(), ToolError> {
    match lines.get(idx) {
        Some(actual) if actual == expected => Ok(()),
        actual => Err(ToolError::ContextMismatch {
            path: path.display().to_string(),
            expected: expected.to_string(),
            actual: actual.map_or(END_OF_FILE, String::as_str).to_string(),
            offset: idx,
        }),
    }
}
