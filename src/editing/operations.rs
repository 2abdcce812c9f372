//! The mutating edit operations.
//!
//! Each function expects a path that already passed `Editor::preflight`.
//! Validation happens before anything is written; once it passes the write
//! is unconditional.

use crate::config::EditorConfig;
use crate::core::{ToolError, ToolResult};
use crate::file_navigation::{expand_tabs, render_listing, TextFile};
use std::fs;
use std::path::Path;
use tracing::info;

/// Write a new file verbatim
pub fn create_file(path: &Path, file_text: &str) -> Result<ToolResult, ToolError> {
    if file_text.is_empty() {
        return Err(ToolError::missing("create", "file_text"));
    }

    fs::write(path, file_text)?;
    info!(path = %path.display(), bytes = file_text.len(), "created file");

    Ok(ToolResult::success_with_data(
        format!("File created successfully: '{}'.", path.display()),
        serde_json::json!({
            "path": path.to_string_lossy(),
            "content_length": file_text.len(),
            "lines_created": file_text.split('\n').count(),
        }),
    ))
}

/// Replace the single occurrence of `old_str` with `new_str`.
///
/// File content and both strings are tab-expanded before matching, and the
/// whole file is written back expanded.
pub fn str_replace(
    path: &Path,
    old_str: &str,
    new_str: Option<&str>,
    config: &EditorConfig,
) -> Result<ToolResult, ToolError> {
    let old_str = expand_tabs(old_str, config.tab_width);
    if old_str.is_empty() {
        return Err(ToolError::missing("str_replace", "old_str"));
    }
    let new_str = new_str
        .map(|s| expand_tabs(s, config.tab_width))
        .unwrap_or_default();
    let content = TextFile::read(path)?.expand_tabs(config.tab_width).text();

    let positions: Vec<usize> = content.match_indices(&old_str).map(|(i, _)| i).collect();
    let start = match positions.as_slice() {
        [] => {
            return Err(ToolError::NoMatch {
                path: path.display().to_string(),
                old: old_str,
            })
        }
        [only] => *only,
        many => {
            let lines = many.iter().map(|&pos| line_index(&content, pos) + 1).collect();
            return Err(ToolError::AmbiguousMatch { old: old_str, lines });
        }
    };

    let mut new_content = String::with_capacity(content.len() + new_str.len());
    new_content.push_str(&content[..start]);
    new_content.push_str(&new_str);
    new_content.push_str(&content[start + old_str.len()..]);

    let edited = TextFile::from_text(path, &new_content);
    edited.write()?;

    let replaced_line = line_index(&content, start);
    let first = replaced_line.saturating_sub(config.snippet_context_lines);
    let last = (replaced_line + config.snippet_context_lines + new_str.matches('\n').count())
        .min(edited.line_count() - 1);
    let snippet = edited.lines[first..=last].join("\n");
    let output = render_listing(
        &snippet,
        &format!("a snippet of {}", path.display()),
        first + 1,
        config,
    );

    info!(path = %path.display(), line = replaced_line + 1, "replaced text");

    Ok(ToolResult::success_with_data(
        format!(
            "The file {} has been edited. {}Review the changes and make sure they are as expected. Edit the file again if necessary.",
            path.display(),
            output
        ),
        serde_json::json!({
            "path": path.to_string_lossy(),
            "line": replaced_line + 1,
            "snippet_first_line": first + 1,
            "snippet_last_line": last + 1,
        }),
    ))
}

/// Insert `new_str` after line `insert_line` (0 inserts at the top)
pub fn insert_text(
    path: &Path,
    insert_line: i64,
    new_str: &str,
    config: &EditorConfig,
) -> Result<ToolResult, ToolError> {
    let mut file = TextFile::read(path)?.expand_tabs(config.tab_width);
    let line_count = file.line_count();

    let at = usize::try_from(insert_line)
        .ok()
        .filter(|&at| at <= line_count)
        .ok_or(ToolError::InvalidInsertPosition {
            line: insert_line,
            line_count,
        })?;

    let new_lines: Vec<String> = expand_tabs(new_str, config.tab_width)
        .split('\n')
        .map(str::to_string)
        .collect();
    let inserted = new_lines.len();

    let before = at.saturating_sub(config.snippet_context_lines);
    let after = (at + config.snippet_context_lines).min(line_count);
    let snippet = file.lines[before..at]
        .iter()
        .chain(&new_lines)
        .chain(&file.lines[at..after])
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("\n");

    file.lines.splice(at..at, new_lines);
    file.write()?;

    let output = render_listing(&snippet, "a snippet of the edited file", before + 1, config);

    info!(path = %path.display(), after_line = at, lines = inserted, "inserted text");

    Ok(ToolResult::success_with_data(
        format!(
            "The file {} has been edited. {}Review the changes and make sure they are as expected (correct indentation, no duplicate lines, etc). Edit the file again if necessary.",
            path.display(),
            output
        ),
        serde_json::json!({
            "path": path.to_string_lossy(),
            "insert_line": at,
            "lines_added": inserted,
            "total_lines": file.line_count(),
        }),
    ))
}

/// 0-based line containing byte offset `pos`
fn line_index(content: &str, pos: usize) -> usize {
    content[..pos].matches('\n').count()
}
