//! File viewing tools
//!
//! Whole-file line storage, numbered listing output and the `view` tool.

pub mod listing;

pub use listing::list_directory;

use crate::config::EditorConfig;
use crate::core::{Tool, ToolArgs, ToolError, ToolResult};
use crate::editing::{CommandKind, Editor};
use crate::workspace::Workspace;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Appended to listings clipped at `max_output_chars`
pub const TRUNCATED_MESSAGE: &str = "<response clipped><NOTE>To save on context only part of this file has been shown to you. You should retry this tool after you have searched inside the file with `grep -n` in order to find the line numbers of what you are looking for.</NOTE>";

/// A text file held as lines split on `\n`.
///
/// A trailing newline shows up as a final empty line, so joining the lines
/// back with `\n` reproduces the original text exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextFile {
    pub path: PathBuf,
    pub lines: Vec<String>,
}

impl TextFile {
    /// Read a whole file
    pub fn read(path: &Path) -> Result<Self, ToolError> {
        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ToolError::NotFound {
                path: path.display().to_string(),
            },
            _ => ToolError::Io(e),
        })?;
        Ok(Self::from_text(path, &content))
    }

    pub fn from_text(path: &Path, content: &str) -> Self {
        Self {
            path: path.to_path_buf(),
            lines: content.split('\n').map(str::to_string).collect(),
        }
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Expand tabs on every line
    pub fn expand_tabs(mut self, tab_width: usize) -> Self {
        for line in &mut self.lines {
            if line.contains('\t') {
                *line = expand_tabs(line, tab_width);
            }
        }
        self
    }

    /// Overwrite the file on disk
    pub fn write(&self) -> Result<(), ToolError> {
        fs::write(&self.path, self.text())?;
        Ok(())
    }

    /// Write the file, creating missing parent directories
    pub fn write_creating_dirs(&self) -> Result<(), ToolError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        self.write()
    }
}

/// Replace tabs with spaces up to the next multiple of `tab_width`.
/// The column resets at `\n` and `\r`.
pub fn expand_tabs(text: &str, tab_width: usize) -> String {
    if !text.contains('\t') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut column = 0usize;
    for ch in text.chars() {
        match ch {
            '\t' => {
                if tab_width > 0 {
                    let pad = tab_width - column % tab_width;
                    out.extend(std::iter::repeat(' ').take(pad));
                    column += pad;
                }
            }
            '\n' | '\r' => {
                out.push(ch);
                column = 0;
            }
            _ => {
                out.push(ch);
                column += 1;
            }
        }
    }
    out
}

/// Render `content` like `cat -n`, numbering from `first_line`
pub fn render_listing(
    content: &str,
    label: &str,
    first_line: usize,
    config: &EditorConfig,
) -> String {
    let clipped;
    let content = match content.char_indices().nth(config.max_output_chars) {
        Some((cut, _)) => {
            clipped = format!("{}{}", &content[..cut], TRUNCATED_MESSAGE);
            clipped.as_str()
        }
        None => content,
    };
    let content = expand_tabs(content, config.tab_width);

    let body = content
        .split('\n')
        .enumerate()
        .map(|(i, line)| format!("{:6}\t{}", i + first_line, line))
        .collect::<Vec<_>>()
        .join("\n");

    format!("Here's the result of running `cat -n` on {}:\n{}\n", label, body)
}

/// A 1-based inclusive line range; `last == -1` means end of file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewRange {
    pub first: i64,
    pub last: i64,
}

impl ViewRange {
    pub fn new(first: i64, last: i64) -> Self {
        Self { first, last }
    }

    /// Check the range against a file and return the 0-based half-open span
    pub fn bounds(&self, line_count: usize) -> Result<(usize, usize), ToolError> {
        let count = line_count as i64;
        let Self { first, last } = *self;

        if first < 1 || first > count {
            return Err(ToolError::InvalidRange {
                message: format!(
                    "[{}, {}]. Its first element `{}` should be within the range of lines of the file: [1, {}]",
                    first, last, first, count
                ),
            });
        }
        if last > count {
            return Err(ToolError::InvalidRange {
                message: format!(
                    "[{}, {}]. Its second element `{}` should be smaller than the number of lines in the file: `{}`",
                    first, last, last, count
                ),
            });
        }
        if last != -1 && last < first {
            return Err(ToolError::InvalidRange {
                message: format!(
                    "[{}, {}]. Its second element `{}` should be larger or equal than its first `{}`",
                    first, last, last, first
                ),
            });
        }

        let end = if last == -1 { line_count } else { last as usize };
        Ok((first as usize - 1, end))
    }
}

/// View a file or directory that already passed the workspace checks
pub fn view_path(
    path: &Path,
    range: Option<ViewRange>,
    config: &EditorConfig,
) -> Result<ToolResult, ToolError> {
    if path.is_dir() {
        if range.is_some() {
            return Err(ToolError::InvalidRange {
                message: "The `view_range` parameter is not allowed when `path` points to a directory."
                    .to_string(),
            });
        }
        let entries = list_directory(path, config.max_list_depth)?;
        return Ok(ToolResult::success_with_data(
            entries.join("\n"),
            serde_json::json!({
                "path": path.to_string_lossy(),
                "entries": entries,
            }),
        ));
    }

    let file = TextFile::read(path)?;
    let line_count = file.line_count();
    let (start, end) = match range {
        Some(range) => range.bounds(line_count)?,
        None => (0, line_count),
    };
    let content = file.lines[start..end].join("\n");
    let output = render_listing(&content, &path.display().to_string(), start + 1, config);

    Ok(ToolResult::success_with_data(
        output,
        serde_json::json!({
            "path": path.to_string_lossy(),
            "first_line": start + 1,
            "last_line": end,
            "total_lines": line_count,
        }),
    ))
}

/// Tool for viewing files and directories
pub struct ViewTool {
    name: String,
    config: EditorConfig,
}

impl ViewTool {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            name: "view".to_string(),
            config,
        }
    }
}

impl Tool for ViewTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Show a file with line numbers like `cat -n`, optionally limited to a line range, or list a directory up to 2 levels deep"
    }

    fn signature(&self) -> &str {
        "view(path: str, view_range?: [int, int])"
    }

    fn validate_args(&self, args: &ToolArgs) -> Result<(), ToolError> {
        let params = args.params(&["path"])?;
        params.require_str("path", "view")?;
        params.get_pair("view_range")?;
        Ok(())
    }

    fn execute(&mut self, args: &ToolArgs, workspace: &Workspace) -> Result<ToolResult, ToolError> {
        let mut params = args.params(&["path", "first", "last"])?;
        if !params.contains("view_range") {
            if let (Some(first), last) = (params.get_i64("first")?, params.get_i64("last")?) {
                params.insert_pair("view_range", first, last.unwrap_or(-1));
            }
        }

        let editor = Editor::new(workspace, &self.config);
        editor.run(CommandKind::View, &params)
    }

    fn get_parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Absolute path to a file or directory inside the workspace"
                },
                "view_range": {
                    "type": "array",
                    "items": { "type": "integer" },
                    "minItems": 2,
                    "maxItems": 2,
                    "description": "Optional [first, last] 1-based line range; last = -1 shows to the end"
                }
            },
            "required": ["path"]
        })
    }
}
