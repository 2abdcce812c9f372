//! File editing commands
//!
//! `EditCommand` is the closed set of editing operations. `Editor` runs the
//! shared path checks and dispatches each command; the tools in this module
//! only turn arguments into commands.

pub mod operations;
pub mod specialized_tools;

pub use operations::{create_file, insert_text, str_replace};
pub use specialized_tools::{CreateTool, InsertTool, StrReplaceTool};

use crate::config::EditorConfig;
use crate::core::{Params, Tool, ToolArgs, ToolError, ToolResult};
use crate::file_navigation::{view_path, ViewRange};
use crate::workspace::Workspace;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// Command tags accepted by `str_replace_editor`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    View,
    Create,
    StrReplace,
    Insert,
}

impl CommandKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandKind::View => "view",
            CommandKind::Create => "create",
            CommandKind::StrReplace => "str_replace",
            CommandKind::Insert => "insert",
        }
    }
}

impl FromStr for CommandKind {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "view" => Ok(CommandKind::View),
            "create" => Ok(CommandKind::Create),
            "str_replace" => Ok(CommandKind::StrReplace),
            "insert" => Ok(CommandKind::Insert),
            other => Err(ToolError::invalid_args(format!(
                "Unrecognized command {}. Allowed options are: `view`, `create`, `str_replace`, `insert`.",
                other
            ))),
        }
    }
}

/// One editing operation with its required fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditCommand {
    View {
        path: PathBuf,
        view_range: Option<ViewRange>,
    },
    Create {
        path: PathBuf,
        file_text: String,
    },
    StrReplace {
        path: PathBuf,
        old_str: String,
        new_str: Option<String>,
    },
    Insert {
        path: PathBuf,
        insert_line: i64,
        new_str: String,
    },
}

impl EditCommand {
    pub fn kind(&self) -> CommandKind {
        match self {
            EditCommand::View { .. } => CommandKind::View,
            EditCommand::Create { .. } => CommandKind::Create,
            EditCommand::StrReplace { .. } => CommandKind::StrReplace,
            EditCommand::Insert { .. } => CommandKind::Insert,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            EditCommand::View { path, .. }
            | EditCommand::Create { path, .. }
            | EditCommand::StrReplace { path, .. }
            | EditCommand::Insert { path, .. } => path,
        }
    }
}

/// Runs edit commands inside a workspace
pub struct Editor<'a> {
    workspace: &'a Workspace,
    config: &'a EditorConfig,
}

impl<'a> Editor<'a> {
    pub fn new(workspace: &'a Workspace, config: &'a EditorConfig) -> Self {
        Self { workspace, config }
    }

    /// Shared checks, in order: containment, absolute path, existence
    /// (or non-existence for `create`), and no directories except for `view`.
    pub fn preflight(&self, kind: CommandKind, path: &Path) -> Result<PathBuf, ToolError> {
        let resolved = self.workspace.resolve(path)?;
        let display = || path.display().to_string();

        if kind != CommandKind::Create && !resolved.exists() {
            return Err(ToolError::NotFound { path: display() });
        }
        if kind == CommandKind::Create && resolved.exists() {
            return Err(ToolError::AlreadyExists { path: display() });
        }
        if kind != CommandKind::View && resolved.is_dir() {
            return Err(ToolError::IsADirectory { path: display() });
        }
        Ok(resolved)
    }

    /// Build a command from tool parameters. Path checks run before the
    /// command-specific fields are required, and the command carries the
    /// resolved path.
    pub fn parse(&self, kind: CommandKind, params: &Params) -> Result<EditCommand, ToolError> {
        let requested = PathBuf::from(params.require_str("path", kind.as_str())?);
        let path = self.preflight(kind, &requested)?;

        let command = match kind {
            CommandKind::View => EditCommand::View {
                path,
                view_range: params
                    .get_pair("view_range")?
                    .map(|(first, last)| ViewRange::new(first, last)),
            },
            CommandKind::Create => EditCommand::Create {
                path,
                file_text: params.require_str("file_text", kind.as_str())?,
            },
            CommandKind::StrReplace => EditCommand::StrReplace {
                path,
                old_str: params.require_str("old_str", kind.as_str())?,
                new_str: params.get_str("new_str")?,
            },
            CommandKind::Insert => {
                let insert_line = params
                    .get_i64("insert_line")?
                    .ok_or_else(|| ToolError::missing(kind.as_str(), "insert_line"))?;
                EditCommand::Insert {
                    path,
                    insert_line,
                    new_str: params.require_str("new_str", kind.as_str())?,
                }
            }
        };
        Ok(command)
    }

    /// Parse tool parameters and run the resulting command
    pub fn run(&self, kind: CommandKind, params: &Params) -> Result<ToolResult, ToolError> {
        let command = self.parse(kind, params)?;
        self.dispatch(&command, command.path())
    }

    /// Check and run a command built elsewhere
    pub fn execute(&self, command: &EditCommand) -> Result<ToolResult, ToolError> {
        let path = self.preflight(command.kind(), command.path())?;
        self.dispatch(command, &path)
    }

    fn dispatch(&self, command: &EditCommand, path: &Path) -> Result<ToolResult, ToolError> {
        debug!(
            command = command.kind().as_str(),
            path = %self.workspace.relative_display(path),
            "running edit command"
        );

        match command {
            EditCommand::View { view_range, .. } => view_path(path, *view_range, self.config),
            EditCommand::Create { file_text, .. } => create_file(path, file_text),
            EditCommand::StrReplace {
                old_str, new_str, ..
            } => str_replace(path, old_str, new_str.as_deref(), self.config),
            EditCommand::Insert {
                insert_line,
                new_str,
                ..
            } => insert_text(path, *insert_line, new_str, self.config),
        }
    }
}

/// The combined editor tool, dispatching on a `command` argument
pub struct StrReplaceEditorTool {
    name: String,
    config: EditorConfig,
}

impl StrReplaceEditorTool {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            name: "str_replace_editor".to_string(),
            config,
        }
    }
}

impl Tool for StrReplaceEditorTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Custom editing tool for viewing, creating and editing files. \
         `view` shows a file like `cat -n` or lists a directory 2 levels deep; \
         `create` refuses to overwrite an existing path; \
         `str_replace` requires `old_str` to match exactly once; \
         `insert` adds `new_str` after line `insert_line`. \
         Long output is truncated and marked with `<response clipped>`."
    }

    fn signature(&self) -> &str {
        "str_replace_editor(command: str, path: str, file_text?: str, view_range?: [int, int], old_str?: str, new_str?: str, insert_line?: int)"
    }

    fn validate_args(&self, args: &ToolArgs) -> Result<(), ToolError> {
        let params = args.params(&["command", "path"])?;
        let command = params
            .get_str("command")?
            .ok_or_else(|| ToolError::invalid_args("Missing required parameter: command"))?;
        let kind = command.parse::<CommandKind>()?;
        params.require_str("path", kind.as_str())?;
        Ok(())
    }

    fn execute(&mut self, args: &ToolArgs, workspace: &Workspace) -> Result<ToolResult, ToolError> {
        let params = args.params(&["command", "path"])?;
        let kind = params
            .get_str("command")?
            .ok_or_else(|| ToolError::invalid_args("Missing required parameter: command"))?
            .parse::<CommandKind>()?;

        let editor = Editor::new(workspace, &self.config);
        editor.run(kind, &params)
    }

    fn get_parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "command": {
                    "type": "string",
                    "enum": ["view", "create", "str_replace", "insert"],
                    "description": "The command to run"
                },
                "path": {
                    "type": "string",
                    "description": "Absolute path to file or directory, e.g. `/repo/file.py` or `/repo`"
                },
                "file_text": {
                    "type": "string",
                    "description": "Required for `create`: content of the file to be created"
                },
                "view_range": {
                    "type": "array",
                    "items": { "type": "integer" },
                    "description": "Optional for `view` on a file: [first, last], 1-based; [first, -1] shows to the end"
                },
                "old_str": {
                    "type": "string",
                    "description": "Required for `str_replace`: exact text to replace, must be unique in the file"
                },
                "new_str": {
                    "type": "string",
                    "description": "Replacement text for `str_replace` (optional) or text to insert for `insert` (required)"
                },
                "insert_line": {
                    "type": "integer",
                    "minimum": 0,
                    "description": "Required for `insert`: `new_str` is inserted after this line (0 = top of file)"
                }
            },
            "required": ["command", "path"]
        })
    }
}
