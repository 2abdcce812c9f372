//! Single-command editing tools
//!
//! Each tool exposes one `EditCommand` variant with a flat argument list,
//! for callers that prefer one function per operation over the combined
//! `str_replace_editor` tool.

use super::{CommandKind, Editor};
use crate::config::EditorConfig;
use crate::core::{Tool, ToolArgs, ToolError, ToolResult};
use crate::workspace::Workspace;

/// Tool for creating new files with content
pub struct CreateTool {
    name: String,
    config: EditorConfig,
}

impl CreateTool {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            name: "create".to_string(),
            config,
        }
    }
}

impl Tool for CreateTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Create a new file with the given content. Fails if the path already exists"
    }

    fn signature(&self) -> &str {
        "create(path: str, file_text: str)"
    }

    fn validate_args(&self, args: &ToolArgs) -> Result<(), ToolError> {
        args.params(&["path", "file_text"])?
            .require_str("path", "create")?;
        Ok(())
    }

    fn execute(&mut self, args: &ToolArgs, workspace: &Workspace) -> Result<ToolResult, ToolError> {
        let params = args.params(&["path", "file_text"])?;
        let editor = Editor::new(workspace, &self.config);
        editor.run(CommandKind::Create, &params)
    }

    fn get_parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Absolute path of the file to create"
                },
                "file_text": {
                    "type": "string",
                    "description": "Content to write to the file"
                }
            },
            "required": ["path", "file_text"]
        })
    }
}

/// Tool for replacing a unique piece of text
pub struct StrReplaceTool {
    name: String,
    config: EditorConfig,
}

impl StrReplaceTool {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            name: "str_replace".to_string(),
            config,
        }
    }
}

impl Tool for StrReplaceTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Replace text that occurs exactly once in a file. Whitespace must match; include enough context to make `old_str` unique"
    }

    fn signature(&self) -> &str {
        "str_replace(path: str, old_str: str, new_str?: str)"
    }

    fn validate_args(&self, args: &ToolArgs) -> Result<(), ToolError> {
        args.params(&["path", "old_str", "new_str"])?
            .require_str("path", "str_replace")?;
        Ok(())
    }

    fn execute(&mut self, args: &ToolArgs, workspace: &Workspace) -> Result<ToolResult, ToolError> {
        let params = args.params(&["path", "old_str", "new_str"])?;
        let editor = Editor::new(workspace, &self.config);
        editor.run(CommandKind::StrReplace, &params)
    }

    fn get_parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Absolute path of the file"
                },
                "old_str": {
                    "type": "string",
                    "description": "Exact text to replace; must appear exactly once"
                },
                "new_str": {
                    "type": "string",
                    "description": "Replacement text (omit to delete `old_str`)"
                }
            },
            "required": ["path", "old_str"]
        })
    }
}

/// Tool for inserting text after a given line
pub struct InsertTool {
    name: String,
    config: EditorConfig,
}

impl InsertTool {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            name: "insert".to_string(),
            config,
        }
    }
}

impl Tool for InsertTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Insert text after a line of a file (0 inserts before the first line)"
    }

    fn signature(&self) -> &str {
        "insert(path: str, insert_line: int, new_str: str)"
    }

    fn validate_args(&self, args: &ToolArgs) -> Result<(), ToolError> {
        let params = args.params(&["path", "insert_line", "new_str"])?;
        params.require_str("path", "insert")?;
        params.get_i64("insert_line")?;
        Ok(())
    }

    fn execute(&mut self, args: &ToolArgs, workspace: &Workspace) -> Result<ToolResult, ToolError> {
        let params = args.params(&["path", "insert_line", "new_str"])?;
        let editor = Editor::new(workspace, &self.config);
        editor.run(CommandKind::Insert, &params)
    }

    fn get_parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Absolute path of the file"
                },
                "insert_line": {
                    "type": "integer",
                    "minimum": 0,
                    "description": "Line after which to insert (0 = top of file)"
                },
                "new_str": {
                    "type": "string",
                    "description": "Text to insert"
                }
            },
            "required": ["path", "insert_line", "new_str"]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Workspace) {
        let temp_dir = TempDir::new().unwrap();
        let workspace = Workspace::new(temp_dir.path()).unwrap();
        (temp_dir, workspace)
    }

    #[test]
    fn test_create_tool() {
        let (_dir, workspace) = setup();
        let test_file = workspace.root().join("test_file.txt");

        let mut tool = CreateTool::new(EditorConfig::default());
        let args = ToolArgs::with_named_args(
            vec![],
            vec![
                ("path".to_string(), test_file.to_string_lossy().to_string()),
                ("file_text".to_string(), "Hello, World!".to_string()),
            ]
            .into_iter()
            .collect(),
        );

        let result = tool.execute(&args, &workspace).unwrap();
        assert!(result.success);
        assert_eq!(fs::read_to_string(&test_file).unwrap(), "Hello, World!");

        // A second create must not overwrite
        let err = tool.execute(&args, &workspace).unwrap_err();
        assert_eq!(err.kind(), "already_exists");
    }

    #[test]
    fn test_create_tool_does_not_make_directories() {
        let (_dir, workspace) = setup();
        let nested = workspace.root().join("missing/dir/file.txt");
        let path_arg = nested.to_string_lossy().to_string();

        let mut tool = CreateTool::new(EditorConfig::default());
        let args = ToolArgs::from_args(&[path_arg.as_str(), "text"]);
        assert_eq!(tool.execute(&args, &workspace).unwrap_err().kind(), "io");
        assert!(!nested.exists());
    }

    #[test]
    fn test_str_replace_tool() {
        let (_dir, workspace) = setup();
        let test_file = workspace.root().join("test_replace.txt");
        fs::write(&test_file, "Hello, World!\nThis is a test.").unwrap();

        let mut tool = StrReplaceTool::new(EditorConfig::default());
        let path_arg = test_file.to_string_lossy().to_string();
        let args = ToolArgs::from_args(&[path_arg.as_str(), "World", "Rust"]);

        let result = tool.execute(&args, &workspace).unwrap();
        assert!(result.success);
        assert!(result.message.starts_with(&format!(
            "The file {} has been edited. Here's the result of running `cat -n` on a snippet of {}:\n",
            test_file.display(),
            test_file.display()
        )));
        assert_eq!(
            fs::read_to_string(&test_file).unwrap(),
            "Hello, Rust!\nThis is a test."
        );
    }

    #[test]
    fn test_str_replace_tool_without_new_str_deletes() {
        let (_dir, workspace) = setup();
        let test_file = workspace.root().join("test_delete.txt");
        fs::write(&test_file, "Hello, World!\nThis is a test.").unwrap();

        let mut tool = StrReplaceTool::new(EditorConfig::default());
        let path_arg = test_file.to_string_lossy().to_string();
        let args = ToolArgs::from_args(&[path_arg.as_str(), ", World"]);

        tool.execute(&args, &workspace).unwrap();
        assert_eq!(
            fs::read_to_string(&test_file).unwrap(),
            "Hello!\nThis is a test."
        );
    }

    #[test]
    fn test_insert_tool() {
        let (_dir, workspace) = setup();
        let test_file = workspace.root().join("test_insert.txt");
        fs::write(&test_file, "Line 1\nLine 3").unwrap();

        let mut tool = InsertTool::new(EditorConfig::default());
        let args = ToolArgs::from_json(serde_json::json!({
            "path": test_file,
            "insert_line": 1,
            "new_str": "Line 2"
        }))
        .unwrap();

        let result = tool.execute(&args, &workspace).unwrap();
        assert!(result.success);
        assert_eq!(
            fs::read_to_string(&test_file).unwrap(),
            "Line 1\nLine 2\nLine 3"
        );
    }

    #[test]
    fn test_insert_tool_validates_line_type() {
        let tool = InsertTool::new(EditorConfig::default());
        let args = ToolArgs::from_args(&["/tmp/x", "first", "text"]);
        assert_eq!(
            tool.validate_args(&args).unwrap_err().kind(),
            "invalid_arguments"
        );
    }
}
