//! Multi-file patch documents
//!
//! A patch document is wrapped in `*** Begin Patch` / `*** End Patch` and
//! holds `*** Add File:`, `*** Delete File:` and `*** Update File:`
//! operations. Update bodies are hunks of ` ` context, `-` removed, `+` added
//! and `@@ ` anchor lines.

pub mod applicator;
pub mod parser;

pub use applicator::{apply_hunks, PatchApplicator};
pub use parser::parse_patch;

use crate::config::EditorConfig;
use crate::core::{Tool, ToolArgs, ToolError, ToolResult};
use crate::workspace::Workspace;

/// One line of an update hunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HunkLine {
    /// Must match the file at the cursor; kept
    Context(String),
    /// Must match the file at the cursor; dropped
    Remove(String),
    /// Emitted without consuming the file
    Add(String),
    /// Moves the cursor forward to the next line equal to the text
    Anchor(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hunk {
    pub lines: Vec<HunkLine>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOperation {
    AddFile { path: String, content: Vec<String> },
    DeleteFile { path: String },
    UpdateFile { path: String, hunks: Vec<Hunk> },
}

impl FileOperation {
    pub fn path(&self) -> &str {
        match self {
            FileOperation::AddFile { path, .. }
            | FileOperation::DeleteFile { path }
            | FileOperation::UpdateFile { path, .. } => path,
        }
    }

    /// Short label used in results and logs, e.g. `update src/lib.rs`
    pub fn describe(&self) -> String {
        let verb = match self {
            FileOperation::AddFile { .. } => "add",
            FileOperation::DeleteFile { .. } => "delete",
            FileOperation::UpdateFile { .. } => "update",
        };
        format!("{} {}", verb, self.path())
    }
}

/// A parsed patch: file operations in document order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchDocument {
    pub operations: Vec<FileOperation>,
}

/// Tool for applying patch documents
pub struct ApplyPatchTool {
    name: String,
    config: EditorConfig,
}

impl ApplyPatchTool {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            name: "apply_patch".to_string(),
            config,
        }
    }

    fn document(args: &ToolArgs) -> Result<String, ToolError> {
        let params = args.params(&["patch"])?;
        match params.get_str("patch")? {
            Some(patch) => Ok(patch),
            None => params.require_str("input", "apply_patch"),
        }
    }
}

impl Tool for ApplyPatchTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Apply a multi-file patch. Wrap operations in '*** Begin Patch' / '*** End Patch'; \
         each starts with '*** Add File: <path>', '*** Delete File: <path>' or '*** Update File: <path>'. \
         Added files list '+' lines. Update bodies use ' ' context, '-' removed and '+' added lines, \
         with optional '@@ <line>' anchors that skip ahead to a matching line. \
         Operations apply in order; a failure stops the patch but earlier operations stay applied"
    }

    fn signature(&self) -> &str {
        "apply_patch(patch: str)"
    }

    fn validate_args(&self, args: &ToolArgs) -> Result<(), ToolError> {
        Self::document(args).map(|_| ())
    }

    fn execute(&mut self, args: &ToolArgs, workspace: &Workspace) -> Result<ToolResult, ToolError> {
        let document = parse_patch(&Self::document(args)?)?;
        let applied = PatchApplicator::new(workspace, &self.config).apply(&document)?;

        Ok(ToolResult::success_with_data(
            "Patch applied successfully",
            serde_json::json!({ "operations": applied }),
        ))
    }

    fn get_parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "patch": {
                    "type": "string",
                    "description": "The full patch document, from '*** Begin Patch' to '*** End Patch'"
                }
            },
            "required": ["patch"]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_apply_patch_tool() {
        let temp_dir = TempDir::new().unwrap();
        let workspace = Workspace::new(temp_dir.path()).unwrap();
        fs::write(temp_dir.path().join("a.txt"), "a\nb\nc\n").unwrap();

        let patch = [
            "*** Begin Patch",
            "*** Update File: a.txt",
            " a",
            "-b",
            "+x",
            " c",
            "*** Add File: docs/new.md",
            "+# Title",
            "*** End Patch",
        ]
        .join("\n");

        let mut tool = ApplyPatchTool::new(EditorConfig::default());
        let args = ToolArgs::from_json(serde_json::json!({ "patch": patch })).unwrap();
        let result = tool.execute(&args, &workspace).unwrap();

        assert_eq!(result.message, "Patch applied successfully");
        assert_eq!(
            result.data.unwrap()["operations"],
            serde_json::json!(["update a.txt", "add docs/new.md"])
        );
        assert_eq!(
            fs::read_to_string(temp_dir.path().join("a.txt")).unwrap(),
            "a\nx\nc\n"
        );
        assert_eq!(
            fs::read_to_string(temp_dir.path().join("docs/new.md")).unwrap(),
            "# Title\n"
        );
    }

    #[test]
    fn test_apply_patch_tool_requires_document() {
        let tool = ApplyPatchTool::new(EditorConfig::default());
        let err = tool.validate_args(&ToolArgs::from_args(&[])).unwrap_err();
        assert_eq!(err.kind(), "missing_argument");
    }
}
