//! # editkit
//!
//! File viewing and editing tools for coding agents, confined to a workspace
//! directory.
//!
//! ## Features
//!
//! - **Viewing**: `cat -n` style file listings with line ranges, shallow directory listings
//! - **Editing**: create files, replace a unique string, insert after a line
//! - **Patches**: multi-file `*** Begin Patch` documents with add, delete and update operations
//! - **Workspace guard**: every path is checked against the workspace root, symlinks included
//! - **LLM integration**: OpenAI-style schemas and batch execution of function calls
//!
//! ## Usage
//!
//! ```rust,no_run
//! use editkit::{create_tool_registry, ToolArgs, Workspace};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut registry = create_tool_registry(Workspace::new("/repo")?);
//! let args = ToolArgs::from_args(&["/repo/src/main.rs", "1", "20"]);
//! let result = registry.execute_tool("view", &args)?;
//! println!("{}", result.message);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod editing;
pub mod file_navigation;
pub mod llm;
pub mod patch;
pub mod workspace;

// Re-export main types
pub use config::EditorConfig;
pub use core::{Params, Tool, ToolArgs, ToolError, ToolRegistry, ToolResult};
pub use editing::{
    CommandKind, CreateTool, EditCommand, Editor, InsertTool, StrReplaceEditorTool,
    StrReplaceTool,
};
pub use file_navigation::{TextFile, ViewRange, ViewTool};
pub use patch::{parse_patch, ApplyPatchTool, PatchApplicator, PatchDocument};
pub use workspace::Workspace;

/// Initialize the tool registry with all tools and the default config
pub fn create_tool_registry(workspace: Workspace) -> ToolRegistry {
    create_tool_registry_with_config(workspace, EditorConfig::default())
}

/// Initialize the tool registry with an explicit config
pub fn create_tool_registry_with_config(workspace: Workspace, config: EditorConfig) -> ToolRegistry {
    let mut registry = ToolRegistry::new(workspace);

    // Combined editor
    registry.register(Box::new(StrReplaceEditorTool::new(config.clone())));

    // One tool per command
    registry.register(Box::new(ViewTool::new(config.clone())));
    registry.register(Box::new(CreateTool::new(config.clone())));
    registry.register(Box::new(StrReplaceTool::new(config.clone())));
    registry.register(Box::new(InsertTool::new(config.clone())));

    // Patches
    registry.register(Box::new(ApplyPatchTool::new(config)));

    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_registry_creation() {
        let temp_dir = TempDir::new().unwrap();
        let registry = create_tool_registry(Workspace::new(temp_dir.path()).unwrap());

        assert_eq!(
            registry.list_tools(),
            vec![
                "apply_patch",
                "create",
                "insert",
                "str_replace",
                "str_replace_editor",
                "view"
            ]
        );
    }

    #[test]
    fn test_schemas_are_openai_functions() {
        let temp_dir = TempDir::new().unwrap();
        let registry = create_tool_registry(Workspace::new(temp_dir.path()).unwrap());

        let schemas = registry.get_all_schemas();
        assert_eq!(schemas.len(), 6);
        for schema in &schemas {
            assert_eq!(schema["type"], "function");
            assert_eq!(schema["function"]["parameters"]["type"], "object");
            assert!(schema["function"]["parameters"]["required"].is_array());
        }
        assert_eq!(schemas[0]["function"]["name"], "apply_patch");
    }

    #[test]
    fn test_registry_uses_config() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("long.txt");
        std::fs::write(&path, "0123456789".repeat(10)).unwrap();

        let config = EditorConfig {
            max_output_chars: 20,
            ..EditorConfig::default()
        };
        let mut registry =
            create_tool_registry_with_config(Workspace::new(temp_dir.path()).unwrap(), config);
        let path_arg = path.to_string_lossy().to_string();
        let result = registry
            .execute_tool("view", &ToolArgs::from_args(&[path_arg.as_str()]))
            .unwrap();
        assert!(result.message.contains("<response clipped>"));
    }
}
