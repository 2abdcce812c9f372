//! Core traits and types for the editkit tool system

use crate::workspace::Workspace;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

/// Error types for tool operations
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("The path '{path}' is not within the directory '{root}'.")]
    PathEscape { path: String, root: String },
    #[error("The path '{path}' is not an absolute path, it should start with `/`.")]
    RelativePath { path: String },
    #[error("The path '{path}' does not exist")]
    NotFound { path: String },
    #[error("File already exists at '{path}' and cannot be overwritten")]
    AlreadyExists { path: String },
    #[error("The path '{path}' is a directory and only the `view` command can be used on directories")]
    IsADirectory { path: String },
    #[error("Parameter `{name}` required for command '{command}'.")]
    MissingArgument { command: String, name: String },
    #[error("Invalid `view_range`: {message}")]
    InvalidRange { message: String },
    #[error("No replacement was performed, old_str `{old}` did not appear verbatim in {path}")]
    NoMatch { path: String, old: String },
    #[error("No replacement was performed. Multiple occurrences of old_str `{old}` in lines {lines:?}. Please ensure it is unique.")]
    AmbiguousMatch { old: String, lines: Vec<usize> },
    #[error("Invalid `insert_line` parameter: {line}. It should be within the range of lines of the file: [0, {line_count}]")]
    InvalidInsertPosition { line: i64, line_count: usize },
    #[error("Invalid patch (line {line}): {message}")]
    PatchFormat { line: usize, message: String },
    #[error("Context mismatch in {path} at offset {offset}: expected {expected:?}, found {actual:?}")]
    ContextMismatch {
        path: String,
        expected: String,
        actual: String,
        offset: usize,
    },
    #[error("Anchor {anchor:?} not found in {path}")]
    AnchorNotFound { path: String, anchor: String },
    #[error("Invalid arguments: {message}")]
    InvalidArguments { message: String },
    #[error("Tool not found: {name}")]
    ToolNotFound { name: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ToolError {
    /// Stable identifier for the error kind, for callers that branch on it
    pub fn kind(&self) -> &'static str {
        match self {
            ToolError::PathEscape { .. } => "path_escape",
            ToolError::RelativePath { .. } => "relative_path",
            ToolError::NotFound { .. } => "not_found",
            ToolError::AlreadyExists { .. } => "already_exists",
            ToolError::IsADirectory { .. } => "is_a_directory",
            ToolError::MissingArgument { .. } => "missing_argument",
            ToolError::InvalidRange { .. } => "invalid_range",
            ToolError::NoMatch { .. } => "no_match",
            ToolError::AmbiguousMatch { .. } => "ambiguous_match",
            ToolError::InvalidInsertPosition { .. } => "invalid_insert_position",
            ToolError::PatchFormat { .. } => "patch_format",
            ToolError::ContextMismatch { .. } => "context_mismatch",
            ToolError::AnchorNotFound { .. } => "anchor_not_found",
            ToolError::InvalidArguments { .. } => "invalid_arguments",
            ToolError::ToolNotFound { .. } => "tool_not_found",
            ToolError::Io(_) => "io",
            ToolError::Json(_) => "json",
        }
    }

    pub(crate) fn missing(command: &str, name: &str) -> Self {
        ToolError::MissingArgument {
            command: command.to_string(),
            name: name.to_string(),
        }
    }

    pub(crate) fn invalid_args(message: impl Into<String>) -> Self {
        ToolError::InvalidArguments {
            message: message.into(),
        }
    }
}

/// Arguments passed to tool execution
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolArgs {
    pub args: Vec<String>,
    pub named_args: HashMap<String, String>,
}

impl ToolArgs {
    /// Create ToolArgs from command line arguments
    pub fn from_args(args: &[&str]) -> Self {
        let mut positional = Vec::new();
        let mut named = HashMap::new();

        for &arg in args {
            if let Some(flag) = arg.strip_prefix("--") {
                match flag.split_once('=') {
                    Some((key, value)) => {
                        named.insert(key.to_string(), value.to_string());
                    }
                    None => {
                        named.insert(flag.to_string(), "true".to_string());
                    }
                }
            } else {
                positional.push(arg.to_string());
            }
        }

        Self {
            args: positional,
            named_args: named,
        }
    }

    /// Create ToolArgs with named arguments
    pub fn with_named_args(args: Vec<String>, named_args: HashMap<String, String>) -> Self {
        Self { args, named_args }
    }

    /// Create ToolArgs from a function-call style JSON object.
    ///
    /// Strings are kept verbatim, nulls are dropped and every other value is
    /// stored as its JSON text.
    pub fn from_json(value: Value) -> Result<Self, ToolError> {
        let Value::Object(obj) = value else {
            return Err(ToolError::invalid_args("tool arguments must be a JSON object"));
        };

        let mut named = HashMap::new();
        for (key, value) in obj {
            match value {
                Value::Null => {}
                Value::String(s) => {
                    named.insert(key, s);
                }
                other => {
                    named.insert(key, other.to_string());
                }
            }
        }

        Ok(Self {
            args: Vec::new(),
            named_args: named,
        })
    }

    /// Get positional argument by index
    pub fn get_arg(&self, index: usize) -> Option<&String> {
        self.args.get(index)
    }

    /// Get named argument
    pub fn get_named_arg(&self, name: &str) -> Option<&String> {
        self.named_args.get(name)
    }

    /// Get argument count
    pub fn len(&self) -> usize {
        self.args.len()
    }

    /// Check if arguments are empty
    pub fn is_empty(&self) -> bool {
        self.args.is_empty() && self.named_args.is_empty()
    }

    /// Collect parameters into a single map.
    ///
    /// A `json` named argument wins outright. Otherwise positional arguments
    /// are bound to `positional` names in order and named arguments are
    /// layered on top.
    pub fn params(&self, positional: &[&str]) -> Result<Params, ToolError> {
        if let Some(json_str) = self.get_named_arg("json") {
            return match serde_json::from_str(json_str)? {
                Value::Object(values) => Ok(Params { values }),
                _ => Err(ToolError::invalid_args("`json` must hold a JSON object")),
            };
        }

        let mut values = Map::new();
        for (name, value) in positional.iter().zip(&self.args) {
            values.insert(name.to_string(), Value::String(value.clone()));
        }
        for (key, value) in &self.named_args {
            values.insert(key.clone(), Value::String(value.clone()));
        }
        Ok(Params { values })
    }
}

/// Parameter map with typed accessors
#[derive(Debug, Clone, Default)]
pub struct Params {
    values: Map<String, Value>,
}

impl Params {
    pub fn contains(&self, key: &str) -> bool {
        matches!(self.values.get(key), Some(v) if !v.is_null())
    }

    pub fn insert_pair(&mut self, key: &str, first: i64, last: i64) {
        self.values
            .insert(key.to_string(), serde_json::json!([first, last]));
    }

    pub fn get_str(&self, key: &str) -> Result<Option<String>, ToolError> {
        match self.values.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(ToolError::invalid_args(format!(
                "`{}` must be a string, got {}",
                key, other
            ))),
        }
    }

    pub fn require_str(&self, key: &str, command: &str) -> Result<String, ToolError> {
        self.get_str(key)?
            .ok_or_else(|| ToolError::missing(command, key))
    }

    pub fn get_i64(&self, key: &str) -> Result<Option<i64>, ToolError> {
        match self.values.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(n)) => n
                .as_i64()
                .map(Some)
                .ok_or_else(|| ToolError::invalid_args(format!("`{}` must be an integer", key))),
            Some(Value::String(s)) => s.trim().parse::<i64>().map(Some).map_err(|_| {
                ToolError::invalid_args(format!("`{}` must be an integer, got {:?}", key, s))
            }),
            Some(other) => Err(ToolError::invalid_args(format!(
                "`{}` must be an integer, got {}",
                key, other
            ))),
        }
    }

    /// Read a two-integer list such as `view_range`.
    pub fn get_pair(&self, key: &str) -> Result<Option<(i64, i64)>, ToolError> {
        let value = match self.values.get(key) {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::String(s)) => serde_json::from_str::<Value>(s).map_err(|_| {
                ToolError::InvalidRange {
                    message: format!("{}. It should be a list of two integers.", s),
                }
            })?,
            Some(other) => other.clone(),
        };

        let pair = value
            .as_array()
            .filter(|items| items.len() == 2)
            .and_then(|items| Some((items[0].as_i64()?, items[1].as_i64()?)));

        match pair {
            Some(pair) => Ok(Some(pair)),
            None => Err(ToolError::InvalidRange {
                message: format!("{}. It should be a list of two integers.", value),
            }),
        }
    }
}

/// Result returned by tool execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub success: bool,
    pub message: String,
    pub data: Option<Value>,
}

impl ToolResult {
    /// Create successful result
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }

    /// Create successful result with data
    pub fn success_with_data(message: impl Into<String>, data: Value) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }

    /// Create error result
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }

    /// Create error result carrying the error kind
    pub fn from_error(error: &ToolError) -> Self {
        Self {
            success: false,
            message: error.to_string(),
            data: Some(serde_json::json!({ "kind": error.kind() })),
        }
    }
}

/// Main trait for all tools
pub trait Tool: Send + Sync {
    /// Get the tool name
    fn name(&self) -> &str;

    /// Get the tool description
    fn description(&self) -> &str;

    /// Get the tool usage/signature
    fn signature(&self) -> &str;

    /// Validate argument shape before execution
    fn validate_args(&self, args: &ToolArgs) -> Result<(), ToolError>;

    /// Execute the tool against the workspace
    fn execute(&mut self, args: &ToolArgs, workspace: &Workspace) -> Result<ToolResult, ToolError>;

    /// Get OpenAI function schema for this tool
    fn get_openai_schema(&self) -> Value {
        serde_json::json!({
            "type": "function",
            "function": {
                "name": self.name(),
                "description": self.description(),
                "parameters": self.get_parameters_schema()
            }
        })
    }

    /// Get parameters schema - should be overridden by implementing tools
    fn get_parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    }
}

/// Registry for managing available tools
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
    workspace: Workspace,
}

impl ToolRegistry {
    /// Create a new empty tool registry bound to a workspace
    pub fn new(workspace: Workspace) -> Self {
        Self {
            tools: HashMap::new(),
            workspace,
        }
    }

    /// Register a tool
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.name().to_string();
        self.tools.insert(name, tool);
    }

    /// Execute a tool by name
    pub fn execute_tool(&mut self, name: &str, args: &ToolArgs) -> Result<ToolResult, ToolError> {
        let tool = self
            .tools
            .get_mut(name)
            .ok_or_else(|| ToolError::ToolNotFound {
                name: name.to_string(),
            })?;

        tool.validate_args(args)?;

        debug!(tool = name, "executing tool");
        tool.execute(args, &self.workspace)
    }

    /// List all registered tool names, sorted
    pub fn list_tools(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    /// Get tool by name
    pub fn get_tool(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    /// Get OpenAI function schemas for all tools
    pub fn get_all_schemas(&self) -> Vec<Value> {
        self.list_tools()
            .iter()
            .filter_map(|name| self.get_tool(name))
            .map(|tool| tool.get_openai_schema())
            .collect()
    }

    /// The workspace every tool operates in
    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }
}
