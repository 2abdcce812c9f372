//! Tool execution for LLM function calls
//!
//! Runs a batch of calls in order against a registry. Every call produces a
//! result; a failed call never stops the ones after it.

use crate::core::{ToolArgs, ToolRegistry};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

/// Result from a single tool execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolExecutionResult {
    /// Tool call ID (for provider correlation)
    pub tool_call_id: String,
    /// Tool name
    pub tool_name: String,
    /// Result content or error message
    pub content: String,
    /// Whether the execution succeeded
    pub success: bool,
    /// Error kind when the call failed, e.g. `ambiguous_match`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
}

impl ToolExecutionResult {
    fn failed(call: &ToolCallRequest, content: String, kind: &str) -> Self {
        Self {
            tool_call_id: call.id.clone(),
            tool_name: call.name.clone(),
            content,
            success: false,
            error_kind: Some(kind.to_string()),
        }
    }
}

/// Simple tool call representation for execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Tool call ID
    pub id: String,
    /// Tool name
    pub name: String,
    /// JSON arguments as string
    pub arguments: String,
}

impl ToolCallRequest {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }
}

/// Optional hooks around each call
pub trait ExecutionCallback {
    /// Called before executing a tool
    fn on_tool_start(&mut self, tool_name: &str, args: &str);

    /// Called after tool execution (success or failure)
    fn on_tool_complete(&mut self, tool_name: &str, args: &str, result: &str, success: bool);
}

/// Default no-op callback
pub struct NoOpCallback;

impl ExecutionCallback for NoOpCallback {
    fn on_tool_start(&mut self, _tool_name: &str, _args: &str) {}
    fn on_tool_complete(&mut self, _tool_name: &str, _args: &str, _result: &str, _success: bool) {}
}

/// Execute tool calls in order and return one result per call
pub fn execute_tool_calls(
    registry: &mut ToolRegistry,
    tool_calls: Vec<ToolCallRequest>,
) -> Vec<ToolExecutionResult> {
    execute_tool_calls_with_callback(registry, tool_calls, &mut NoOpCallback)
}

/// Execute tool calls in order, reporting each one to `callback`
pub fn execute_tool_calls_with_callback(
    registry: &mut ToolRegistry,
    tool_calls: Vec<ToolCallRequest>,
    callback: &mut dyn ExecutionCallback,
) -> Vec<ToolExecutionResult> {
    let mut results = Vec::with_capacity(tool_calls.len());

    for call in tool_calls {
        debug!(id = %call.id, tool = %call.name, arguments = %call.arguments, "tool call");
        callback.on_tool_start(&call.name, &call.arguments);

        let result = execute_one(registry, &call);
        if result.success {
            info!(id = %call.id, tool = %call.name, "tool call succeeded");
        } else {
            warn!(
                id = %call.id,
                tool = %call.name,
                kind = result.error_kind.as_deref().unwrap_or("unknown"),
                "tool call failed"
            );
        }

        callback.on_tool_complete(&call.name, &call.arguments, &result.content, result.success);
        results.push(result);
    }

    results
}

fn execute_one(registry: &mut ToolRegistry, call: &ToolCallRequest) -> ToolExecutionResult {
    // Some providers send an empty string for calls without arguments
    let raw = if call.arguments.trim().is_empty() {
        "{}"
    } else {
        call.arguments.as_str()
    };

    let value: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            return ToolExecutionResult::failed(
                call,
                format!("Failed to parse tool arguments for {}: {}", call.name, e),
                "json",
            )
        }
    };

    let args = match ToolArgs::from_json(value) {
        Ok(args) => args,
        Err(e) => {
            return ToolExecutionResult::failed(
                call,
                format!("Failed to convert arguments for {}: {}", call.name, e),
                e.kind(),
            )
        }
    };

    match registry.execute_tool(&call.name, &args) {
        Ok(result) => ToolExecutionResult {
            tool_call_id: call.id.clone(),
            tool_name: call.name.clone(),
            content: result.message,
            success: result.success,
            error_kind: None,
        },
        Err(e) => ToolExecutionResult::failed(call, e.to_string(), e.kind()),
    }
}
