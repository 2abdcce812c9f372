//! LLM integration
//!
//! Executes batches of function calls, as produced by providers such as
//! OpenAI or Anthropic, against a tool registry. Tool schemas for the
//! request side come from `ToolRegistry::get_all_schemas`.

pub mod executor;

pub use executor::{
    execute_tool_calls, execute_tool_calls_with_callback, ExecutionCallback, NoOpCallback,
    ToolCallRequest, ToolExecutionResult,
};
