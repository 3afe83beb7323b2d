//! Agents and the tools they are allowed to call.
//!
//! Each agent receives an `AgentToolset` filtered by its domain patterns,
//! and every call it makes goes through the `ToolDispatcher`, which checks
//! the policy again before invoking anything.

pub mod tools_handler;
pub mod toolset;

pub use tools_handler::{ToolCall, ToolDispatcher};
pub use toolset::AgentToolset;
