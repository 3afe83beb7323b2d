//! # Capability Registry
//!
//! Capabilities are invocable tools named `namespace.leaf`. The registry owns
//! every tool the process knows about; which of them a given agent may see is
//! decided by its domain patterns (see [`crate::mcp::filters`]).
//!
//! ## Resolution Flow
//!
//! 1. Tools are registered once at startup (`builtin::event_planning_registry`)
//! 2. `CapabilityRegistry::admitted(patterns)` selects the tools an agent may use
//! 3. The dispatcher invokes a tool by name after the policy check passes

pub mod builtin;
pub mod capability;
pub mod registry;

pub use builtin::{event_planning_registry, event_planning_tools, AskUserTool, TERMINATE};
pub use capability::{CapabilityName, CapabilityTool, FunctionTool, ToolFn};
pub use registry::{CapabilityRegistry, SharedTool};
