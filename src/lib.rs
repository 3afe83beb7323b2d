//! # crewgate
//!
//! Tool admission and operator input for a multi-agent event-planning crew.
//!
//! Two pieces do the real work:
//!
//! - **Domain filtering** ([`mcp::filters`]): each agent is assigned glob-like
//!   domain patterns (`event.*`, `db.query`, `*`) and is only ever handed the
//!   capabilities those patterns admit.
//! - **Timeout input gate** ([`crate::core::providers::human_input`]): asks the
//!   operator for a value and substitutes a fallback if none arrives before
//!   the deadline, so an unattended run never blocks.
//!
//! Everything else (registry, policy, dispatch, configuration, CLI) wires
//! those two together.

pub mod agents;
pub mod capabilities;
pub mod cli;
pub mod config;
pub mod core;
pub mod crew;
pub mod mcp;
pub mod policy;
pub mod utilities;

pub use agents::{AgentToolset, ToolDispatcher};
pub use capabilities::{CapabilityName, CapabilityRegistry, CapabilityTool};
pub use config::CrewConfig;
pub use crate::core::providers::human_input::{DefaultResponses, Resolution, TimeoutInputGate};
pub use crew::Crew;
pub use mcp::filters::{is_admitted, DomainPattern, DomainPatternSet};
pub use policy::{DomainAssignments, DomainPolicy};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
