//! Per-agent tool lists.
//!
//! An agent is handed only the tools its domain patterns admit; the model
//! never sees the rest of the registry.

use std::fmt;

use serde_json::Value;

use crate::capabilities::{CapabilityRegistry, SharedTool};
use crate::policy::DomainPolicy;

/// An agent together with the tools it may call.
#[derive(Clone)]
pub struct AgentToolset {
    pub name: String,
    pub system_message: String,
    tools: Vec<SharedTool>,
}

impl fmt::Debug for AgentToolset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentToolset")
            .field("name", &self.name)
            .field("tools", &self.tool_names())
            .finish()
    }
}

impl AgentToolset {
    /// Select the admitted tools for `name` from `registry`.
    pub fn build(
        name: impl Into<String>,
        system_message: impl Into<String>,
        policy: &DomainPolicy,
        registry: &CapabilityRegistry,
    ) -> Self {
        let name = name.into();
        let tools = policy.admitted_tools(&name, registry);
        log::debug!("Agent '{}' gets {} tool(s)", name, tools.len());
        Self {
            name,
            system_message: system_message.into(),
            tools,
        }
    }

    pub fn tools(&self) -> &[SharedTool] {
        &self.tools
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name().as_str()).collect()
    }

    pub fn has_tool(&self, capability: &str) -> bool {
        self.tools.iter().any(|t| t.name().as_str() == capability)
    }

    /// Tool definitions to advertise to the model.
    pub fn definitions(&self) -> Vec<Value> {
        self.tools.iter().map(|t| t.definition()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::event_planning_tools;
    use crate::policy::DomainAssignments;

    #[test]
    fn test_build_selects_admitted_tools() {
        let mut registry = CapabilityRegistry::new();
        for tool in event_planning_tools() {
            registry.register(tool).unwrap();
        }
        let policy = DomainPolicy::new(
            DomainAssignments::from_patterns([("quality_checker", vec!["quality.*"])]).unwrap(),
        );

        let toolset = AgentToolset::build("quality_checker", "Review deliverables.", &policy, &registry);
        assert_eq!(
            toolset.tool_names(),
            vec!["quality.check_deliverable", "quality.create_checklist"]
        );
        assert!(!toolset.has_tool("db.query"));
        assert_eq!(toolset.definitions().len(), 2);
        assert_eq!(toolset.system_message, "Review deliverables.");
    }

    #[test]
    fn test_unknown_agent_gets_nothing() {
        let mut registry = CapabilityRegistry::new();
        for tool in event_planning_tools() {
            registry.register(tool).unwrap();
        }
        let policy = DomainPolicy::new(DomainAssignments::default());
        let toolset = AgentToolset::build("ghost", "", &policy, &registry);
        assert!(toolset.tools().is_empty());
    }
}
