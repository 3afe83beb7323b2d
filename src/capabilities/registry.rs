//! Capability registry: the universe of tools available at runtime.
//!
//! Tools are registered once at startup and indexed by name. The registry
//! never decides access on its own; it hands out the subset a pattern set
//! admits and leaves the decision to the caller.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use super::capability::{CapabilityName, CapabilityTool};
use crate::mcp::filters::DomainPatternSet;
use crate::utilities::errors::RegistryError;

/// Shared handle to a registered tool.
pub type SharedTool = Arc<dyn CapabilityTool>;

/// Registry of capability tools, ordered by name.
#[derive(Debug, Default, Clone)]
pub struct CapabilityRegistry {
    tools: BTreeMap<CapabilityName, SharedTool>,
}

impl CapabilityRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool.
    ///
    /// Descriptors are immutable once registered, so a second tool with the
    /// same name is rejected rather than replacing the first.
    pub fn register<T>(&mut self, tool: T) -> Result<(), RegistryError>
    where
        T: CapabilityTool + 'static,
    {
        self.register_shared(Arc::new(tool))
    }

    /// Register an already shared tool.
    pub fn register_shared(&mut self, tool: SharedTool) -> Result<(), RegistryError> {
        let name = tool.name().clone();
        if self.tools.contains_key(&name) {
            return Err(RegistryError::Duplicate {
                name: name.to_string(),
            });
        }
        log::debug!("Registered capability {}", name);
        self.tools.insert(name, tool);
        Ok(())
    }

    /// Look up a tool by name.
    pub fn get(&self, name: &str) -> Option<&SharedTool> {
        // Unvalidated names can never be registered, so a failed parse is a miss.
        let key = CapabilityName::new(name).ok()?;
        self.tools.get(&key)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// All registered names, sorted.
    pub fn names(&self) -> Vec<&CapabilityName> {
        self.tools.keys().collect()
    }

    /// Tools whose namespace is exactly `namespace`.
    pub fn list_by_namespace(&self, namespace: &str) -> Vec<&SharedTool> {
        self.tools
            .iter()
            .filter(|(name, _)| name.namespace() == Some(namespace))
            .map(|(_, tool)| tool)
            .collect()
    }

    /// Tools admitted by `patterns`, sorted by name.
    pub fn admitted(&self, patterns: &DomainPatternSet) -> Vec<SharedTool> {
        self.tools
            .iter()
            .filter(|(name, _)| patterns.admits(name.as_str()))
            .map(|(_, tool)| Arc::clone(tool))
            .collect()
    }

    /// Tool definitions for every registered tool.
    pub fn definitions(&self) -> Vec<Value> {
        self.tools.values().map(|t| t.definition()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::capability::FunctionTool;
    use serde_json::json;

    fn make_tool(name: &str) -> FunctionTool {
        FunctionTool::new(
            CapabilityName::new(name).unwrap(),
            format!("{} tool", name),
            json!({}),
            |_| Ok(Value::Null),
        )
    }

    fn registry() -> CapabilityRegistry {
        let mut registry = CapabilityRegistry::new();
        for name in [
            "event.plan_event",
            "event.get_venue_suggestions",
            "fundraising.create_plan",
            "quality.check_deliverable",
            "db.query",
        ] {
            registry.register(make_tool(name)).unwrap();
        }
        registry
    }

    #[test]
    fn test_register_and_get() {
        let registry = registry();
        assert_eq!(registry.len(), 5);
        assert!(registry.contains("db.query"));
        assert!(registry.get("db.missing").is_none());
        assert!(registry.get("").is_none());
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut registry = registry();
        let err = registry.register(make_tool("db.query")).unwrap_err();
        assert_eq!(
            err,
            RegistryError::Duplicate {
                name: "db.query".to_string()
            }
        );
        assert_eq!(registry.len(), 5);
    }

    #[test]
    fn test_admitted_subset() {
        let registry = registry();
        let patterns = DomainPatternSet::parse(["event.*", "db.query"]).unwrap();
        let names: Vec<String> = registry
            .admitted(&patterns)
            .iter()
            .map(|t| t.name().to_string())
            .collect();
        assert_eq!(
            names,
            vec!["db.query", "event.get_venue_suggestions", "event.plan_event"]
        );

        assert!(registry.admitted(&DomainPatternSet::new()).is_empty());
    }

    #[test]
    fn test_list_by_namespace() {
        let registry = registry();
        assert_eq!(registry.list_by_namespace("event").len(), 2);
        assert_eq!(registry.list_by_namespace("quality").len(), 1);
        assert!(registry.list_by_namespace("sheets").is_empty());
    }
}
