//! Tool dispatch on behalf of an agent.
//!
//! `ToolDispatcher` is the single entry point for tool calls: it asks the
//! domain policy first, resolves the capability in the registry, invokes it,
//! and remembers the last call.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::capabilities::CapabilityRegistry;
use crate::policy::DomainPolicy;
use crate::utilities::errors::DispatchError;

/// Record of a dispatched call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub actor: String,
    pub capability: String,
    pub arguments: HashMap<String, Value>,
    pub succeeded: bool,
    pub at: DateTime<Utc>,
}

/// Policy-checked tool invocation.
#[derive(Debug)]
pub struct ToolDispatcher {
    registry: Arc<CapabilityRegistry>,
    policy: Arc<DomainPolicy>,
    last_call: Mutex<Option<ToolCall>>,
}

impl ToolDispatcher {
    pub fn new(registry: Arc<CapabilityRegistry>, policy: Arc<DomainPolicy>) -> Self {
        Self {
            registry,
            policy,
            last_call: Mutex::new(None),
        }
    }

    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    pub fn policy(&self) -> &DomainPolicy {
        &self.policy
    }

    /// Invoke `capability` for `actor`.
    ///
    /// Admission is checked before the registry lookup, so a denied agent
    /// cannot probe which capabilities exist.
    pub async fn dispatch(
        &self,
        actor: &str,
        capability: &str,
        args: HashMap<String, Value>,
    ) -> Result<Value, DispatchError> {
        if !self.policy.check(actor, capability) {
            return Err(DispatchError::NotAdmitted {
                actor: actor.to_string(),
                capability: capability.to_string(),
            });
        }

        let tool = self
            .registry
            .get(capability)
            .cloned()
            .ok_or_else(|| DispatchError::UnknownCapability {
                capability: capability.to_string(),
            })?;

        log::info!("Agent '{}' invoking {}", actor, capability);
        let result = tool.invoke(args.clone()).await;

        *self.last_call.lock() = Some(ToolCall {
            actor: actor.to_string(),
            capability: capability.to_string(),
            arguments: args,
            succeeded: result.is_ok(),
            at: Utc::now(),
        });

        result.map_err(|source| {
            log::warn!("Capability {} failed for '{}': {}", capability, actor, source);
            DispatchError::Tool {
                capability: capability.to_string(),
                source,
            }
        })
    }

    /// The most recent call that reached a tool.
    pub fn last_call(&self) -> Option<ToolCall> {
        self.last_call.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::{event_planning_tools, CapabilityName, FunctionTool};
    use crate::policy::DomainAssignments;
    use serde_json::json;

    fn dispatcher() -> ToolDispatcher {
        let mut registry = CapabilityRegistry::new();
        for tool in event_planning_tools() {
            registry.register(tool).unwrap();
        }
        registry
            .register(FunctionTool::new(
                CapabilityName::new("fundraising.always_fails").unwrap(),
                "",
                json!({}),
                |_| Err("ledger offline".into()),
            ))
            .unwrap();
        let policy = DomainPolicy::new(
            DomainAssignments::from_patterns([
                ("event_coordinator", vec!["event.*", "event.ghost"]),
                ("fundraising_coordinator", vec!["fundraising.*"]),
            ])
            .unwrap(),
        );
        ToolDispatcher::new(Arc::new(registry), Arc::new(policy))
    }

    fn args(value: Value) -> HashMap<String, Value> {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_dispatch_admitted() {
        let dispatcher = dispatcher();
        let out = dispatcher
            .dispatch(
                "event_coordinator",
                "event.plan_event",
                args(json!({"event_name": "Gala"})),
            )
            .await
            .unwrap();
        assert_eq!(out, json!("Event Coordinator: Planning event 'Gala'."));

        let last = dispatcher.last_call().unwrap();
        assert_eq!(last.capability, "event.plan_event");
        assert!(last.succeeded);
    }

    #[tokio::test]
    async fn test_dispatch_not_admitted() {
        let dispatcher = dispatcher();
        let err = dispatcher
            .dispatch("event_coordinator", "db.query", args(json!({"query": "x"})))
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::NotAdmitted { .. }));
        assert!(dispatcher.last_call().is_none());
    }

    #[tokio::test]
    async fn test_dispatch_unknown_capability() {
        let dispatcher = dispatcher();
        let err = dispatcher
            .dispatch("event_coordinator", "event.ghost", HashMap::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::UnknownCapability { .. }));
    }

    #[tokio::test]
    async fn test_dispatch_tool_failure() {
        let dispatcher = dispatcher();
        let err = dispatcher
            .dispatch("fundraising_coordinator", "fundraising.always_fails", HashMap::new())
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "capability 'fundraising.always_fails' failed: ledger offline"
        );
        assert!(!dispatcher.last_call().unwrap().succeeded);
    }
}
