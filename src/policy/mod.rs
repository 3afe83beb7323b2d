//! # Domain Policy
//!
//! Decides whether an agent may use a capability, based only on the agent's
//! assigned domain patterns and the capability's name. Decisions are made
//! outside the model's reasoning loop and are recorded in a bounded audit
//! log.
//!
//! ```text
//! Agent → tool_call("fundraising.create_plan")
//!   → DomainPolicy.check("fundraising_coordinator", "fundraising.create_plan")
//!   → patterns ["fundraising.*"] admit it
//!   → allowed
//! ```
//!
//! Unknown agents are admitted nothing.

pub mod assignments;

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::capabilities::{CapabilityRegistry, SharedTool};
use crate::mcp::filters::is_admitted;

pub use assignments::DomainAssignments;

/// Default number of audit entries kept.
pub const DEFAULT_MAX_AUDIT_ENTRIES: usize = 1000;

/// The outcome of one admission check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyDecision {
    pub actor: String,
    pub capability: String,
    pub allowed: bool,
    /// Human-readable reason
    pub reason: String,
    pub decided_at: DateTime<Utc>,
}

/// Admission policy over a fixed set of assignments.
#[derive(Debug)]
pub struct DomainPolicy {
    assignments: DomainAssignments,
    audit_log: Mutex<VecDeque<PolicyDecision>>,
    max_audit_entries: usize,
}

impl DomainPolicy {
    pub fn new(assignments: DomainAssignments) -> Self {
        Self {
            assignments,
            audit_log: Mutex::new(VecDeque::new()),
            max_audit_entries: DEFAULT_MAX_AUDIT_ENTRIES,
        }
    }

    /// Keep at most `max` audit entries (at least one).
    pub fn with_max_audit_entries(mut self, max: usize) -> Self {
        self.max_audit_entries = max.max(1);
        self
    }

    pub fn assignments(&self) -> &DomainAssignments {
        &self.assignments
    }

    /// May `actor` use `capability`?
    pub fn check(&self, actor: &str, capability: &str) -> bool {
        let (allowed, reason) = match self.assignments.patterns_for(actor) {
            None => (false, "unknown agent".to_string()),
            Some(patterns) if patterns.admits(capability) => {
                (true, format!("admitted by {}", patterns))
            }
            Some(patterns) => (false, format!("not admitted by {}", patterns)),
        };
        self.record(actor, capability, allowed, reason);
        allowed
    }

    /// Check against unvalidated patterns, e.g. ones supplied per request.
    ///
    /// A malformed pattern denies the request.
    pub fn check_patterns<S: AsRef<str>>(&self, actor: &str, capability: &str, patterns: &[S]) -> bool {
        let (allowed, reason) = match is_admitted(capability, patterns) {
            Ok(true) => (true, "admitted by request patterns".to_string()),
            Ok(false) => (false, "not admitted by request patterns".to_string()),
            Err(e) => {
                log::warn!("Denying {} for {}: {}", capability, actor, e);
                (false, e.to_string())
            }
        };
        self.record(actor, capability, allowed, reason);
        allowed
    }

    /// Registered tools `actor` may use, sorted by name.
    pub fn admitted_tools(&self, actor: &str, registry: &CapabilityRegistry) -> Vec<SharedTool> {
        match self.assignments.patterns_for(actor) {
            Some(patterns) => registry.admitted(patterns),
            None => {
                log::warn!("No domain assignment for agent '{}'", actor);
                Vec::new()
            }
        }
    }

    /// Most recent decisions, oldest first.
    pub fn recent_decisions(&self) -> Vec<PolicyDecision> {
        self.audit_log.lock().iter().cloned().collect()
    }

    pub fn audit_count(&self) -> usize {
        self.audit_log.lock().len()
    }

    fn record(&self, actor: &str, capability: &str, allowed: bool, reason: String) {
        if allowed {
            log::debug!("Allowed {} -> {} ({})", actor, capability, reason);
        } else {
            log::info!("Denied {} -> {} ({})", actor, capability, reason);
        }
        let mut log = self.audit_log.lock();
        while log.len() >= self.max_audit_entries {
            log.pop_front();
        }
        log.push_back(PolicyDecision {
            actor: actor.to_string(),
            capability: capability.to_string(),
            allowed,
            reason,
            decided_at: Utc::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::{CapabilityName, FunctionTool};
    use serde_json::json;

    fn policy() -> DomainPolicy {
        let assignments = DomainAssignments::from_patterns([
            ("user_assistant", vec!["user.ask_input"]),
            ("event_coordinator", vec!["event.*"]),
            ("fundraising_coordinator", vec!["fundraising.*"]),
            ("idle", vec![]),
        ])
        .unwrap();
        DomainPolicy::new(assignments)
    }

    fn tool(name: &str) -> FunctionTool {
        FunctionTool::new(CapabilityName::new(name).unwrap(), "", json!({}), |_| Ok(json!(null)))
    }

    #[test]
    fn test_check_by_namespace_and_exact() {
        let policy = policy();
        assert!(policy.check("event_coordinator", "event.plan_event"));
        assert!(!policy.check("event_coordinator", "fundraising.create_plan"));
        assert!(policy.check("user_assistant", "user.ask_input"));
        assert!(!policy.check("user_assistant", "user.other"));
    }

    #[test]
    fn test_unknown_and_empty_agents_admit_nothing() {
        let policy = policy();
        assert!(!policy.check("stranger", "event.plan_event"));
        assert!(!policy.check("idle", "event.plan_event"));

        let last = policy.recent_decisions().pop().unwrap();
        assert_eq!(last.actor, "idle");
        assert!(!last.allowed);
    }

    #[test]
    fn test_malformed_request_patterns_deny() {
        let policy = policy();
        assert!(!policy.check_patterns("x", "event.plan_event", &["event.*", "even*"]));
        assert!(policy.check_patterns("x", "event.plan_event", &["event.*"]));
    }

    #[test]
    fn test_admitted_tools() {
        let mut registry = CapabilityRegistry::new();
        for name in ["event.plan_event", "event.get_venue_suggestions", "fundraising.create_plan"] {
            registry.register(tool(name)).unwrap();
        }
        let policy = policy();

        let names: Vec<String> = policy
            .admitted_tools("event_coordinator", &registry)
            .iter()
            .map(|t| t.name().to_string())
            .collect();
        assert_eq!(names, vec!["event.get_venue_suggestions", "event.plan_event"]);
        assert!(policy.admitted_tools("stranger", &registry).is_empty());
    }

    #[test]
    fn test_audit_log_is_bounded() {
        let policy = policy().with_max_audit_entries(2);
        policy.check("event_coordinator", "event.a");
        policy.check("event_coordinator", "event.b");
        policy.check("event_coordinator", "event.c");
        assert_eq!(policy.audit_count(), 2);
        assert_eq!(policy.recent_decisions()[0].capability, "event.b");
    }
}
