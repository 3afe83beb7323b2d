//! The assembled crew: configuration, tool catalog, policy, and input gate.
//!
//! `Crew::assemble` wires everything once at startup. After that the domain
//! assignments and the registry are fixed for the life of the process.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;

use crate::agents::{AgentToolset, ToolDispatcher};
use crate::capabilities::{event_planning_registry, AskUserTool, CapabilityRegistry};
use crate::config::CrewConfig;
use crate::core::providers::human_input::{DefaultResponses, Resolution, TimeoutInputGate};
use crate::policy::DomainPolicy;
use crate::utilities::errors::{ConfigError, DispatchError, GateError};
use crate::utilities::prompts::PromptBook;

/// A group of agents sharing one tool catalog and one input gate.
#[derive(Debug)]
pub struct Crew {
    /// Unique identifier for this crew instance.
    pub id: Uuid,
    config: CrewConfig,
    defaults: DefaultResponses,
    gate: TimeoutInputGate,
    dispatcher: ToolDispatcher,
    toolsets: Vec<AgentToolset>,
}

impl Crew {
    /// Build the event-planning catalog and bind every configured agent to
    /// the tools its domains admit.
    pub fn assemble(
        config: CrewConfig,
        prompts: Option<&PromptBook>,
        gate: TimeoutInputGate,
    ) -> Result<Self, ConfigError> {
        let defaults = config.input.defaults();
        let ask_user = AskUserTool::new(gate.clone(), config.input.timeout(), defaults.clone());
        let registry = Arc::new(event_planning_registry(ask_user)?);
        let policy = Arc::new(DomainPolicy::new(config.assignments()?));
        let toolsets = config.toolsets(&policy, &registry, prompts)?;

        let id = Uuid::new_v4();
        log::info!(
            "Crew {} assembled: {} agent(s), {} capabilities",
            id,
            toolsets.len(),
            registry.len()
        );

        Ok(Self {
            id,
            config,
            defaults,
            gate,
            dispatcher: ToolDispatcher::new(registry, policy),
            toolsets,
        })
    }

    pub fn config(&self) -> &CrewConfig {
        &self.config
    }

    pub fn registry(&self) -> &CapabilityRegistry {
        self.dispatcher.registry()
    }

    pub fn policy(&self) -> &DomainPolicy {
        self.dispatcher.policy()
    }

    pub fn toolsets(&self) -> &[AgentToolset] {
        &self.toolsets
    }

    pub fn toolset(&self, agent: &str) -> Option<&AgentToolset> {
        self.toolsets.iter().find(|t| t.name == agent)
    }

    /// May `agent` use `capability`?
    pub fn check(&self, agent: &str, capability: &str) -> bool {
        self.policy().check(agent, capability)
    }

    /// Invoke a capability on behalf of `agent`.
    pub async fn dispatch(
        &self,
        agent: &str,
        capability: &str,
        args: HashMap<String, Value>,
    ) -> Result<Value, DispatchError> {
        self.dispatcher.dispatch(agent, capability, args).await
    }

    /// Ask the operator directly, using the configured timeout and fallbacks.
    pub async fn ask(&self, prompt: &str) -> Result<Resolution, GateError> {
        let fallback = self.defaults.fallback_for(prompt).to_string();
        self.gate
            .request(prompt, self.config.input.timeout(), fallback)
            .await
    }
}
