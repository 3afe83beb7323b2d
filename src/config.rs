//! Crew configuration: agents, their allowed domains, and input settings.
//!
//! # Example YAML
//!
//! ```yaml
//! agents:
//!   event_coordinator:
//!     allowed_domains: ["event.*"]
//!     system_message: "You plan events."
//!   user_assistant:
//!     allowed_domains: ["user.ask_input"]
//!     prompt_key: UserAssistant
//! input:
//!   timeout_secs: 10
//!   fallback: "Anonymous"
//!   defaults:
//!     name: "Anonymous User"
//! ```
//!
//! JSON with the same shape is accepted by `from_file` when the path ends in
//! `.json`.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::agents::AgentToolset;
use crate::capabilities::CapabilityRegistry;
use crate::core::providers::human_input::DefaultResponses;
use crate::policy::{DomainAssignments, DomainPolicy};
use crate::utilities::errors::ConfigError;
use crate::utilities::prompts::PromptBook;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "CREWGATE_CONFIG";

/// Environment variable naming the JSON prompt book.
pub const PROMPTS_ENV: &str = "CREWGATE_PROMPTS";

/// Seconds to wait for operator input when nothing is configured.
pub const DEFAULT_TIMEOUT_SECS: f64 = 10.0;

/// Longest input deadline honoured (one year).
pub const MAX_TIMEOUT_SECS: u64 = 365 * 24 * 60 * 60;

/// The event-planning crew used when no config file is given.
pub const DEFAULT_CONFIG_YAML: &str = r#"
agents:
  user_assistant:
    allowed_domains: ["user.ask_input"]
    system_message: >-
      You talk to the user. Ask for missing details with the input tool and
      reply TERMINATE when the user is done.
  event_coordinator:
    allowed_domains: ["event.*"]
    system_message: You plan events and suggest venues.
  fundraising_coordinator:
    allowed_domains: ["fundraising.*"]
    system_message: You create fundraising plans and event budgets.
  quality_checker:
    allowed_domains: ["quality.*"]
    system_message: You review deliverables and build quality checklists.
input:
  timeout_secs: 10
"#;

// ============================================================================
// Sections
// ============================================================================

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrewConfig {
    #[serde(default)]
    pub agents: BTreeMap<String, AgentConfig>,
    #[serde(default)]
    pub input: InputConfig,
}

/// One agent's configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Domain patterns, e.g. `["event.*", "db.query"]`. Empty admits nothing.
    #[serde(default)]
    pub allowed_domains: Vec<String>,
    /// Inline system message. Takes precedence over `prompt_key`.
    #[serde(default)]
    pub system_message: Option<String>,
    /// Key into the prompt book.
    #[serde(default)]
    pub prompt_key: Option<String>,
}

/// Operator input settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: f64,
    /// Replaces the catch-all fallback value.
    #[serde(default)]
    pub fallback: Option<String>,
    /// Keyword → fallback overrides.
    #[serde(default)]
    pub defaults: BTreeMap<String, String>,
}

fn default_timeout_secs() -> f64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            fallback: None,
            defaults: BTreeMap::new(),
        }
    }
}

impl InputConfig {
    /// The input deadline.
    ///
    /// Negative and NaN values mean zero; values past `MAX_TIMEOUT_SECS`,
    /// including infinity, are capped there.
    pub fn timeout(&self) -> Duration {
        let max = Duration::from_secs(MAX_TIMEOUT_SECS);
        match Duration::try_from_secs_f64(self.timeout_secs) {
            Ok(timeout) => timeout.min(max),
            Err(_) if self.timeout_secs > 0.0 => max,
            Err(_) => Duration::ZERO,
        }
    }

    /// Built-in fallbacks with the configured ones laid over them.
    pub fn defaults(&self) -> DefaultResponses {
        let mut defaults = DefaultResponses::default().with_overrides(&self.defaults);
        if let Some(fallback) = &self.fallback {
            defaults.general = fallback.clone();
        }
        defaults
    }
}

// ============================================================================
// Loading
// ============================================================================

impl CrewConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from disk; a `.json` extension selects JSON, anything else YAML.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        log::debug!("Loading crew config from {}", path.display());
        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_yaml_str(&content)
        }
    }

    /// The built-in event-planning crew.
    pub fn default_crew() -> Result<Self, ConfigError> {
        Self::from_yaml_str(DEFAULT_CONFIG_YAML)
    }

    /// Validated domain assignments for every configured agent.
    pub fn assignments(&self) -> Result<DomainAssignments, ConfigError> {
        DomainAssignments::from_patterns(
            self.agents
                .iter()
                .map(|(name, agent)| (name.as_str(), agent.allowed_domains.iter())),
        )
    }

    /// Resolve an agent's system message.
    pub fn system_message(
        &self,
        agent: &str,
        prompts: Option<&PromptBook>,
    ) -> Result<String, ConfigError> {
        let Some(config) = self.agents.get(agent) else {
            return Ok(String::new());
        };
        if let Some(message) = &config.system_message {
            return Ok(message.clone());
        }
        match &config.prompt_key {
            None => Ok(String::new()),
            Some(key) => prompts
                .and_then(|book| book.get(key))
                .map(str::to_string)
                .ok_or_else(|| ConfigError::MissingPrompt {
                    agent: agent.to_string(),
                    key: key.clone(),
                }),
        }
    }

    /// One toolset per configured agent, in name order.
    pub fn toolsets(
        &self,
        policy: &DomainPolicy,
        registry: &CapabilityRegistry,
        prompts: Option<&PromptBook>,
    ) -> Result<Vec<AgentToolset>, ConfigError> {
        self.agents
            .keys()
            .map(|name| -> Result<AgentToolset, ConfigError> {
                let message = self.system_message(name, prompts)?;
                Ok(AgentToolset::build(name.as_str(), message, policy, registry))
            })
            .collect()
    }
}
