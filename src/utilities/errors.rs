//! Error types shared across crewgate.
//!
//! Every fallible public operation returns one of these enums. Deadline
//! expiry on an input request is deliberately absent: it is an outcome, not
//! an error.

use thiserror::Error;

/// Boxed error returned by capability tool invocations.
pub type ToolError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while parsing or applying domain patterns.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FilterError {
    /// The pattern is malformed, e.g. a wildcard outside the final segment.
    #[error("invalid domain pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

impl FilterError {
    pub(crate) fn invalid(pattern: &str, reason: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.into(),
        }
    }
}

/// Errors surfaced by the timeout input gate.
#[derive(Debug, Error)]
pub enum GateError {
    /// The underlying input channel failed before the deadline.
    #[error("input channel failure: {0}")]
    InputChannelFailure(#[from] std::io::Error),
}

/// Errors from the capability registry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A capability name was empty or had an empty dot segment.
    #[error("invalid capability name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    /// A capability with the same name is already registered.
    #[error("capability already registered: {name}")]
    Duplicate { name: String },
}

/// Errors from dispatching a tool call on behalf of an actor.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The actor's domain patterns do not admit the capability.
    #[error("agent '{actor}' is not admitted to '{capability}'")]
    NotAdmitted { actor: String, capability: String },

    /// No tool with this name exists in the registry.
    #[error("unknown capability: {capability}")]
    UnknownCapability { capability: String },

    /// The tool itself failed.
    #[error("capability '{capability}' failed: {source}")]
    Tool {
        capability: String,
        #[source]
        source: ToolError,
    },
}

/// Errors from loading crew configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// YAML decoding failed.
    #[error("invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON decoding failed.
    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),

    /// An agent was assigned a malformed domain pattern.
    #[error("agent '{agent}': {source}")]
    Pattern {
        agent: String,
        #[source]
        source: FilterError,
    },

    /// An agent referenced a prompt key missing from the prompt book.
    #[error("agent '{agent}' references unknown prompt '{key}'")]
    MissingPrompt { agent: String, key: String },

    /// The tool catalog could not be assembled.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_pattern_message() {
        let err = FilterError::invalid("*.event", "wildcard must be the final segment");
        assert_eq!(
            err.to_string(),
            "invalid domain pattern '*.event': wildcard must be the final segment"
        );
    }

    #[test]
    fn test_gate_error_wraps_io() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed");
        let err: GateError = io.into();
        assert!(err.to_string().contains("closed"));
    }
}
