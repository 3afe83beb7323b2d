//! Agent → domain pattern assignments.
//!
//! Built once from configuration and never mutated afterwards. Every pattern
//! is validated while building, so a malformed assignment is reported at
//! load time instead of on the first tool call.

use std::collections::BTreeMap;

use crate::mcp::filters::DomainPatternSet;
use crate::utilities::errors::ConfigError;

/// Immutable map from agent name to its allowed domains.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainAssignments {
    agents: BTreeMap<String, DomainPatternSet>,
}

impl DomainAssignments {
    /// Build from raw pattern strings, validating each one.
    pub fn from_patterns<I, A, P, S>(entries: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (A, P)>,
        A: Into<String>,
        P: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut agents = BTreeMap::new();
        for (agent, patterns) in entries {
            let agent = agent.into();
            let set = DomainPatternSet::parse(patterns).map_err(|source| ConfigError::Pattern {
                agent: agent.clone(),
                source,
            })?;
            agents.insert(agent, set);
        }
        Ok(Self { agents })
    }

    /// The patterns assigned to `agent`, if it is known.
    pub fn patterns_for(&self, agent: &str) -> Option<&DomainPatternSet> {
        self.agents.get(agent)
    }

    /// Known agent names, sorted.
    pub fn agents(&self) -> impl Iterator<Item = &str> {
        self.agents.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

impl FromIterator<(String, DomainPatternSet)> for DomainAssignments {
    fn from_iter<T: IntoIterator<Item = (String, DomainPatternSet)>>(iter: T) -> Self {
        Self {
            agents: iter.into_iter().collect(),
        }
    }
}
