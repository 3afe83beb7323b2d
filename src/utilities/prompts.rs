//! System messages for agents, loaded from a JSON prompt book.
//!
//! The book is a flat object keyed by agent role:
//!
//! ```json
//! {
//!   "EventCoordinator": "You coordinate events...",
//!   "UserAssistant": "You talk to the user..."
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::utilities::errors::ConfigError;

/// Role → system message map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PromptBook {
    prompts: BTreeMap<String, String>,
}

impl PromptBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.prompts.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, prompt: impl Into<String>) {
        self.prompts.insert(key.into(), prompt.into());
    }

    pub fn len(&self) -> usize {
        self.prompts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }
}
