//! Capability descriptors and the tool trait behind them.
//!
//! A capability is an invocable tool identified by a dot-namespaced name,
//! e.g. `fundraising.create_plan`. Domain filtering only ever looks at the
//! name; invocation is the tool's own business.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::utilities::errors::{RegistryError, ToolError};

// ---------------------------------------------------------------------------
// CapabilityName
// ---------------------------------------------------------------------------

/// Validated capability descriptor: `namespace.leaf`.
///
/// Immutable once constructed. Names without a dot are allowed and have no
/// namespace.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CapabilityName(String);

impl CapabilityName {
    /// Validate a capability name.
    pub fn new(name: impl Into<String>) -> Result<Self, RegistryError> {
        let name = name.into();
        if name.is_empty() {
            return Err(RegistryError::InvalidName {
                name,
                reason: "name is empty".to_string(),
            });
        }
        if name.split('.').any(str::is_empty) {
            return Err(RegistryError::InvalidName {
                name,
                reason: "empty segment".to_string(),
            });
        }
        if name.contains('*') {
            return Err(RegistryError::InvalidName {
                name,
                reason: "wildcards are only valid in domain patterns".to_string(),
            });
        }
        Ok(Self(name))
    }

    /// Names of the built-in catalog, which are known to be valid.
    pub(crate) fn builtin(name: &'static str) -> Self {
        debug_assert!(Self::new(name).is_ok(), "invalid builtin name {name}");
        Self(name.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Everything before the final dot, if any.
    pub fn namespace(&self) -> Option<&str> {
        crate::mcp::filters::namespace_of(&self.0)
    }

    /// The final dot-separated segment.
    pub fn leaf(&self) -> &str {
        self.0.rsplit_once('.').map(|(_, leaf)| leaf).unwrap_or(&self.0)
    }
}

impl fmt::Display for CapabilityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for CapabilityName {
    type Error = RegistryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CapabilityName> for String {
    fn from(name: CapabilityName) -> Self {
        name.0
    }
}

impl AsRef<str> for CapabilityName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// CapabilityTool trait
// ---------------------------------------------------------------------------

/// An invocable tool exposed through the registry.
///
/// Implementors provide a name, a description for the model, an argument
/// schema, and the async invocation itself.
#[async_trait]
pub trait CapabilityTool: Send + Sync + fmt::Debug {
    /// The namespaced name of the tool.
    fn name(&self) -> &CapabilityName;

    /// Description used to tell the model how/when/why to use the tool.
    fn description(&self) -> &str;

    /// JSON schema for the arguments the tool accepts.
    fn args_schema(&self) -> Value {
        Value::Object(serde_json::Map::new())
    }

    /// Run the tool.
    async fn invoke(&self, args: HashMap<String, Value>) -> Result<Value, ToolError>;

    /// Tool definition as a tool server would list it.
    fn definition(&self) -> Value {
        serde_json::json!({
            "name": self.name().as_str(),
            "description": self.description(),
            "parameters": self.args_schema(),
        })
    }
}

// ---------------------------------------------------------------------------
// FunctionTool
// ---------------------------------------------------------------------------

/// Type alias for a synchronous tool function.
pub type ToolFn = Arc<dyn Fn(&HashMap<String, Value>) -> Result<Value, ToolError> + Send + Sync>;

/// A tool backed by a plain function.
#[derive(Clone)]
pub struct FunctionTool {
    name: CapabilityName,
    description: String,
    args_schema: Value,
    func: ToolFn,
}

impl fmt::Debug for FunctionTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionTool")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish()
    }
}

impl FunctionTool {
    pub fn new<F>(
        name: CapabilityName,
        description: impl Into<String>,
        args_schema: Value,
        func: F,
    ) -> Self
    where
        F: Fn(&HashMap<String, Value>) -> Result<Value, ToolError> + Send + Sync + 'static,
    {
        Self {
            name,
            description: description.into(),
            args_schema,
            func: Arc::new(func),
        }
    }
}

#[async_trait]
impl CapabilityTool for FunctionTool {
    fn name(&self) -> &CapabilityName {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn args_schema(&self) -> Value {
        self.args_schema.clone()
    }

    async fn invoke(&self, args: HashMap<String, Value>) -> Result<Value, ToolError> {
        (self.func)(&args)
    }
}

// ---------------------------------------------------------------------------
// Argument helpers
// ---------------------------------------------------------------------------

/// Fetch a required string argument.
pub fn required_str<'a>(args: &'a HashMap<String, Value>, key: &str) -> Result<&'a str, ToolError> {
    args.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| format!("missing required argument '{}'", key).into())
}

/// Fetch an optional string argument, defaulting to `""`.
pub fn optional_str<'a>(args: &'a HashMap<String, Value>, key: &str) -> &'a str {
    args.get(key).and_then(Value::as_str).unwrap_or("")
}

/// Fetch a numeric argument, defaulting to `default`.
pub fn number_or(args: &HashMap<String, Value>, key: &str, default: f64) -> f64 {
    args.get(key).and_then(Value::as_f64).unwrap_or(default)
}
