//! Domain-pattern tool filtering.
//!
//! Agents are granted tools through glob-style domain patterns: either an
//! exact capability name (`quality.check_deliverable`) or a namespace
//! wildcard (`event.*`). A wildcard is only legal as the whole final segment.
//!
//! ```rust
//! use crewgate::mcp::filters::is_admitted;
//!
//! assert!(is_admitted("event.plan_meeting", ["event.*", "quality.check"]).unwrap());
//! assert!(!is_admitted("fundraising.compute_budget", ["event.*", "quality.check"]).unwrap());
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::utilities::errors::FilterError;

/// The wildcard segment.
pub const WILDCARD: &str = "*";

/// Type alias for boxed tool-definition filters.
///
/// Takes a tool definition JSON object (with at least a `"name"` key) and
/// returns whether the tool should be included.
pub type ToolFilter = Box<dyn Fn(&Value) -> bool + Send + Sync>;

// ---------------------------------------------------------------------------
// DomainPattern
// ---------------------------------------------------------------------------

/// A single parsed domain pattern.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DomainPattern {
    /// Matches one capability name exactly.
    Exact(String),
    /// `prefix.*`: matches every capability whose namespace equals `prefix`.
    Namespace(String),
    /// Bare `*`: matches every capability.
    Any,
}

impl DomainPattern {
    /// Parse and validate a pattern string.
    ///
    /// # Errors
    /// `FilterError::InvalidPattern` when the pattern is empty, has an empty
    /// dot segment, or carries a wildcard anywhere but as the whole final
    /// segment (`*.event`, `event.*.plan`, `event.pl*`).
    pub fn parse(pattern: &str) -> Result<Self, FilterError> {
        if pattern.is_empty() {
            return Err(FilterError::invalid(pattern, "pattern is empty"));
        }
        if pattern == WILDCARD {
            return Ok(Self::Any);
        }

        let segments: Vec<&str> = pattern.split('.').collect();
        let last = segments.len() - 1;
        for (i, segment) in segments.iter().enumerate() {
            if segment.is_empty() {
                return Err(FilterError::invalid(pattern, "empty segment"));
            }
            if segment.contains('*') {
                if i != last {
                    return Err(FilterError::invalid(
                        pattern,
                        "wildcard must be the final segment",
                    ));
                }
                if *segment != WILDCARD {
                    return Err(FilterError::invalid(
                        pattern,
                        "wildcard must replace the whole final segment",
                    ));
                }
            }
        }

        Ok(match pattern.strip_suffix(".*") {
            Some(prefix) => Self::Namespace(prefix.to_string()),
            None => Self::Exact(pattern.to_string()),
        })
    }

    /// Whether this pattern admits `capability`.
    pub fn matches(&self, capability: &str) -> bool {
        match self {
            Self::Exact(name) => name == capability,
            Self::Namespace(prefix) => namespace_of(capability) == Some(prefix.as_str()),
            Self::Any => !capability.is_empty(),
        }
    }
}

/// Namespace prefix of a capability name: everything before the final dot.
///
/// Returns `None` for names without a namespace.
pub fn namespace_of(capability: &str) -> Option<&str> {
    capability.rsplit_once('.').map(|(namespace, _)| namespace)
}

impl fmt::Display for DomainPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(name) => write!(f, "{}", name),
            Self::Namespace(prefix) => write!(f, "{}.{}", prefix, WILDCARD),
            Self::Any => write!(f, "{}", WILDCARD),
        }
    }
}

impl FromStr for DomainPattern {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for DomainPattern {
    type Error = FilterError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DomainPattern> for String {
    fn from(pattern: DomainPattern) -> Self {
        pattern.to_string()
    }
}

// ---------------------------------------------------------------------------
// DomainPatternSet
// ---------------------------------------------------------------------------

/// The set of patterns granted to one actor.
///
/// Set semantics: ordering is irrelevant and duplicates collapse. An empty
/// set admits nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DomainPatternSet {
    patterns: BTreeSet<DomainPattern>,
}

impl DomainPatternSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse every pattern, failing on the first malformed one.
    pub fn parse<I, S>(patterns: I) -> Result<Self, FilterError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        patterns
            .into_iter()
            .map(|p| DomainPattern::parse(p.as_ref()))
            .collect()
    }

    /// Existential match: admitted if any pattern matches.
    pub fn admits(&self, capability: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(capability))
    }

    pub fn insert(&mut self, pattern: DomainPattern) -> bool {
        self.patterns.insert(pattern)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DomainPattern> {
        self.patterns.iter()
    }
}

impl FromIterator<DomainPattern> for DomainPatternSet {
    fn from_iter<T: IntoIterator<Item = DomainPattern>>(iter: T) -> Self {
        Self {
            patterns: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for DomainPatternSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<String> = self.patterns.iter().map(|p| p.to_string()).collect();
        write!(f, "[{}]", joined.join(", "))
    }
}

/// Decide whether `capability_name` is admitted by `patterns`.
///
/// All patterns are validated before matching, so a malformed pattern fails
/// the whole check even when another pattern would have matched.
pub fn is_admitted<I, S>(capability_name: &str, patterns: I) -> Result<bool, FilterError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let set = DomainPatternSet::parse(patterns)?;
    Ok(set.admits(capability_name))
}

// ---------------------------------------------------------------------------
// Tool-definition filtering
// ---------------------------------------------------------------------------

/// Filters JSON tool definitions (as listed by a tool server) by domain.
#[derive(Debug, Clone)]
pub struct DomainToolFilter {
    /// Patterns a tool name must match to be included.
    pub allowed: DomainPatternSet,
}

impl DomainToolFilter {
    pub fn new(allowed: DomainPatternSet) -> Self {
        Self { allowed }
    }

    /// Filter a tool definition by its `"name"` key.
    ///
    /// Definitions without a name are excluded.
    pub fn filter(&self, tool: &Value) -> bool {
        tool.get("name")
            .and_then(|n| n.as_str())
            .map(|name| self.allowed.admits(name))
            .unwrap_or(false)
    }

    /// Keep the admitted definitions, preserving their order.
    pub fn filter_definitions<'a>(&self, tools: &'a [Value]) -> Vec<&'a Value> {
        tools.iter().filter(|t| self.filter(t)).collect()
    }

    /// Convert this filter into a boxed `ToolFilter` function.
    pub fn into_tool_filter(self) -> ToolFilter {
        Box::new(move |tool: &Value| self.filter(tool))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_exact_name_always_admits_itself() {
        let name = "fundraising.compute_budget";
        assert!(is_admitted(name, [name]).unwrap());
        assert!(is_admitted(name, [name, "event.*", "db.query"]).unwrap());
    }

    #[test]
    fn test_namespace_wildcard() {
        assert!(is_admitted("event.plan_meeting", ["event.*"]).unwrap());
        assert!(!is_admitted("event.plan_meeting", ["fundraising.*"]).unwrap());
        // Prefix must equal the whole namespace, not a string prefix of it.
        assert!(!is_admitted("eventful.party", ["event.*"]).unwrap());
        assert!(!is_admitted("event.venue.book", ["event.*"]).unwrap());
        assert!(is_admitted("event.venue.book", ["event.venue.*"]).unwrap());
    }

    #[test]
    fn test_empty_set_admits_nothing() {
        let none: [&str; 0] = [];
        assert!(!is_admitted("event.plan_meeting", none).unwrap());
        assert!(!DomainPatternSet::new().admits("db.query"));
    }

    #[test]
    fn test_concrete_scenario() {
        let patterns = ["event.*", "quality.check"];
        assert!(is_admitted("event.plan_meeting", patterns).unwrap());
        assert!(!is_admitted("fundraising.compute_budget", patterns).unwrap());
    }

    #[test]
    fn test_misplaced_wildcards_are_rejected() {
        for bad in ["*.event", "event.*.plan", "ev*nt.plan", "event.pl*", "**"] {
            let err = DomainPattern::parse(bad).unwrap_err();
            assert!(
                matches!(err, FilterError::InvalidPattern { ref pattern, .. } if pattern == bad),
                "expected InvalidPattern for {bad}"
            );
        }
    }

    #[test]
    fn test_malformed_pattern_fails_whole_check() {
        let result = is_admitted("event.plan_meeting", ["event.*", "*.event"]);
        assert!(matches!(result, Err(FilterError::InvalidPattern { .. })));
    }

    #[test]
    fn test_empty_pattern_and_segments_rejected() {
        assert!(DomainPattern::parse("").is_err());
        assert!(DomainPattern::parse("event..plan").is_err());
        assert!(DomainPattern::parse(".*").is_err());
    }

    #[test]
    fn test_bare_wildcard_admits_everything() {
        assert!(is_admitted("db.query", ["*"]).unwrap());
        assert!(is_admitted("standalone", ["*"]).unwrap());
        assert!(!is_admitted("", ["*"]).unwrap());
    }

    #[test]
    fn test_duplicates_collapse() {
        let set = DomainPatternSet::parse(["event.*", "event.*", "db.query"]).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.to_string(), "[db.query, event.*]");
    }

    #[test]
    fn test_serde_round_trip_validates() {
        let set: DomainPatternSet = serde_json::from_value(json!(["event.*", "db.query"])).unwrap();
        assert!(set.admits("event.plan_event"));

        let bad: Result<DomainPatternSet, _> = serde_json::from_value(json!(["*.event"]));
        assert!(bad.is_err());
    }

    #[test]
    fn test_tool_definition_filter() {
        let filter = DomainToolFilter::new(DomainPatternSet::parse(["quality.*"]).unwrap());
        let tools = vec![
            json!({"name": "quality.check_deliverable"}),
            json!({"name": "event.plan_event"}),
            json!({"description": "nameless"}),
        ];
        let kept = filter.filter_definitions(&tools);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0]["name"], "quality.check_deliverable");

        let boxed = filter.into_tool_filter();
        assert!(boxed(&json!({"name": "quality.create_checklist"})));
    }
}
