//! Timeout-guarded operator input.
//!
//! `TimeoutInputGate` races an input channel against a timer. If the
//! operator answers first the answer is returned; if the timer fires first
//! the caller's fallback is returned, one notice is emitted, and the pending
//! read is abandoned. Expiry is an outcome, never an error: the only error
//! is the channel's own I/O failure, which is reported as-is and not retried.

use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::input_channel::{InputChannel, StdinInputChannel};
use super::notices::{ConsoleNotices, NoticeSink};
use crate::utilities::errors::GateError;

// ---------------------------------------------------------------------------
// Request lifecycle
// ---------------------------------------------------------------------------

/// Lifecycle of a single input request.
///
/// Starts in `Waiting` and moves to exactly one terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Waiting,
    /// The operator supplied a value.
    ResolvedValue,
    /// The deadline passed and the fallback was used.
    ResolvedFallback,
    /// The input channel failed.
    Failed,
}

impl GateState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Waiting)
    }
}

/// How a request was resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Supplied by the operator.
    Value(String),
    /// Substituted after the deadline.
    Fallback(String),
}

impl Resolution {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }

    pub fn into_inner(self) -> String {
        match self {
            Self::Value(v) | Self::Fallback(v) => v,
        }
    }
}

/// A request for operator input that has not been resolved yet.
///
/// Transient: created per call and dropped once it reaches a terminal state.
#[derive(Debug)]
pub struct PendingInputRequest {
    pub id: Uuid,
    pub prompt: String,
    pub issued_at: DateTime<Utc>,
    pub deadline: DateTime<Utc>,
    state: GateState,
}

impl PendingInputRequest {
    pub fn new(prompt: &str, timeout: Duration) -> Self {
        let issued_at = Utc::now();
        let deadline = chrono::Duration::from_std(timeout)
            .ok()
            .and_then(|d| issued_at.checked_add_signed(d))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self {
            id: Uuid::new_v4(),
            prompt: prompt.to_string(),
            issued_at,
            deadline,
            state: GateState::Waiting,
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    /// Move to a terminal state.
    ///
    /// Returns `false` (and leaves the state alone) if the request is already
    /// terminal or `next` is not terminal.
    pub fn transition(&mut self, next: GateState) -> bool {
        if self.state.is_terminal() || !next.is_terminal() {
            return false;
        }
        self.state = next;
        true
    }
}

// ---------------------------------------------------------------------------
// Smart fallback values
// ---------------------------------------------------------------------------

/// One keyword rule for picking a fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultRule {
    pub keywords: Vec<String>,
    pub response: String,
}

/// Fallback values chosen by keywords found in the prompt.
///
/// Rules are checked in order; the first whose keyword appears in the
/// lowercased prompt wins. Otherwise `general` is used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultResponses {
    pub rules: Vec<DefaultRule>,
    pub general: String,
}

impl Default for DefaultResponses {
    fn default() -> Self {
        let rule = |keywords: &[&str], response: &str| DefaultRule {
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            response: response.to_string(),
        };
        Self {
            rules: vec![
                rule(&["name"], "Anonymous User"),
                rule(&["color"], "Blue"),
                rule(&["age"], "25"),
                rule(&["preference", "like"], "No preference"),
            ],
            general: "Default response".to_string(),
        }
    }
}

impl DefaultResponses {
    /// The fallback for `prompt`.
    pub fn fallback_for(&self, prompt: &str) -> &str {
        let prompt = prompt.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.keywords.iter().any(|k| prompt.contains(k.as_str())))
            .map(|rule| rule.response.as_str())
            .unwrap_or(&self.general)
    }

    /// Overlay configured `keyword -> response` entries.
    ///
    /// `general` replaces the catch-all; a keyword already present in a rule
    /// replaces that rule's response; anything else becomes a new rule
    /// checked after the existing ones.
    pub fn with_overrides(mut self, overrides: &BTreeMap<String, String>) -> Self {
        for (keyword, response) in overrides {
            let keyword = keyword.to_lowercase();
            if keyword == "general" {
                self.general = response.clone();
                continue;
            }
            match self
                .rules
                .iter_mut()
                .find(|rule| rule.keywords.contains(&keyword))
            {
                Some(rule) => rule.response = response.clone(),
                None => self.rules.push(DefaultRule {
                    keywords: vec![keyword],
                    response: response.clone(),
                }),
            }
        }
        self
    }
}

// ---------------------------------------------------------------------------
// TimeoutInputGate
// ---------------------------------------------------------------------------

/// Races an input channel against a deadline.
#[derive(Clone)]
pub struct TimeoutInputGate {
    channel: Arc<dyn InputChannel>,
    notices: Arc<dyn NoticeSink>,
}

impl fmt::Debug for TimeoutInputGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimeoutInputGate").finish_non_exhaustive()
    }
}

enum Race {
    Read(io::Result<String>),
    Expired,
}

impl TimeoutInputGate {
    pub fn new(channel: Arc<dyn InputChannel>, notices: Arc<dyn NoticeSink>) -> Self {
        Self { channel, notices }
    }

    /// Gate reading from stdin and printing notices to the console.
    pub fn console() -> Self {
        Self::new(Arc::new(StdinInputChannel::new()), Arc::new(ConsoleNotices::default()))
    }

    /// Ask for a value, returning `fallback` if none arrives within `timeout`.
    pub async fn request_input(
        &self,
        prompt: &str,
        timeout: Duration,
        fallback: impl Into<String>,
    ) -> Result<String, GateError> {
        self.request(prompt, timeout, fallback)
            .await
            .map(Resolution::into_inner)
    }

    /// Like `request_input`, picking the fallback from `defaults`.
    pub async fn request_with_defaults(
        &self,
        prompt: &str,
        timeout: Duration,
        defaults: &DefaultResponses,
    ) -> Result<String, GateError> {
        self.request_input(prompt, timeout, defaults.fallback_for(prompt))
            .await
    }

    /// Ask for a value and report how it was resolved.
    pub async fn request(
        &self,
        prompt: &str,
        timeout: Duration,
        fallback: impl Into<String>,
    ) -> Result<Resolution, GateError> {
        let mut pending = PendingInputRequest::new(prompt, timeout);
        tracing::debug!(
            request_id = %pending.id,
            timeout_ms = timeout.as_millis() as u64,
            "awaiting operator input"
        );

        // Biased so a value that is ready alongside the timer still wins.
        let race = tokio::select! {
            biased;
            read = self.channel.read_value(prompt) => Race::Read(read),
            _ = tokio::time::sleep(timeout) => Race::Expired,
        };

        match race {
            Race::Read(Ok(value)) => {
                let moved = pending.transition(GateState::ResolvedValue);
                debug_assert!(moved);
                tracing::debug!(
                    request_id = %pending.id,
                    state = ?pending.state(),
                    "operator input received"
                );
                Ok(Resolution::Value(value))
            }
            Race::Read(Err(e)) => {
                let moved = pending.transition(GateState::Failed);
                debug_assert!(moved);
                tracing::warn!(
                    request_id = %pending.id,
                    state = ?pending.state(),
                    error = %e,
                    "input channel failed"
                );
                Err(GateError::InputChannelFailure(e))
            }
            Race::Expired => {
                let moved = pending.transition(GateState::ResolvedFallback);
                debug_assert!(moved);
                let fallback = fallback.into();
                tracing::info!(
                    request_id = %pending.id,
                    state = ?pending.state(),
                    deadline = %pending.deadline,
                    "input deadline passed, using fallback"
                );
                self.notices.notice(&format!(
                    "timeout — using default: {} (no answer within {:?})",
                    fallback, timeout
                ));
                Ok(Resolution::Fallback(fallback))
            }
        }
    }
}
