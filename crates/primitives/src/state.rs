//! Execution lifecycle states
//!
//! States are stored as uppercase tokens. Caller input is case-insensitive
//! but never trimmed. Known states have their own variant; any other token
//! made of ASCII letters, digits and `_` is kept as [`ExecState::Custom`].
//!
//! Stored tokens are decoded with [`ExecState::from_stored`], which accepts
//! only the exact uppercase form. A state CAS compares against the stored
//! bytes, so a decoded state must render back to exactly those bytes.

use crate::error::{RecordError, RecordResult};
use std::fmt;
use std::str::FromStr;

/// Lifecycle state of a workflow execution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ExecState {
    /// Initial state of every execution
    Requested,
    /// Waiting for a worker
    Queued,
    /// In progress
    Running,
    /// Finished successfully
    Completed,
    /// Finished with an error
    Failed,
    /// Stopped on request
    Cancelled,
    /// Exceeded its time budget
    TimedOut,
    /// Any other token, uppercase
    Custom(String),
}

impl ExecState {
    /// Normalize a caller-supplied token.
    ///
    /// Whitespace is not stripped: `" running "` is an invalid state.
    pub fn parse(token: &str) -> RecordResult<Self> {
        if !is_token(token) {
            return Err(RecordError::InvalidState(token.to_string()));
        }
        Ok(Self::from_upper(token.to_ascii_uppercase()))
    }

    /// Decode a token read back from the store.
    ///
    /// Returns `None` unless the token is already in stored form, so that
    /// `as_str()` of the result equals `token` byte for byte.
    pub fn from_stored(token: &str) -> Option<Self> {
        if !is_token(token) || token.bytes().any(|b| b.is_ascii_lowercase()) {
            return None;
        }
        Some(Self::from_upper(token.to_string()))
    }

    fn from_upper(upper: String) -> Self {
        match upper.as_str() {
            "REQUESTED" => ExecState::Requested,
            "QUEUED" => ExecState::Queued,
            "RUNNING" => ExecState::Running,
            "COMPLETED" => ExecState::Completed,
            "FAILED" => ExecState::Failed,
            "CANCELLED" => ExecState::Cancelled,
            "TIMED_OUT" => ExecState::TimedOut,
            _ => ExecState::Custom(upper),
        }
    }

    /// Stored token
    pub fn as_str(&self) -> &str {
        match self {
            ExecState::Requested => "REQUESTED",
            ExecState::Queued => "QUEUED",
            ExecState::Running => "RUNNING",
            ExecState::Completed => "COMPLETED",
            ExecState::Failed => "FAILED",
            ExecState::Cancelled => "CANCELLED",
            ExecState::TimedOut => "TIMED_OUT",
            ExecState::Custom(token) => token,
        }
    }
}

fn is_token(token: &str) -> bool {
    !token.is_empty()
        && token
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

impl fmt::Display for ExecState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExecState {
    type Err = RecordError;

    fn from_str(s: &str) -> RecordResult<Self> {
        ExecState::parse(s)
    }
}

impl PartialEq<str> for ExecState {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for ExecState {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}
