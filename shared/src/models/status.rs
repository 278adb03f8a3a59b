//! Operation and card status enums

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Route operation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationStatus {
    #[default]
    NotStarted,
    InProgress,
    Paused,
    Done,
}

impl OperationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "NOT_STARTED",
            Self::InProgress => "IN_PROGRESS",
            Self::Paused => "PAUSED",
            Self::Done => "DONE",
        }
    }

    /// Unknown values fall back to `NOT_STARTED`
    pub fn parse_lenient(s: &str) -> Self {
        match s {
            "IN_PROGRESS" => Self::InProgress,
            "PAUSED" => Self::Paused,
            "DONE" => Self::Done,
            _ => Self::NotStarted,
        }
    }

    /// Running or paused
    pub fn is_active(&self) -> bool {
        matches!(self, Self::InProgress | Self::Paused)
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for OperationStatus {
    fn deserialize<D>(d: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<Value>::deserialize(d).map(|v| match v {
            Some(Value::String(s)) => Self::parse_lenient(&s),
            _ => Self::default(),
        })
    }
}

/// Persisted card status, always derived from its operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CardStatus {
    #[default]
    NotStarted,
    InProgress,
    Done,
}

impl CardStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "NOT_STARTED",
            Self::InProgress => "IN_PROGRESS",
            Self::Done => "DONE",
        }
    }
}

impl fmt::Display for CardStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CardStatus {
    fn deserialize<D>(d: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<Value>::deserialize(d).map(|v| match v.as_ref().and_then(Value::as_str) {
            Some("IN_PROGRESS") => Self::InProgress,
            Some("DONE") => Self::Done,
            _ => Self::NotStarted,
        })
    }
}

/// Presentation-only classification, recomputed on every read and never stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessState {
    NotStarted,
    InProgress,
    Paused,
    Mixed,
    Done,
}
