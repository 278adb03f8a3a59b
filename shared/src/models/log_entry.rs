//! Audit Log Entry Model

use serde::{Deserialize, Serialize};

use super::serde_helpers as lenient;

/// One immutable entry of a card's append-only log
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LogEntry {
    #[serde(deserialize_with = "lenient::string")]
    pub id: String,
    /// Epoch milliseconds of the mutation
    #[serde(deserialize_with = "lenient::int")]
    pub ts: i64,
    #[serde(deserialize_with = "lenient::string")]
    pub action: String,
    /// Label of the affected card or operation
    #[serde(deserialize_with = "lenient::string")]
    pub object: String,
    /// Machine field name
    #[serde(deserialize_with = "lenient::opt_string")]
    pub field: Option<String>,
    /// Route operation id the entry is scoped to
    #[serde(deserialize_with = "lenient::opt_string")]
    pub target_id: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub old_value: String,
    #[serde(deserialize_with = "lenient::string")]
    pub new_value: String,
}

impl LogEntry {
    pub fn is_for(&self, target_id: &str, field: &str) -> bool {
        self.target_id.as_deref() == Some(target_id) && self.field.as_deref() == Some(field)
    }
}
