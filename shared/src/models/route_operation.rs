//! Route Operation Model

use serde::{Deserialize, Serialize};

use super::catalog::{Operation, WorkCenter};
use super::serde_helpers as lenient;
use super::status::OperationStatus;
use crate::util::gen_id;

/// Planned minutes used when neither the caller nor the catalog supplies one
pub const DEFAULT_PLANNED_MINUTES: u32 = 30;

/// Maximum number of supplementary executors on one operation
pub const MAX_ADDITIONAL_EXECUTORS: usize = 2;

/// One step of a card's route
///
/// `op_code`, `op_name`, `center_name` are denormalized copies so that
/// deleting a catalog entry keeps the history readable.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RouteOperation {
    #[serde(deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(deserialize_with = "lenient::string")]
    pub op_id: String,
    #[serde(deserialize_with = "lenient::string")]
    pub op_code: String,
    #[serde(deserialize_with = "lenient::string")]
    pub op_name: String,
    #[serde(deserialize_with = "lenient::string")]
    pub center_id: String,
    #[serde(deserialize_with = "lenient::string")]
    pub center_name: String,
    #[serde(deserialize_with = "lenient::string")]
    pub executor: String,
    #[serde(deserialize_with = "lenient::string_list")]
    pub additional_executors: Vec<String>,
    #[serde(deserialize_with = "lenient::count")]
    pub planned_minutes: u32,
    /// Operation-level override of the card quantity
    #[serde(deserialize_with = "lenient::opt_count")]
    pub quantity: Option<u32>,
    #[serde(deserialize_with = "lenient::int")]
    pub order: i64,
    pub status: OperationStatus,
    #[serde(deserialize_with = "lenient::opt_millis")]
    pub first_started_at: Option<i64>,
    #[serde(deserialize_with = "lenient::opt_millis")]
    pub started_at: Option<i64>,
    #[serde(deserialize_with = "lenient::opt_millis")]
    pub last_paused_at: Option<i64>,
    #[serde(deserialize_with = "lenient::opt_millis")]
    pub finished_at: Option<i64>,
    /// Checkpointed work time, updated only on transitions
    #[serde(deserialize_with = "lenient::opt_seconds")]
    pub elapsed_seconds: Option<f64>,
    /// Total frozen at completion
    #[serde(deserialize_with = "lenient::opt_seconds")]
    pub actual_seconds: Option<f64>,
    #[serde(deserialize_with = "lenient::count")]
    pub good_count: u32,
    #[serde(deserialize_with = "lenient::count")]
    pub scrap_count: u32,
    #[serde(deserialize_with = "lenient::count")]
    pub hold_count: u32,
    #[serde(deserialize_with = "lenient::string")]
    pub comment: String,
    /// `op_code` is a machine-assigned step code
    #[serde(deserialize_with = "lenient::truthy")]
    pub auto_code: bool,
}

impl RouteOperation {
    /// Build a fresh, not-started route operation from catalog references.
    ///
    /// `planned_minutes` falls back to the catalog `rec_time`, then to
    /// [`DEFAULT_PLANNED_MINUTES`]. A blank code is left for the identifier
    /// registry to fill on the next save.
    #[allow(clippy::too_many_arguments)]
    pub fn from_refs(
        op: &Operation,
        center: &WorkCenter,
        executor: impl Into<String>,
        planned_minutes: Option<u32>,
        order: i64,
        quantity: Option<u32>,
        auto_code: bool,
        code: Option<String>,
    ) -> Self {
        let planned_minutes = planned_minutes
            .filter(|m| *m > 0)
            .or(Some(op.rec_time).filter(|m| *m > 0))
            .unwrap_or(DEFAULT_PLANNED_MINUTES);
        Self {
            id: gen_id("rop"),
            op_id: op.id.clone(),
            op_code: code.filter(|c| !c.is_empty()).unwrap_or_else(|| op.code.clone()),
            op_name: op.name.clone(),
            center_id: center.id.clone(),
            center_name: center.name.clone(),
            executor: executor.into(),
            planned_minutes,
            quantity,
            order: if order > 0 { order } else { 1 },
            auto_code,
            elapsed_seconds: Some(0.0),
            ..Default::default()
        }
    }

    /// Planned quantity for this operation: its own override, else the card's
    pub fn effective_quantity(&self, card_quantity: Option<u32>) -> Option<u32> {
        self.quantity.or(card_quantity)
    }

    /// `good + scrap + hold`
    pub fn counted_total(&self) -> u64 {
        self.good_count as u64 + self.scrap_count as u64 + self.hold_count as u64
    }

    /// Display label used in the audit log: `[code] name`
    pub fn label(&self) -> String {
        format!("[{}] {}", self.op_code, self.op_name)
    }

    /// Reset runtime state to a never-started operation
    pub fn reset_progress(&mut self) {
        self.status = OperationStatus::NotStarted;
        self.first_started_at = None;
        self.started_at = None;
        self.last_paused_at = None;
        self.finished_at = None;
        self.elapsed_seconds = Some(0.0);
        self.actual_seconds = None;
        self.good_count = 0;
        self.scrap_count = 0;
        self.hold_count = 0;
        self.comment.clear();
    }
}
