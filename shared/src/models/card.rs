//! Route Card Model

use serde::{Deserialize, Serialize};

use super::attachment::Attachment;
use super::log_entry::LogEntry;
use super::route_operation::RouteOperation;
use super::serde_helpers as lenient;
use super::status::CardStatus;

/// Name given to a card submitted without one
pub const DEFAULT_CARD_NAME: &str = "Card";

/// Route card: a batch of parts and the ordered operations it passes through
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Card {
    #[serde(deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(deserialize_with = "lenient::string")]
    pub order_no: String,
    #[serde(deserialize_with = "lenient::string")]
    pub contract_number: String,
    #[serde(deserialize_with = "lenient::string")]
    pub drawing: String,
    #[serde(deserialize_with = "lenient::string")]
    pub material: String,
    #[serde(deserialize_with = "lenient::string")]
    pub desc: String,
    /// Planned unit count
    #[serde(deserialize_with = "lenient::opt_count")]
    pub quantity: Option<u32>,
    /// EAN-13, unique across all cards
    #[serde(deserialize_with = "lenient::string")]
    pub barcode: String,
    /// Derived from `operations`; never set directly
    pub status: CardStatus,
    #[serde(deserialize_with = "lenient::truthy")]
    pub archived: bool,
    /// Set once at first persistence
    #[serde(deserialize_with = "lenient::opt_millis")]
    pub created_at: Option<i64>,
    /// Log-free copy of the card as first created; set once
    #[serde(deserialize_with = "lenient::opt_boxed")]
    pub initial_snapshot: Option<Box<Card>>,
    #[serde(deserialize_with = "lenient::vec_or_empty")]
    pub logs: Vec<LogEntry>,
    #[serde(deserialize_with = "lenient::vec_or_empty")]
    pub operations: Vec<RouteOperation>,
    #[serde(deserialize_with = "lenient::vec_or_empty")]
    pub attachments: Vec<Attachment>,
}

impl Card {
    pub fn operation(&self, op_id: &str) -> Option<&RouteOperation> {
        self.operations.iter().find(|op| op.id == op_id)
    }

    pub fn operation_mut(&mut self, op_id: &str) -> Option<&mut RouteOperation> {
        self.operations.iter_mut().find(|op| op.id == op_id)
    }

    /// Deep, log-free copy of this card used as the initial snapshot
    pub fn snapshot(&self) -> Card {
        Card {
            logs: Vec::new(),
            initial_snapshot: None,
            ..self.clone()
        }
    }

    /// Label used as the `object` of card-scoped log entries
    pub fn label(&self) -> String {
        if self.name.is_empty() {
            self.barcode.clone()
        } else {
            self.name.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OperationStatus;

    #[test]
    fn test_card_from_sparse_payload() {
        let card: Card = serde_json::from_value(serde_json::json!({
            "id": "card_1",
            "quantity": "10",
            "archived": null,
            "logs": null,
            "operations": [{"id": "rop_1", "status": "DONE"}]
        }))
        .unwrap();
        assert_eq!(card.quantity, Some(10));
        assert!(!card.archived);
        assert!(card.logs.is_empty());
        assert!(card.attachments.is_empty());
        assert_eq!(card.operations[0].status, OperationStatus::Done);
    }

    #[test]
    fn test_garbage_snapshot_is_dropped() {
        let card: Card = serde_json::from_value(serde_json::json!({
            "id": "card_1",
            "initialSnapshot": "not an object"
        }))
        .unwrap();
        assert!(card.initial_snapshot.is_none());
    }

    #[test]
    fn test_snapshot_is_log_free() {
        let mut card = Card {
            id: "card_1".into(),
            name: "Shaft".into(),
            ..Default::default()
        };
        card.logs.push(LogEntry::default());
        card.initial_snapshot = Some(Box::new(card.clone()));

        let snap = card.snapshot();
        assert!(snap.logs.is_empty());
        assert!(snap.initial_snapshot.is_none());
        assert_eq!(snap.name, "Shaft");
    }

    #[test]
    fn test_wire_format_is_camel_case() {
        let card = Card {
            order_no: "Z-1".into(),
            ..Default::default()
        };
        let json = serde_json::to_value(&card).unwrap();
        assert_eq!(json["orderNo"], "Z-1");
        assert_eq!(json["status"], "NOT_STARTED");
        assert!(json.get("initialSnapshot").is_some());
    }
}
