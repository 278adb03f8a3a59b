//! Dataset Model

use serde::{Deserialize, Serialize};

use super::card::Card;
use super::catalog::{Operation, WorkCenter};
use super::serde_helpers as lenient;

/// The single shared dataset: cards, operation catalog and work centers
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Dataset {
    #[serde(deserialize_with = "lenient::vec_or_empty")]
    pub cards: Vec<Card>,
    #[serde(deserialize_with = "lenient::vec_or_empty")]
    pub ops: Vec<Operation>,
    #[serde(deserialize_with = "lenient::vec_or_empty")]
    pub centers: Vec<WorkCenter>,
}

impl Dataset {
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty() && self.ops.is_empty() && self.centers.is_empty()
    }

    pub fn card(&self, id: &str) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == id)
    }

    pub fn card_mut(&mut self, id: &str) -> Option<&mut Card> {
        self.cards.iter_mut().find(|c| c.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_collections_default_to_empty() {
        let data: Dataset = serde_json::from_str(r#"{"cards": null}"#).unwrap();
        assert!(data.is_empty());
    }
}
