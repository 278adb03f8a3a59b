//! 与已存数据集合并
//!
//! `created_at` 与 `initial_snapshot` 一旦落库便不可变：
//! 已存在的卡片总是沿用存储中的值，请求里的值被丢弃。

use shared::models::{Card, Dataset};
use std::collections::HashMap;

/// 合并单张卡片
///
/// - 存储中有同 id 卡片且有值：沿用存储值
/// - 否则 `created_at` 取请求值，缺失时为 `now`
/// - 否则初始快照取请求值，缺失时由当前卡片生成（不含日志）
pub fn merge_card(stored: Option<&Card>, incoming: &mut Card, now: i64) {
    match stored.and_then(|c| c.created_at) {
        Some(created_at) => incoming.created_at = Some(created_at),
        None => {
            if incoming.created_at.is_none() {
                incoming.created_at = Some(now);
            }
        }
    }

    match stored.and_then(|c| c.initial_snapshot.as_ref()) {
        Some(snapshot) => incoming.initial_snapshot = Some(snapshot.clone()),
        None => {
            if incoming.initial_snapshot.is_none() {
                incoming.initial_snapshot = Some(Box::new(incoming.snapshot()));
            }
        }
    }
}

/// 以请求数据集为准整体替换，逐卡保留不可变字段
pub fn merge_dataset(stored: &Dataset, incoming: &mut Dataset, now: i64) {
    let by_id: HashMap<&str, &Card> = stored.cards.iter().map(|c| (c.id.as_str(), c)).collect();
    for card in incoming.cards.iter_mut() {
        merge_card(by_id.get(card.id.as_str()).copied(), card, now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000_000;

    #[test]
    fn test_new_card_gets_snapshot_and_timestamp() {
        let mut card = Card {
            id: "card_1".into(),
            name: "Shaft".into(),
            logs: vec![Default::default()],
            ..Default::default()
        };
        merge_card(None, &mut card, NOW);
        assert_eq!(card.created_at, Some(NOW));
        let snapshot = card.initial_snapshot.as_deref().unwrap();
        assert_eq!(snapshot.name, "Shaft");
        assert!(snapshot.logs.is_empty());
        assert!(snapshot.initial_snapshot.is_none());
    }

    #[test]
    fn test_new_card_keeps_own_values() {
        let mut card = Card {
            created_at: Some(5),
            initial_snapshot: Some(Box::new(Card {
                name: "first".into(),
                ..Default::default()
            })),
            ..Default::default()
        };
        merge_card(None, &mut card, NOW);
        assert_eq!(card.created_at, Some(5));
        assert_eq!(card.initial_snapshot.unwrap().name, "first");
    }

    #[test]
    fn test_stored_values_win() {
        let stored = Card {
            id: "card_1".into(),
            created_at: Some(100),
            initial_snapshot: Some(Box::new(Card {
                name: "original".into(),
                ..Default::default()
            })),
            ..Default::default()
        };
        let mut incoming = Card {
            id: "card_1".into(),
            name: "renamed".into(),
            created_at: Some(999),
            initial_snapshot: Some(Box::new(Card {
                name: "forged".into(),
                ..Default::default()
            })),
            ..Default::default()
        };
        merge_card(Some(&stored), &mut incoming, NOW);
        assert_eq!(incoming.created_at, Some(100));
        assert_eq!(incoming.initial_snapshot.unwrap().name, "original");
        assert_eq!(incoming.name, "renamed");
    }

    #[test]
    fn test_stored_card_without_snapshot_gets_one() {
        let stored = Card {
            id: "card_1".into(),
            ..Default::default()
        };
        let mut incoming = Card {
            id: "card_1".into(),
            name: "legacy".into(),
            ..Default::default()
        };
        merge_card(Some(&stored), &mut incoming, NOW);
        assert_eq!(incoming.created_at, Some(NOW));
        assert_eq!(incoming.initial_snapshot.unwrap().name, "legacy");
    }

    #[test]
    fn test_dataset_merge_by_id() {
        let stored = Dataset {
            cards: vec![Card {
                id: "a".into(),
                created_at: Some(1),
                ..Default::default()
            }],
            ..Default::default()
        };
        let mut incoming = Dataset {
            cards: vec![
                Card {
                    id: "b".into(),
                    ..Default::default()
                },
                Card {
                    id: "a".into(),
                    created_at: Some(2),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        merge_dataset(&stored, &mut incoming, NOW);
        assert_eq!(incoming.cards[0].created_at, Some(NOW));
        assert_eq!(incoming.cards[1].created_at, Some(1));
    }
}
