//! 卡片级操作：创建、复制、归档、保存编辑

use shared::models::{Card, CardStatus};
use shared::util::gen_id;
use std::collections::HashSet;

use super::status::recalc_status;
use crate::audit::{LogChange, actions, append_logs, diff, record_log};
use crate::registry::{RegistryResult, is_valid_ean13, unique_barcode};

/// 复制卡片名称后缀
pub const COPY_SUFFIX: &str = " (copy)";

fn ensure_barcode(card: &mut Card, taken: &HashSet<String>) -> RegistryResult<()> {
    if !is_valid_ean13(&card.barcode) || taken.contains(&card.barcode) {
        card.barcode = unique_barcode(taken)?;
    }
    Ok(())
}

/// 由草稿创建新卡片
///
/// 分配 id / 条码，设置 `created_at` 和初始快照，
/// 然后记录一条 "card created"。草稿自带的日志被丢弃。
pub fn create_card(mut draft: Card, taken: &HashSet<String>, now: i64) -> RegistryResult<Card> {
    if draft.id.is_empty() {
        draft.id = gen_id("card");
    }
    ensure_barcode(&mut draft, taken)?;
    for op in draft.operations.iter_mut().filter(|op| op.id.is_empty()) {
        op.id = gen_id("rop");
    }
    draft.logs.clear();
    draft.created_at = Some(now);
    recalc_status(&mut draft);
    draft.initial_snapshot = Some(Box::new(draft.snapshot()));

    let label = draft.label();
    record_log(
        &mut draft,
        LogChange::card(actions::CARD_CREATED, None, "", label),
        now,
    );
    Ok(draft)
}

/// 复制卡片
///
/// 新 id（卡片、工序、附件）、新条码、名称加后缀；工序进度清零，
/// 日志清空，重新设置 `created_at` 与初始快照，最后记录 "card copied"
/// (旧条码 → 新条码)。
pub fn duplicate_card(source: &Card, taken: &HashSet<String>, now: i64) -> RegistryResult<Card> {
    let mut copy = source.snapshot();
    copy.id = gen_id("card");
    copy.barcode = unique_barcode(taken)?;
    copy.name = format!("{}{}", source.name, COPY_SUFFIX);
    copy.archived = false;
    copy.created_at = Some(now);

    for attachment in copy.attachments.iter_mut() {
        attachment.id = gen_id("file");
        attachment.created_at = Some(now);
    }
    for (idx, op) in copy.operations.iter_mut().enumerate() {
        op.id = gen_id("rop");
        op.reset_progress();
        if op.order <= 0 {
            op.order = idx as i64 + 1;
        }
    }

    copy.status = CardStatus::NotStarted;
    recalc_status(&mut copy);
    copy.initial_snapshot = Some(Box::new(copy.snapshot()));

    let new_barcode = copy.barcode.clone();
    record_log(
        &mut copy,
        LogChange::card(actions::CARD_COPIED, None, source.barcode.as_str(), new_barcode),
        now,
    );
    Ok(copy)
}

/// 归档；已归档时不做任何事，返回是否发生变化
pub fn archive_card(card: &mut Card, now: i64) -> bool {
    if card.archived {
        return false;
    }
    card.archived = true;
    record_log(
        card,
        LogChange::card(actions::ARCHIVE, Some("archived"), "false", "true"),
        now,
    );
    true
}

/// 用编辑后的草稿覆盖已存卡片
///
/// 日志以存储版本为准（草稿不能改写历史），
/// `created_at` 与初始快照保持不变，变更由 [`diff`] 推导后一次性追加。
pub fn save_card_edit(stored: &Card, mut draft: Card, now: i64) -> Card {
    draft.id = stored.id.clone();
    draft.logs = stored.logs.clone();
    draft.created_at = stored.created_at;
    draft.initial_snapshot = stored.initial_snapshot.clone();
    for op in draft.operations.iter_mut().filter(|op| op.id.is_empty()) {
        op.id = gen_id("rop");
    }
    recalc_status(&mut draft);

    let changes = diff(stored, &draft);
    append_logs(&mut draft, changes, now);
    draft
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{Transition, run_transition};
    use shared::models::{Attachment, OperationStatus, RouteOperation};

    const NOW: i64 = 1_700_000_000_000;

    fn draft() -> Card {
        Card {
            name: "Shaft".into(),
            quantity: Some(4),
            operations: vec![RouteOperation {
                op_code: "OP-0001".into(),
                op_name: "Turning".into(),
                executor: "Ivanov".into(),
                order: 1,
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_create_card() {
        let card = create_card(draft(), &HashSet::new(), NOW).unwrap();
        assert!(card.id.starts_with("card_"));
        assert!(is_valid_ean13(&card.barcode));
        assert!(!card.operations[0].id.is_empty());
        assert_eq!(card.created_at, Some(NOW));

        let snapshot = card.initial_snapshot.as_deref().unwrap();
        assert!(snapshot.logs.is_empty());
        assert_eq!(snapshot.name, "Shaft");

        assert_eq!(card.logs.len(), 1);
        assert_eq!(card.logs[0].action, actions::CARD_CREATED);
        assert_eq!(card.logs[0].new_value, "Shaft");
    }

    #[test]
    fn test_create_card_replaces_taken_barcode() {
        let mut d = draft();
        d.barcode = "4006381333931".into();
        let taken: HashSet<String> = ["4006381333931".to_string()].into();
        let card = create_card(d, &taken, NOW).unwrap();
        assert_ne!(card.barcode, "4006381333931");
        assert!(is_valid_ean13(&card.barcode));
    }

    #[test]
    fn test_duplicate_card_resets_progress() {
        let mut source = create_card(draft(), &HashSet::new(), NOW).unwrap();
        let op_id = source.operations[0].id.clone();
        source.operations[0].good_count = 4;
        source.operations[0].comment = "done early".into();
        source.attachments.push(Attachment {
            id: "file_1".into(),
            name: "drawing.pdf".into(),
            ..Default::default()
        });
        source.archived = true;
        run_transition(&mut source, &op_id, Transition::Start, NOW).unwrap();
        run_transition(&mut source, &op_id, Transition::Stop, NOW + 5_000).unwrap();

        let taken: HashSet<String> = [source.barcode.clone()].into();
        let copy = duplicate_card(&source, &taken, NOW + 10_000).unwrap();

        assert_ne!(copy.id, source.id);
        assert_ne!(copy.barcode, source.barcode);
        assert!(is_valid_ean13(&copy.barcode));
        assert_eq!(copy.name, "Shaft (copy)");
        assert!(!copy.archived);
        assert_eq!(copy.status, CardStatus::NotStarted);
        assert_eq!(copy.created_at, Some(NOW + 10_000));

        let op = &copy.operations[0];
        assert_ne!(op.id, op_id);
        assert_eq!(op.status, OperationStatus::NotStarted);
        assert_eq!(op.good_count, 0);
        assert!(op.comment.is_empty());
        assert!(op.actual_seconds.is_none());
        assert_eq!(op.executor, "Ivanov");
        assert_ne!(copy.attachments[0].id, "file_1");

        assert_eq!(copy.logs.len(), 1);
        assert_eq!(copy.logs[0].action, actions::CARD_COPIED);
        assert_eq!(copy.logs[0].old_value, source.barcode);
        assert_eq!(copy.logs[0].new_value, copy.barcode);
        assert!(copy.initial_snapshot.as_deref().unwrap().logs.is_empty());
    }

    #[test]
    fn test_archive_logs_once() {
        let mut card = create_card(draft(), &HashSet::new(), NOW).unwrap();
        assert!(archive_card(&mut card, NOW + 1));
        assert!(!archive_card(&mut card, NOW + 2));
        let archive_logs: Vec<_> = card
            .logs
            .iter()
            .filter(|e| e.action == actions::ARCHIVE)
            .collect();
        assert_eq!(archive_logs.len(), 1);
        assert_eq!(archive_logs[0].old_value, "false");
        assert_eq!(archive_logs[0].new_value, "true");
    }

    #[test]
    fn test_save_edit_keeps_history() {
        let stored = create_card(draft(), &HashSet::new(), NOW).unwrap();
        let mut edited = stored.clone();
        edited.name = "Gear".into();
        edited.logs.clear();
        edited.created_at = Some(0);
        edited.initial_snapshot = None;

        let saved = save_card_edit(&stored, edited, NOW + 1_000);
        assert_eq!(saved.created_at, stored.created_at);
        assert_eq!(saved.initial_snapshot, stored.initial_snapshot);
        assert_eq!(saved.logs.len(), 2);
        assert_eq!(saved.logs[1].field.as_deref(), Some("name"));
        assert_eq!(saved.logs[1].old_value, "Shaft");
        assert_eq!(saved.logs[1].new_value, "Gear");
        assert_eq!(saved.logs[1].ts, NOW + 1_000);
    }
}
