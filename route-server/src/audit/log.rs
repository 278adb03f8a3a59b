//! 日志条目构造与追加

use shared::models::{Card, LogEntry, RouteOperation};
use shared::util::gen_id;

/// `action` 标签
pub mod actions {
    pub const FIELD_CHANGE: &str = "field change";
    pub const CARD_STATUS: &str = "card status";
    pub const ARCHIVE: &str = "archive";
    pub const ATTACHMENTS: &str = "attachments";
    pub const OPERATION_ADDED: &str = "operation added";
    pub const OPERATION_CHANGED: &str = "operation changed";
    pub const OPERATION_REMOVED: &str = "operation removed";
    pub const EXECUTOR: &str = "executor";
    pub const PLANNED_TIME: &str = "planned time";
    pub const OPERATION_ORDER: &str = "operation order";
    pub const OPERATION_STATUS: &str = "operation status";
    pub const ACTUAL_TIME: &str = "actual time";
    pub const COMMENT: &str = "comment";
    pub const ADDITIONAL_EXECUTOR: &str = "additional executor";
    pub const PART_COUNT: &str = "part count";
    pub const CARD_CREATED: &str = "card created";
    pub const CARD_COPIED: &str = "card copied";
}

/// 卡片级条目的 `object`
pub const CARD_OBJECT: &str = "Card";

/// 工序标签为空时的 `object`
const OPERATION_OBJECT: &str = "Operation";

/// 尚未追加的日志变更
///
/// 生命周期引擎和 diff 只产出 `LogChange`，
/// id 与时间戳由 [`append_logs`] 统一分配。
#[derive(Debug, Clone, PartialEq)]
pub struct LogChange {
    pub action: &'static str,
    pub object: String,
    pub field: Option<&'static str>,
    pub target_id: Option<String>,
    pub old_value: String,
    pub new_value: String,
}

impl LogChange {
    /// 卡片级变更
    pub fn card(
        action: &'static str,
        field: Option<&'static str>,
        old_value: impl Into<String>,
        new_value: impl Into<String>,
    ) -> Self {
        Self {
            action,
            object: CARD_OBJECT.to_string(),
            field,
            target_id: None,
            old_value: old_value.into(),
            new_value: new_value.into(),
        }
    }

    /// 作用于某个路线工序的变更 (`target_id` = 工序 id)
    pub fn operation(
        action: &'static str,
        op: &RouteOperation,
        field: Option<&'static str>,
        old_value: impl Into<String>,
        new_value: impl Into<String>,
    ) -> Self {
        Self {
            action,
            object: operation_object(op),
            field,
            target_id: Some(op.id.clone()),
            old_value: old_value.into(),
            new_value: new_value.into(),
        }
    }
}

pub(crate) fn operation_object(op: &RouteOperation) -> String {
    if op.op_code.is_empty() && op.op_name.is_empty() {
        OPERATION_OBJECT.to_string()
    } else {
        op.label()
    }
}

/// 把一批变更追加到卡片日志
///
/// 同一批次共享同一个时间戳 `now`，顺序即调用方产出的顺序。
pub fn append_logs(card: &mut Card, changes: impl IntoIterator<Item = LogChange>, now: i64) {
    card.logs.extend(changes.into_iter().map(|c| LogEntry {
        id: gen_id("log"),
        ts: now,
        action: c.action.to_string(),
        object: c.object,
        field: c.field.map(str::to_string),
        target_id: c.target_id,
        old_value: c.old_value,
        new_value: c.new_value,
    }));
}

/// 追加单条变更
pub fn record_log(card: &mut Card, change: LogChange, now: i64) {
    append_logs(card, [change], now);
}

/// 按 `ts` 稳定排序后的日志副本，不改动卡片本身
pub fn sorted_logs(card: &Card) -> Vec<LogEntry> {
    let mut logs = card.logs.clone();
    logs.sort_by_key(|entry| entry.ts);
    logs
}

/// 秒数日志值：四舍五入为整数
pub fn format_seconds(seconds: f64) -> String {
    if seconds.is_finite() {
        format!("{}", seconds.round() as i64)
    } else {
        "0".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_assigns_ids_and_shared_timestamp() {
        let mut card = Card::default();
        append_logs(
            &mut card,
            vec![
                LogChange::card(actions::FIELD_CHANGE, Some("name"), "A", "B"),
                LogChange::card(actions::ARCHIVE, Some("archived"), "false", "true"),
            ],
            1_000,
        );

        assert_eq!(card.logs.len(), 2);
        assert!(card.logs.iter().all(|e| e.ts == 1_000));
        assert!(card.logs[0].id.starts_with("log_"));
        assert_ne!(card.logs[0].id, card.logs[1].id);
        assert_eq!(card.logs[0].field.as_deref(), Some("name"));
        assert_eq!(card.logs[1].action, "archive");
    }

    #[test]
    fn test_operation_change_is_scoped() {
        let op = RouteOperation {
            id: "rop_1".into(),
            op_code: "OP-AAAA".into(),
            op_name: "Milling".into(),
            ..Default::default()
        };
        let change = LogChange::operation(actions::EXECUTOR, &op, Some("executor"), "", "Petrov");
        assert_eq!(change.target_id.as_deref(), Some("rop_1"));
        assert_eq!(change.object, "[OP-AAAA] Milling");

        let bare = RouteOperation::default();
        let change = LogChange::operation(actions::COMMENT, &bare, None, "", "");
        assert_eq!(change.object, "Operation");
    }

    #[test]
    fn test_sorted_logs_is_stable_and_non_mutating() {
        let mut card = Card::default();
        record_log(&mut card, LogChange::card(actions::FIELD_CHANGE, None, "", "first"), 20);
        record_log(&mut card, LogChange::card(actions::FIELD_CHANGE, None, "", "early"), 10);
        record_log(&mut card, LogChange::card(actions::FIELD_CHANGE, None, "", "second"), 20);

        let sorted = sorted_logs(&card);
        let values: Vec<_> = sorted.iter().map(|e| e.new_value.as_str()).collect();
        assert_eq!(values, vec!["early", "first", "second"]);
        assert_eq!(card.logs[0].new_value, "first");
    }

    #[test]
    fn test_format_seconds_rounds() {
        assert_eq!(format_seconds(59.6), "60");
        assert_eq!(format_seconds(0.0), "0");
        assert_eq!(format_seconds(f64::INFINITY), "0");
    }
}
