//! 工序字段直接编辑
//!
//! 备注、件数、附加执行人。每项编辑只在值真正变化时产出一条
//! 以工序 id 为 `target_id` 的日志。

use shared::models::{Card, MAX_ADDITIONAL_EXECUTORS, RouteOperation};
use thiserror::Error;

use crate::audit::{LogChange, actions};

/// 备注最大字符数（超出部分截断）
pub const MAX_COMMENT_CHARS: usize = 40;

/// 删除附加执行人时日志的 `new_value`
const REMOVED_MARKER: &str = "removed";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("Route operation not found: {0}")]
    OperationNotFound(String),

    #[error("At most {max} additional executors are allowed")]
    ExecutorLimitReached { max: usize },

    #[error("No additional executor at index {index}")]
    ExecutorIndexOutOfRange { index: usize },
}

pub type EditResult<T> = Result<T, EditError>;

/// 件数字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountKind {
    Good,
    Scrap,
    Hold,
}

impl CountKind {
    pub fn field(&self) -> &'static str {
        match self {
            Self::Good => "goodCount",
            Self::Scrap => "scrapCount",
            Self::Hold => "holdCount",
        }
    }

    fn slot<'a>(&self, op: &'a mut RouteOperation) -> &'a mut u32 {
        match self {
            Self::Good => &mut op.good_count,
            Self::Scrap => &mut op.scrap_count,
            Self::Hold => &mut op.hold_count,
        }
    }
}

/// 附加执行人编辑
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutorEdit {
    Add { name: String },
    Rename { index: usize, name: String },
    Remove { index: usize },
}

/// 一次 PATCH 携带的字段编辑；`None` 表示不修改
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationEdit {
    pub comment: Option<String>,
    pub good_count: Option<u32>,
    pub scrap_count: Option<u32>,
    pub hold_count: Option<u32>,
}

fn find_op<'a>(card: &'a mut Card, op_id: &str) -> EditResult<&'a mut RouteOperation> {
    card.operation_mut(op_id)
        .ok_or_else(|| EditError::OperationNotFound(op_id.to_string()))
}

/// 规范化备注：去掉首尾空白后截断到 [`MAX_COMMENT_CHARS`] 个字符
pub fn normalize_comment(raw: &str) -> String {
    raw.trim().chars().take(MAX_COMMENT_CHARS).collect()
}

pub fn set_comment(op: &mut RouteOperation, raw: &str) -> Option<LogChange> {
    let value = normalize_comment(raw);
    if value == op.comment {
        return None;
    }
    let prev = std::mem::replace(&mut op.comment, value);
    Some(LogChange::operation(
        actions::COMMENT,
        op,
        Some("comment"),
        prev,
        op.comment.clone(),
    ))
}

pub fn set_count(op: &mut RouteOperation, kind: CountKind, value: u32) -> Option<LogChange> {
    let slot = kind.slot(op);
    if *slot == value {
        return None;
    }
    let prev = std::mem::replace(slot, value);
    Some(LogChange::operation(
        actions::PART_COUNT,
        op,
        Some(kind.field()),
        prev.to_string(),
        value.to_string(),
    ))
}

/// 在卡片的某个工序上应用字段编辑，返回待追加的日志
///
/// 顺序固定：备注、合格、报废、待定。
pub fn apply_operation_edit(
    card: &mut Card,
    op_id: &str,
    edit: &OperationEdit,
) -> EditResult<Vec<LogChange>> {
    let op = find_op(card, op_id)?;
    let mut changes = Vec::new();
    if let Some(comment) = &edit.comment {
        changes.extend(set_comment(op, comment));
    }
    let counts = [
        (CountKind::Good, edit.good_count),
        (CountKind::Scrap, edit.scrap_count),
        (CountKind::Hold, edit.hold_count),
    ];
    for (kind, value) in counts {
        if let Some(value) = value {
            changes.extend(set_count(op, kind, value));
        }
    }
    Ok(changes)
}

/// 增加、改名或删除附加执行人
pub fn apply_executor_edit(
    card: &mut Card,
    op_id: &str,
    edit: &ExecutorEdit,
) -> EditResult<Vec<LogChange>> {
    let op = find_op(card, op_id)?;
    let field = Some("additionalExecutors");

    let change = match edit {
        ExecutorEdit::Add { name } => {
            if op.additional_executors.len() >= MAX_ADDITIONAL_EXECUTORS {
                return Err(EditError::ExecutorLimitReached {
                    max: MAX_ADDITIONAL_EXECUTORS,
                });
            }
            op.additional_executors.push(name.trim().to_string());
            let len = op.additional_executors.len();
            Some(LogChange::operation(
                actions::ADDITIONAL_EXECUTOR,
                op,
                field,
                (len - 1).to_string(),
                len.to_string(),
            ))
        }
        ExecutorEdit::Rename { index, name } => {
            let name = name.trim().to_string();
            let slot = op
                .additional_executors
                .get_mut(*index)
                .ok_or(EditError::ExecutorIndexOutOfRange { index: *index })?;
            if *slot == name {
                None
            } else {
                let prev = std::mem::replace(slot, name.clone());
                Some(LogChange::operation(
                    actions::ADDITIONAL_EXECUTOR,
                    op,
                    field,
                    prev,
                    name,
                ))
            }
        }
        ExecutorEdit::Remove { index } => {
            if *index >= op.additional_executors.len() {
                return Err(EditError::ExecutorIndexOutOfRange { index: *index });
            }
            let removed = op.additional_executors.remove(*index);
            Some(LogChange::operation(
                actions::ADDITIONAL_EXECUTOR,
                op,
                field,
                removed,
                REMOVED_MARKER,
            ))
        }
    };
    Ok(change.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card() -> Card {
        Card {
            id: "card_1".into(),
            operations: vec![RouteOperation {
                id: "rop_1".into(),
                op_code: "OP-0001".into(),
                op_name: "Turning".into(),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_comment_trimmed_and_truncated() {
        let mut card = card();
        let long = format!("  {}  ", "x".repeat(50));
        let edit = OperationEdit {
            comment: Some(long),
            ..Default::default()
        };
        let changes = apply_operation_edit(&mut card, "rop_1", &edit).unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(card.operations[0].comment.chars().count(), MAX_COMMENT_CHARS);
        assert_eq!(changes[0].field, Some("comment"));
        assert_eq!(changes[0].target_id.as_deref(), Some("rop_1"));
        assert_eq!(changes[0].object, "[OP-0001] Turning");
    }

    #[test]
    fn test_comment_truncates_by_chars() {
        let comment = normalize_comment(&"ж".repeat(45));
        assert_eq!(comment.chars().count(), MAX_COMMENT_CHARS);
    }

    #[test]
    fn test_unchanged_values_are_not_logged() {
        let mut card = card();
        card.operations[0].good_count = 5;
        card.operations[0].comment = "ok".into();
        let edit = OperationEdit {
            comment: Some(" ok ".into()),
            good_count: Some(5),
            ..Default::default()
        };
        assert!(apply_operation_edit(&mut card, "rop_1", &edit).unwrap().is_empty());
    }

    #[test]
    fn test_counts_logged_in_fixed_order() {
        let mut card = card();
        let edit = OperationEdit {
            hold_count: Some(1),
            good_count: Some(8),
            scrap_count: Some(2),
            ..Default::default()
        };
        let changes = apply_operation_edit(&mut card, "rop_1", &edit).unwrap();
        let fields: Vec<_> = changes.iter().map(|c| c.field).collect();
        assert_eq!(
            fields,
            vec![Some("goodCount"), Some("scrapCount"), Some("holdCount")]
        );
        assert_eq!(changes[0].old_value, "0");
        assert_eq!(changes[0].new_value, "8");
        assert_eq!(card.operations[0].counted_total(), 11);
    }

    #[test]
    fn test_additional_executor_limit() {
        let mut card = card();
        for name in ["Ivanov", "Petrov"] {
            let changes = apply_executor_edit(
                &mut card,
                "rop_1",
                &ExecutorEdit::Add { name: name.into() },
            )
            .unwrap();
            assert_eq!(changes.len(), 1);
        }
        let err = apply_executor_edit(
            &mut card,
            "rop_1",
            &ExecutorEdit::Add {
                name: "Sidorov".into(),
            },
        )
        .unwrap_err();
        assert_eq!(err, EditError::ExecutorLimitReached { max: 2 });
        assert_eq!(card.operations[0].additional_executors.len(), 2);
    }

    #[test]
    fn test_rename_and_remove_executor() {
        let mut card = card();
        card.operations[0].additional_executors = vec!["Ivanov".into(), "Petrov".into()];

        let changes = apply_executor_edit(
            &mut card,
            "rop_1",
            &ExecutorEdit::Rename {
                index: 1,
                name: " Smirnov ".into(),
            },
        )
        .unwrap();
        assert_eq!(changes[0].old_value, "Petrov");
        assert_eq!(changes[0].new_value, "Smirnov");

        let changes =
            apply_executor_edit(&mut card, "rop_1", &ExecutorEdit::Remove { index: 0 }).unwrap();
        assert_eq!(changes[0].old_value, "Ivanov");
        assert_eq!(changes[0].new_value, REMOVED_MARKER);
        assert_eq!(card.operations[0].additional_executors, vec!["Smirnov"]);

        let err = apply_executor_edit(&mut card, "rop_1", &ExecutorEdit::Remove { index: 3 })
            .unwrap_err();
        assert_eq!(err, EditError::ExecutorIndexOutOfRange { index: 3 });
    }

    #[test]
    fn test_unknown_operation() {
        let mut card = card();
        let err = apply_operation_edit(&mut card, "nope", &OperationEdit::default()).unwrap_err();
        assert_eq!(err, EditError::OperationNotFound("nope".into()));
    }
}
