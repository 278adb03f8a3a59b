//! 卡片快照 diff 计算
//!
//! 比较同一张卡片的两个版本，按固定顺序产出日志变更：
//!
//! 1. 标量字段 (固定字段顺序)
//! 2. 卡片状态
//! 3. 归档标记
//! 4. 附件数量
//! 5. 工序：按新列表顺序逐个比较，新增/修改
//! 6. 被删除的工序，按旧列表顺序

use shared::models::{Card, RouteOperation};
use std::collections::{HashMap, HashSet};

use super::log::{LogChange, actions};

/// 参与比较的标量字段 (顺序即输出顺序)
const SCALAR_FIELDS: [&str; 7] = [
    "name",
    "orderNo",
    "desc",
    "quantity",
    "drawing",
    "material",
    "contractNumber",
];

fn scalar_value(card: &Card, field: &str) -> String {
    match field {
        "name" => card.name.clone(),
        "orderNo" => card.order_no.clone(),
        "desc" => card.desc.clone(),
        "quantity" => card.quantity.map(|q| q.to_string()).unwrap_or_default(),
        "drawing" => card.drawing.clone(),
        "material" => card.material.clone(),
        "contractNumber" => card.contract_number.clone(),
        _ => String::new(),
    }
}

/// `<centerName> / <executor>`
fn placement(op: &RouteOperation) -> String {
    format!("{} / {}", op.center_name, op.executor)
        .trim()
        .to_string()
}

/// 计算 `previous` → `updated` 的日志变更
pub fn diff(previous: &Card, updated: &Card) -> Vec<LogChange> {
    let mut changes = Vec::new();

    for field in SCALAR_FIELDS {
        let old = scalar_value(previous, field);
        let new = scalar_value(updated, field);
        if old != new {
            changes.push(LogChange::card(actions::FIELD_CHANGE, Some(field), old, new));
        }
    }

    if previous.status != updated.status {
        changes.push(LogChange::card(
            actions::CARD_STATUS,
            Some("status"),
            previous.status.as_str(),
            updated.status.as_str(),
        ));
    }

    if previous.archived != updated.archived {
        changes.push(LogChange::card(
            actions::ARCHIVE,
            Some("archived"),
            previous.archived.to_string(),
            updated.archived.to_string(),
        ));
    }

    if previous.attachments.len() != updated.attachments.len() {
        changes.push(LogChange::card(
            actions::ATTACHMENTS,
            Some("attachments"),
            previous.attachments.len().to_string(),
            updated.attachments.len().to_string(),
        ));
    }

    let old_ops: HashMap<&str, &RouteOperation> = previous
        .operations
        .iter()
        .map(|op| (op.id.as_str(), op))
        .collect();

    for op in &updated.operations {
        let Some(prev) = old_ops.get(op.id.as_str()) else {
            changes.push(LogChange::operation(
                actions::OPERATION_ADDED,
                op,
                None,
                "",
                placement(op),
            ));
            continue;
        };
        diff_operation(prev, op, &mut changes);
    }

    let new_ids: HashSet<&str> = updated.operations.iter().map(|op| op.id.as_str()).collect();
    for op in &previous.operations {
        if !new_ids.contains(op.id.as_str()) {
            changes.push(LogChange::operation(
                actions::OPERATION_REMOVED,
                op,
                None,
                placement(op),
                "",
            ));
        }
    }

    changes
}

fn diff_operation(prev: &RouteOperation, op: &RouteOperation, changes: &mut Vec<LogChange>) {
    if prev.center_name != op.center_name {
        changes.push(LogChange::operation(
            actions::OPERATION_CHANGED,
            op,
            Some("centerName"),
            prev.center_name.clone(),
            op.center_name.clone(),
        ));
    }
    // 代码与名称作为一个整体比较
    if prev.op_code != op.op_code || prev.op_name != op.op_name {
        changes.push(LogChange::operation(
            actions::OPERATION_CHANGED,
            op,
            Some("operation"),
            prev.label(),
            op.label(),
        ));
    }
    if prev.executor != op.executor {
        changes.push(LogChange::operation(
            actions::EXECUTOR,
            op,
            Some("executor"),
            prev.executor.clone(),
            op.executor.clone(),
        ));
    }
    if prev.planned_minutes != op.planned_minutes {
        changes.push(LogChange::operation(
            actions::PLANNED_TIME,
            op,
            Some("plannedMinutes"),
            prev.planned_minutes.to_string(),
            op.planned_minutes.to_string(),
        ));
    }
    if prev.order != op.order {
        changes.push(LogChange::operation(
            actions::OPERATION_ORDER,
            op,
            Some("order"),
            prev.order.to_string(),
            op.order.to_string(),
        ));
    }
}
