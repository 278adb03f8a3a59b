//! 入库前的卡片规范化
//!
//! 类型宽松的反序列化已经在 `shared::models` 完成（字符串数字、负数、
//! null 等）。这里补齐依赖上下文的默认值：

use shared::models::{
    Card, DEFAULT_ATTACHMENT_NAME, DEFAULT_ATTACHMENT_TYPE, DEFAULT_CARD_NAME, Dataset,
    MAX_ADDITIONAL_EXECUTORS,
};
use shared::util::gen_id;

use crate::cards::recalc_status;
use crate::registry::step_code;

/// 日志条目缺少 `action` 时的默认值
const DEFAULT_LOG_ACTION: &str = "update";

/// 规范化单张卡片
///
/// - 名称为空 → `"Card"`
/// - 工序：缺失 id 补齐；`elapsed_seconds` 缺失时取 `actual_seconds` 或 0；
///   `first_started_at` 缺失时取 `started_at`；附加执行人截断为 2 个；
///   数量未设置时继承卡片数量
/// - 自动步骤代码按 `order` 稳定排序后重新编号
/// - 日志、附件缺失字段补默认值
/// - 重新计算卡片状态
pub fn normalize_card(card: &mut Card, now: i64) {
    if card.name.is_empty() {
        card.name = DEFAULT_CARD_NAME.to_string();
    }

    let card_quantity = card.quantity;
    for op in card.operations.iter_mut() {
        if op.id.is_empty() {
            op.id = gen_id("rop");
        }
        if op.elapsed_seconds.is_none() {
            op.elapsed_seconds = Some(op.actual_seconds.unwrap_or(0.0));
        }
        if op.first_started_at.is_none() {
            op.first_started_at = op.started_at;
        }
        op.additional_executors.truncate(MAX_ADDITIONAL_EXECUTORS);
        if op.quantity.is_none() {
            op.quantity = card_quantity;
        }
    }
    renumber_auto_codes(card);

    for entry in card.logs.iter_mut() {
        if entry.id.is_empty() {
            entry.id = gen_id("log");
        }
        if entry.ts <= 0 {
            entry.ts = now;
        }
        if entry.action.is_empty() {
            entry.action = DEFAULT_LOG_ACTION.to_string();
        }
    }

    for file in card.attachments.iter_mut() {
        if file.id.is_empty() {
            file.id = gen_id("file");
        }
        if file.name.is_empty() {
            file.name = DEFAULT_ATTACHMENT_NAME.to_string();
        }
        if file.mime_type.is_empty() {
            file.mime_type = DEFAULT_ATTACHMENT_TYPE.to_string();
        }
        if file.created_at.is_none() {
            file.created_at = Some(now);
        }
    }

    recalc_status(card);
}

/// 自动步骤代码：按 `order` 稳定排序，依次编号 005、010、015…
///
/// 只改代码，不改变工序在数组中的位置。
pub fn renumber_auto_codes(card: &mut Card) {
    let mut indices: Vec<usize> = (0..card.operations.len())
        .filter(|&i| card.operations[i].auto_code)
        .collect();
    indices.sort_by_key(|&i| card.operations[i].order);
    for (step, idx) in indices.into_iter().enumerate() {
        card.operations[idx].op_code = step_code(step + 1);
    }
}

pub fn normalize_dataset(data: &mut Dataset, now: i64) {
    for card in data.cards.iter_mut() {
        normalize_card(card, now);
    }
}
