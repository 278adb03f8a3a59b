//! 执行人历史重建
//!
//! 不单独维护历史表，完全从日志折叠得到。

use shared::models::{Card, RouteOperation};

const EXECUTOR_FIELD: &str = "executor";

/// 重建某个工序的执行人链
///
/// 取 `target_id == op.id && field == "executor"` 的日志，按 `ts` 稳定排序；
/// 第一条的旧值（非空时）作为链首，随后是每条非空的新值。
/// 没有任何变更时，链仅包含当前执行人。
pub fn build_executor_history(card: &Card, op: &RouteOperation) -> Vec<String> {
    let mut entries: Vec<_> = card
        .logs
        .iter()
        .filter(|entry| entry.is_for(&op.id, EXECUTOR_FIELD))
        .collect();

    if entries.is_empty() {
        return if op.executor.is_empty() {
            Vec::new()
        } else {
            vec![op.executor.clone()]
        };
    }

    entries.sort_by_key(|entry| entry.ts);

    let mut chain = Vec::with_capacity(entries.len() + 1);
    if !entries[0].old_value.is_empty() {
        chain.push(entries[0].old_value.clone());
    }
    chain.extend(
        entries
            .iter()
            .filter(|entry| !entry.new_value.is_empty())
            .map(|entry| entry.new_value.clone()),
    );
    chain
}

/// `A → B → C`
pub fn format_history(chain: &[String]) -> String {
    chain.join(" → ")
}
