//! 卡片状态聚合
//!
//! 卡片状态永远是工序状态的纯函数，不接受用户直接设置。

use shared::models::{Card, CardStatus, OperationStatus, ProcessState, RouteOperation};

/// 工序状态 → 卡片状态
///
/// - 无工序 → `NOT_STARTED`
/// - 任一工序进行中或暂停 → `IN_PROGRESS`
/// - 全部完成 → `DONE`
/// - 其余 (完成与未开始混合) → `NOT_STARTED`
pub fn aggregate(operations: &[RouteOperation]) -> CardStatus {
    if operations.is_empty() {
        return CardStatus::NotStarted;
    }
    if operations.iter().any(|op| op.status.is_active()) {
        return CardStatus::InProgress;
    }
    if operations.iter().all(|op| op.status == OperationStatus::Done) {
        return CardStatus::Done;
    }
    CardStatus::NotStarted
}

/// 重新计算并写回卡片状态，返回状态是否变化
pub fn recalc_status(card: &mut Card) -> bool {
    let next = aggregate(&card.operations);
    let changed = card.status != next;
    card.status = next;
    changed
}

/// 展示用状态，读取时计算，从不持久化
///
/// 与持久化状态不同：同时存在进行中和暂停的工序为 `MIXED`，
/// 部分完成而其余未开始视为 `IN_PROGRESS`。
pub fn process_state(card: &Card) -> ProcessState {
    let ops = &card.operations;
    let has = |s: OperationStatus| ops.iter().any(|op| op.status == s);
    let all = |s: OperationStatus| !ops.is_empty() && ops.iter().all(|op| op.status == s);

    if all(OperationStatus::Done) {
        return ProcessState::Done;
    }
    let in_progress = has(OperationStatus::InProgress);
    let paused = has(OperationStatus::Paused);
    match (in_progress, paused) {
        (true, true) => ProcessState::Mixed,
        (true, false) => ProcessState::InProgress,
        (false, true) => ProcessState::Paused,
        (false, false) if has(OperationStatus::Done) => ProcessState::InProgress,
        (false, false) => ProcessState::NotStarted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ops(statuses: &[OperationStatus]) -> Vec<RouteOperation> {
        statuses
            .iter()
            .map(|s| RouteOperation {
                status: *s,
                ..Default::default()
            })
            .collect()
    }

    use OperationStatus::*;

    #[test]
    fn test_aggregate_rules() {
        assert_eq!(aggregate(&ops(&[])), CardStatus::NotStarted);
        assert_eq!(aggregate(&ops(&[Done, NotStarted])), CardStatus::NotStarted);
        assert_eq!(aggregate(&ops(&[Done, InProgress])), CardStatus::InProgress);
        assert_eq!(aggregate(&ops(&[Done, Paused])), CardStatus::InProgress);
        assert_eq!(aggregate(&ops(&[Done, Done])), CardStatus::Done);
        assert_eq!(aggregate(&ops(&[NotStarted])), CardStatus::NotStarted);
    }

    #[test]
    fn test_recalc_reports_change() {
        let mut card = Card {
            operations: ops(&[InProgress]),
            ..Default::default()
        };
        assert!(recalc_status(&mut card));
        assert_eq!(card.status, CardStatus::InProgress);
        assert!(!recalc_status(&mut card));
    }

    #[test]
    fn test_process_state() {
        let state = |s: &[OperationStatus]| {
            process_state(&Card {
                operations: ops(s),
                ..Default::default()
            })
        };
        assert_eq!(state(&[]), ProcessState::NotStarted);
        assert_eq!(state(&[Done, Done]), ProcessState::Done);
        assert_eq!(state(&[InProgress, Paused]), ProcessState::Mixed);
        assert_eq!(state(&[InProgress, NotStarted]), ProcessState::InProgress);
        assert_eq!(state(&[Paused, Done]), ProcessState::Paused);
        assert_eq!(state(&[Done, NotStarted]), ProcessState::InProgress);
        assert_eq!(state(&[NotStarted, NotStarted]), ProcessState::NotStarted);
    }
}
