//! 工序生命周期状态机与计时
//!
//! ```text
//! NOT_STARTED ──start──▶ IN_PROGRESS ──pause──▶ PAUSED
//!                          ▲    │                 │
//!                          │    └──stop──▶ DONE ◀─┘ stop
//!                          └──resume── PAUSED / DONE
//! ```
//!
//! 所有转换都是同步瞬时的，时间由调用方显式传入 (`now`，毫秒)。
//! 持久化的 `elapsed_seconds` 只是检查点，实时时长用
//! [`effective_elapsed_seconds`] 计算。

use serde::Deserialize;
use shared::models::{Card, OperationStatus, RouteOperation};
use std::fmt;
use thiserror::Error;

use super::status::recalc_status;
use crate::audit::{LogChange, actions, append_logs, format_seconds};

/// 用户触发的工序转换
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transition {
    Start,
    Pause,
    Resume,
    Stop,
}

impl Transition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::Stop => "stop",
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 生命周期错误；任何错误都不改变状态、不写日志
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LifecycleError {
    #[error("Route operation not found: {0}")]
    OperationNotFound(String),

    #[error("Cannot {transition} an operation in status {status}")]
    InvalidTransition {
        transition: Transition,
        status: OperationStatus,
    },

    #[error(
        "Counts do not match planned quantity {expected}: good {good} + scrap {scrap} + hold {hold} = {actual}"
    )]
    QuantityMismatch {
        expected: u32,
        good: u32,
        scrap: u32,
        hold: u32,
        actual: u64,
    },
}

pub type LifecycleResult<T> = Result<T, LifecycleError>;

fn open_interval_seconds(op: &RouteOperation, now: i64) -> f64 {
    op.started_at
        .map(|started| now.saturating_sub(started).max(0) as f64 / 1000.0)
        .unwrap_or(0.0)
}

/// 把当前运行区间并入 `elapsed_seconds`
fn fold_open_interval(op: &mut RouteOperation, now: i64) {
    let elapsed = op.elapsed_seconds.unwrap_or(0.0) + open_interval_seconds(op, now);
    op.elapsed_seconds = Some(elapsed);
}

/// 任意时刻的有效工时（秒）
///
/// 进行中 = 检查点 + 当前区间；其他状态 = 检查点。
pub fn effective_elapsed_seconds(op: &RouteOperation, now: i64) -> f64 {
    let stored = op.elapsed_seconds.unwrap_or(0.0);
    if op.status == OperationStatus::InProgress {
        stored + open_interval_seconds(op, now)
    } else {
        stored
    }
}

fn reject(transition: Transition, op: &RouteOperation) -> LifecycleError {
    LifecycleError::InvalidTransition {
        transition,
        status: op.status,
    }
}

/// 从头开始：丢弃之前的部分工时
pub fn start(op: &mut RouteOperation, now: i64) -> LifecycleResult<()> {
    if op.status != OperationStatus::NotStarted {
        return Err(reject(Transition::Start, op));
    }
    if op.first_started_at.is_none() {
        op.first_started_at = Some(now);
    }
    op.status = OperationStatus::InProgress;
    op.started_at = Some(now);
    op.last_paused_at = None;
    op.finished_at = None;
    op.actual_seconds = None;
    op.elapsed_seconds = Some(0.0);
    Ok(())
}

pub fn pause(op: &mut RouteOperation, now: i64) -> LifecycleResult<()> {
    if op.status != OperationStatus::InProgress {
        return Err(reject(Transition::Pause, op));
    }
    fold_open_interval(op, now);
    op.last_paused_at = Some(now);
    op.started_at = None;
    op.status = OperationStatus::Paused;
    Ok(())
}

/// 从暂停继续，或重新打开已完成的工序
pub fn resume(op: &mut RouteOperation, now: i64) -> LifecycleResult<()> {
    if !matches!(op.status, OperationStatus::Paused | OperationStatus::Done) {
        return Err(reject(Transition::Resume, op));
    }
    if op.status == OperationStatus::Done && op.elapsed_seconds.is_none() {
        op.elapsed_seconds = Some(op.actual_seconds.unwrap_or(0.0));
    }
    if op.first_started_at.is_none() {
        op.first_started_at = Some(now);
    }
    op.status = OperationStatus::InProgress;
    op.started_at = Some(now);
    op.last_paused_at = None;
    op.finished_at = None;
    Ok(())
}

/// 完成工序
///
/// 有效计划数量（工序覆盖值，否则卡片数量）为正数时，
/// 必须满足 `good + scrap + hold == 计划数量`，否则拒绝且不改变任何状态。
/// 计划数量为 0 或未设置时不做对账。
pub fn stop(op: &mut RouteOperation, card_quantity: Option<u32>, now: i64) -> LifecycleResult<()> {
    if !op.status.is_active() {
        return Err(reject(Transition::Stop, op));
    }
    if let Some(expected) = op.effective_quantity(card_quantity).filter(|q| *q > 0) {
        let actual = op.counted_total();
        if actual != expected as u64 {
            return Err(LifecycleError::QuantityMismatch {
                expected,
                good: op.good_count,
                scrap: op.scrap_count,
                hold: op.hold_count,
                actual,
            });
        }
    }
    if op.status == OperationStatus::InProgress {
        fold_open_interval(op, now);
    }
    op.started_at = None;
    op.last_paused_at = None;
    op.finished_at = Some(now);
    op.actual_seconds = Some(op.elapsed_seconds.unwrap_or(0.0));
    op.status = OperationStatus::Done;
    Ok(())
}

/// 在卡片上执行一次转换，返回待追加的日志变更
///
/// 卡片状态在转换后立即重算。日志顺序：工序状态、
/// （落到 DONE 且工时变化时）实际工时、（卡片状态变化时）卡片状态。
pub fn apply_transition(
    card: &mut Card,
    op_id: &str,
    transition: Transition,
    now: i64,
) -> LifecycleResult<Vec<LogChange>> {
    let card_quantity = card.quantity;
    let op = card
        .operation_mut(op_id)
        .ok_or_else(|| LifecycleError::OperationNotFound(op_id.to_string()))?;

    let prev_status = op.status;
    let prev_elapsed = op.elapsed_seconds.unwrap_or(0.0);

    match transition {
        Transition::Start => start(op, now)?,
        Transition::Pause => pause(op, now)?,
        Transition::Resume => resume(op, now)?,
        Transition::Stop => stop(op, card_quantity, now)?,
    }

    let mut changes = Vec::with_capacity(3);
    if prev_status != op.status {
        changes.push(LogChange::operation(
            actions::OPERATION_STATUS,
            op,
            Some("status"),
            prev_status.as_str(),
            op.status.as_str(),
        ));
    }
    let elapsed = op.elapsed_seconds.unwrap_or(0.0);
    if op.status == OperationStatus::Done && elapsed != prev_elapsed {
        changes.push(LogChange::operation(
            actions::ACTUAL_TIME,
            op,
            Some("elapsedSeconds"),
            format_seconds(prev_elapsed),
            format_seconds(elapsed),
        ));
    }

    let prev_card_status = card.status;
    if recalc_status(card) {
        changes.push(LogChange::card(
            actions::CARD_STATUS,
            Some("status"),
            prev_card_status.as_str(),
            card.status.as_str(),
        ));
    }

    Ok(changes)
}

/// 执行转换并把日志追加到卡片
pub fn run_transition(
    card: &mut Card,
    op_id: &str,
    transition: Transition,
    now: i64,
) -> LifecycleResult<()> {
    let changes = apply_transition(card, op_id, transition, now)?;
    append_logs(card, changes, now);
    Ok(())
}
