//! Route Operation API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use shared::models::{Card, OperationStatus};
use shared::util::format_hms;
use validator::Validate;

use crate::audit::{append_logs, build_executor_history, format_history};
use crate::cards::{
    ExecutorEdit, OperationEdit, Transition, apply_executor_edit, apply_operation_edit,
    effective_elapsed_seconds, run_transition,
};
use crate::core::ServerState;
use crate::services::dataset;
use crate::utils::{AppError, AppResult, ErrorCode};

fn operation_not_found(op_id: &str) -> AppError {
    AppError::with_message(
        ErrorCode::RouteOperationNotFound,
        format!("Route operation not found: {}", op_id),
    )
    .with_detail("opId", op_id)
}

fn validate<T: Validate>(payload: &T) -> AppResult<()> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))
}

/// POST /api/cards/{id}/operations/{op_id}/{transition} - 工序状态转换
///
/// 数量对账失败返回 422，状态不符返回 409，两种情况都不写入。
pub async fn transition(
    State(state): State<ServerState>,
    Path((id, op_id, transition)): Path<(String, String, Transition)>,
) -> AppResult<Json<Card>> {
    let target = op_id.clone();
    let card_id = id.clone();
    let (card, ()) = dataset::mutate_card(&state, &id, move |card, now| {
        run_transition(card, &target, transition, now).map_err(|e| {
            tracing::warn!(card_id = %card_id, op_id = %target, %transition, error = %e, "Transition rejected");
            AppError::from(e)
        })
    })
    .await?;
    tracing::info!(card_id = %id, op_id = %op_id, %transition, status = %card.status, "Operation transition applied");
    Ok(Json(card))
}

/// PATCH 请求体，只提交需要修改的字段
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OperationPatch {
    /// 超过 40 个字符的部分会被截断
    #[validate(length(max = 1000))]
    pub comment: Option<String>,
    #[validate(range(max = 1_000_000))]
    pub good_count: Option<u32>,
    #[validate(range(max = 1_000_000))]
    pub scrap_count: Option<u32>,
    #[validate(range(max = 1_000_000))]
    pub hold_count: Option<u32>,
}

impl From<OperationPatch> for OperationEdit {
    fn from(p: OperationPatch) -> Self {
        Self {
            comment: p.comment,
            good_count: p.good_count,
            scrap_count: p.scrap_count,
            hold_count: p.hold_count,
        }
    }
}

/// PATCH /api/cards/{id}/operations/{op_id} - 备注与件数
pub async fn edit(
    State(state): State<ServerState>,
    Path((id, op_id)): Path<(String, String)>,
    Json(payload): Json<OperationPatch>,
) -> AppResult<Json<Card>> {
    validate(&payload)?;
    let edit = OperationEdit::from(payload);
    let (card, logged) = dataset::mutate_card(&state, &id, move |card, now| {
        let changes = apply_operation_edit(card, &op_id, &edit)?;
        let logged = changes.len();
        append_logs(card, changes, now);
        Ok(logged)
    })
    .await?;
    tracing::debug!(card_id = %id, logged, "Operation fields edited");
    Ok(Json(card))
}

/// 附加执行人编辑请求
///
/// ```json
/// { "action": "add", "name": "Petrov" }
/// { "action": "rename", "index": 0, "name": "Sidorov" }
/// { "action": "remove", "index": 1 }
/// ```
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum ExecutorRequest {
    Add {
        #[serde(default)]
        name: String,
    },
    Rename {
        index: usize,
        name: String,
    },
    Remove {
        index: usize,
    },
}

impl ExecutorRequest {
    fn name(&self) -> Option<&str> {
        match self {
            Self::Add { name } | Self::Rename { name, .. } => Some(name),
            Self::Remove { .. } => None,
        }
    }
}

impl From<ExecutorRequest> for ExecutorEdit {
    fn from(r: ExecutorRequest) -> Self {
        match r {
            ExecutorRequest::Add { name } => ExecutorEdit::Add { name },
            ExecutorRequest::Rename { index, name } => ExecutorEdit::Rename { index, name },
            ExecutorRequest::Remove { index } => ExecutorEdit::Remove { index },
        }
    }
}

/// 执行人名称长度上限
const MAX_EXECUTOR_NAME_CHARS: usize = 100;

/// POST /api/cards/{id}/operations/{op_id}/executors - 附加执行人编辑
pub async fn edit_executors(
    State(state): State<ServerState>,
    Path((id, op_id)): Path<(String, String)>,
    Json(payload): Json<ExecutorRequest>,
) -> AppResult<Json<Card>> {
    if payload
        .name()
        .is_some_and(|n| n.chars().count() > MAX_EXECUTOR_NAME_CHARS)
    {
        return Err(AppError::validation(format!(
            "Executor name exceeds {} characters",
            MAX_EXECUTOR_NAME_CHARS
        )));
    }
    let edit = ExecutorEdit::from(payload);
    let (card, ()) = dataset::mutate_card(&state, &id, move |card, now| {
        let changes = apply_executor_edit(card, &op_id, &edit)?;
        append_logs(card, changes, now);
        Ok(())
    })
    .await?;
    Ok(Json(card))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutorHistoryResponse {
    op_id: String,
    /// 按时间顺序的执行人链
    history: Vec<String>,
    /// `A → B → C`
    formatted: String,
}

/// GET /api/cards/{id}/operations/{op_id}/executors - 执行人历史
pub async fn executor_history(
    State(state): State<ServerState>,
    Path((id, op_id)): Path<(String, String)>,
) -> AppResult<Json<ExecutorHistoryResponse>> {
    let card = dataset::load_card(&state, &id).await?;
    let op = card
        .operation(&op_id)
        .ok_or_else(|| operation_not_found(&op_id))?;
    let history = build_executor_history(&card, op);
    Ok(Json(ExecutorHistoryResponse {
        formatted: format_history(&history),
        history,
        op_id,
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElapsedResponse {
    op_id: String,
    status: OperationStatus,
    elapsed_seconds: f64,
    /// `HH:MM:SS`
    formatted: String,
}

/// GET /api/cards/{id}/operations/{op_id}/elapsed - 实时工时 (只读)
pub async fn elapsed(
    State(state): State<ServerState>,
    Path((id, op_id)): Path<(String, String)>,
) -> AppResult<Json<ElapsedResponse>> {
    let card = dataset::load_card(&state, &id).await?;
    let op = card
        .operation(&op_id)
        .ok_or_else(|| operation_not_found(&op_id))?;
    let elapsed_seconds = effective_elapsed_seconds(op, state.now());
    Ok(Json(ElapsedResponse {
        status: op.status,
        formatted: format_hms(elapsed_seconds),
        elapsed_seconds,
        op_id,
    }))
}
