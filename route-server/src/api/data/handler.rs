//! Dataset API Handlers

use axum::{Json, body::Bytes, extract::State};
use serde::Serialize;
use shared::models::Dataset;

use crate::core::ServerState;
use crate::persistence::parse_object;
use crate::services::dataset;
use crate::utils::AppResult;

/// 提交成功响应 `{ "status": "ok", "data": {...} }`
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    status: &'static str,
    data: Dataset,
}

/// GET /api/data - 获取完整数据集
pub async fn get_data(State(state): State<ServerState>) -> AppResult<Json<Dataset>> {
    Ok(Json(dataset::load(&state).await?))
}

/// POST|PUT /api/data - 提交完整数据集
///
/// 超过大小上限或不是 JSON 对象时整体拒绝，不会写入任何内容。
pub async fn submit(
    State(state): State<ServerState>,
    body: Bytes,
) -> AppResult<Json<SubmitResponse>> {
    let incoming: Dataset = parse_object(&body, state.config.max_body_bytes).inspect_err(|e| {
        tracing::warn!(error = %e, size = body.len(), "Dataset submission rejected");
    })?;
    let data = dataset::submit_dataset(&state, incoming).await?;
    Ok(Json(SubmitResponse { status: "ok", data }))
}
