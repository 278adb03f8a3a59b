//! 健康检查路由
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /health | GET | 状态、版本、数据集修订号 |
//!
//! ```json
//! { "status": "ok", "version": "0.1.0", "revision": 12 }
//! ```

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::core::ServerState;
use crate::services::dataset;
use crate::utils::AppResult;

pub fn router() -> Router<ServerState> {
    Router::new().route("/health", get(health))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// 状态 (ok)
    status: &'static str,
    /// 版本号
    version: &'static str,
    /// 已提交的数据集修订号
    revision: u64,
}

/// GET /health - 健康检查
async fn health(State(state): State<ServerState>) -> AppResult<Json<HealthResponse>> {
    let revision = dataset::revision(&state).await?;
    Ok(Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        revision,
    }))
}
