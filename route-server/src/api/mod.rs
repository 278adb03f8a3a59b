//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`data`] - 整体数据集读写
//! - [`cards`] - 卡片级操作 (创建、保存、复制、归档、删除、日志)
//! - [`operations`] - 工序生命周期与字段编辑
//! - [`files`] - 附件上传与下载

pub mod cards;
pub mod data;
pub mod files;
pub mod health;
pub mod operations;

use axum::extract::DefaultBodyLimit;
use axum::{Router, middleware};
use http::{HeaderName, HeaderValue};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::core::ServerState;

pub use crate::utils::{AppError, AppResult};

/// 请求 ID 生成器
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// HTTP 请求日志中间件
async fn log_request(
    request: http::Request<axum::body::Body>,
    next: middleware::Next,
) -> http::Response<axum::body::Body> {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    let status = response.status();

    tracing::info!(target: "http_access", "{} {} {}", method, uri, status);

    response
}

/// 注册所有路由 (无中间件、无状态)
pub fn build_router() -> Router<ServerState> {
    Router::<ServerState>::new()
        .merge(health::router())
        .merge(data::router())
        .merge(cards::router())
        .merge(operations::router())
        .merge(files::router())
}

/// 完整应用：路由 + 状态 + 中间件
///
/// 请求体大小由 handler 按配置检查并返回结构化 413；
/// 传输层的硬上限为配置值的两倍。
pub fn build_app(state: ServerState) -> Router {
    let hard_limit = state.config.max_body_bytes.saturating_mul(2);
    let request_id = HeaderName::from_static("x-request-id");

    build_router()
        .with_state(state)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(hard_limit))
        // ========== Tower HTTP Middleware ==========
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(middleware::from_fn(log_request))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(SetRequestIdLayer::new(request_id, XRequestId))
}
