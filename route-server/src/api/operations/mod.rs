//! Route Operation API 模块
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/cards/{id}/operations/{op_id} | PATCH | 备注、件数 |
//! | /api/cards/{id}/operations/{op_id}/{transition} | POST | start / pause / resume / stop |
//! | /api/cards/{id}/operations/{op_id}/executors | GET / POST | 执行人历史 / 附加执行人编辑 |
//! | /api/cards/{id}/operations/{op_id}/elapsed | GET | 实时工时 |

mod handler;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/cards/{id}/operations", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/{op_id}", patch(handler::edit))
        .route(
            "/{op_id}/executors",
            get(handler::executor_history).post(handler::edit_executors),
        )
        .route("/{op_id}/elapsed", get(handler::elapsed))
        .route("/{op_id}/{transition}", post(handler::transition))
}
