//! Card API 模块
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/cards | POST | 由草稿创建卡片 |
//! | /api/cards/{id} | GET / PUT / DELETE | 读取 / 保存编辑 / 删除 |
//! | /api/cards/{id}/duplicate | POST | 复制 |
//! | /api/cards/{id}/archive | POST | 归档 |
//! | /api/cards/{id}/logs | GET | 按时间排序的日志 |
//! | /api/cards/{id}/state | GET | 展示用状态 |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/cards", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::create))
        .route(
            "/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
        .route("/{id}/duplicate", post(handler::duplicate))
        .route("/{id}/archive", post(handler::archive))
        .route("/{id}/logs", get(handler::logs))
        .route("/{id}/state", get(handler::process_state))
}
