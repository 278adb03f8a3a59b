//! Dataset API 模块

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route(
        "/api/data",
        get(handler::get_data)
            .post(handler::submit)
            .put(handler::submit),
    )
}
