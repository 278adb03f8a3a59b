//! Attachment API 模块
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/cards/{id}/files | GET | 附件列表 (不含内容) |
//! | /api/cards/{id}/files | POST | 上传附件 (base64 或 data URL) |
//! | /files/{attachment_id} | GET | 下载附件 |

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub use handler::{ALLOWED_EXTENSIONS, decode_content};

pub fn router() -> Router<ServerState> {
    Router::new()
        .route(
            "/api/cards/{id}/files",
            get(handler::list).post(handler::upload),
        )
        .route("/files/{attachment_id}", get(handler::download))
}
