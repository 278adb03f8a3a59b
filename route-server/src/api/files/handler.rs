//! Attachment API Handlers

use axum::{
    Json,
    body::{Body, Bytes},
    extract::{Path, State},
    response::Response,
};
use base64::{Engine, engine::general_purpose::STANDARD};
use http::header;
use serde::{Deserialize, Serialize};
use shared::models::attachment::{AttachmentMeta, DEFAULT_ATTACHMENT_NAME, DEFAULT_ATTACHMENT_TYPE};
use shared::models::{Attachment, serde_helpers as lenient};
use shared::util::gen_id;

use crate::audit::{LogChange, actions, record_log};
use crate::core::ServerState;
use crate::persistence::parse_object;
use crate::services::dataset;
use crate::utils::{AppError, AppResult, ErrorCode};

/// 允许的扩展名；无扩展名的文件不受限制
pub const ALLOWED_EXTENSIONS: &[&str] = &[
    ".pdf", ".doc", ".docx", ".jpg", ".jpeg", ".png", ".zip", ".rar", ".7z",
];

/// 上传请求体
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UploadRequest {
    #[serde(deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(rename = "type", deserialize_with = "lenient::string")]
    pub mime_type: String,
    /// data URL (`data:...;base64,XXXX`) 或纯 base64
    #[serde(deserialize_with = "lenient::string")]
    pub content: String,
    #[serde(deserialize_with = "lenient::count")]
    pub size: u32,
}

#[derive(Debug, Serialize)]
pub struct FilesResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<&'static str>,
    files: Vec<AttachmentMeta>,
}

/// 去掉 data URL 前缀后按 base64 解码
pub fn decode_content(content: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let payload = content.rsplit(',').next().unwrap_or(content);
    STANDARD.decode(payload.trim())
}

fn extension_of(name: &str) -> Option<String> {
    std::path::Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
}

fn metas(attachments: &[Attachment]) -> Vec<AttachmentMeta> {
    attachments.iter().map(AttachmentMeta::from).collect()
}

/// GET /api/cards/{id}/files - 附件列表
pub async fn list(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<FilesResponse>> {
    let card = dataset::load_card(&state, &id).await?;
    Ok(Json(FilesResponse {
        status: None,
        files: metas(&card.attachments),
    }))
}

/// POST /api/cards/{id}/files - 上传附件
///
/// 缺少名称或内容、扩展名不在白名单、内容不是合法 base64 时返回 400，
/// 解码后超过大小上限返回 413。
pub async fn upload(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    body: Bytes,
) -> AppResult<Json<FilesResponse>> {
    let req: UploadRequest = parse_object(&body, state.config.max_body_bytes)?;
    if req.name.trim().is_empty() {
        return Err(AppError::new(ErrorCode::NoFilename));
    }
    if req.content.is_empty() {
        return Err(AppError::new(ErrorCode::EmptyFile));
    }
    if let Some(ext) = extension_of(&req.name)
        && !ALLOWED_EXTENSIONS.contains(&ext.as_str())
    {
        return Err(
            AppError::with_message(
                ErrorCode::InvalidFileExtension,
                format!("File type not allowed: {}", ext),
            )
            .with_detail("extension", ext),
        );
    }
    let bytes = decode_content(&req.content).map_err(|e| {
        AppError::with_message(ErrorCode::InvalidFileContent, format!("Invalid base64: {}", e))
    })?;
    let limit = state.config.max_attachment_bytes;
    if bytes.len() > limit {
        return Err(AppError::with_message(
            ErrorCode::FileTooLarge,
            format!("File exceeds {} bytes", limit),
        )
        .with_detail("limit", limit)
        .with_detail("size", bytes.len()));
    }

    let size = if req.size > 0 {
        req.size
    } else {
        u32::try_from(bytes.len()).unwrap_or(u32::MAX)
    };
    let name = req.name;
    let mime_type = if req.mime_type.is_empty() {
        DEFAULT_ATTACHMENT_TYPE.to_string()
    } else {
        req.mime_type
    };
    let content = req.content;

    let (card, file_id) = dataset::mutate_card(&state, &id, move |card, now| {
        let file = Attachment {
            id: gen_id("file"),
            name,
            mime_type,
            size,
            content,
            created_at: Some(now),
        };
        let file_id = file.id.clone();
        let before = card.attachments.len();
        card.attachments.push(file);
        let change = LogChange::card(
            actions::ATTACHMENTS,
            Some("attachments"),
            before.to_string(),
            (before + 1).to_string(),
        );
        record_log(card, change, now);
        Ok(file_id)
    })
    .await?;
    tracing::info!(card_id = %id, file_id = %file_id, size, "Attachment uploaded");

    Ok(Json(FilesResponse {
        status: Some("ok"),
        files: metas(&card.attachments),
    }))
}

/// GET /files/{attachment_id} - 下载附件
pub async fn download(
    State(state): State<ServerState>,
    Path(attachment_id): Path<String>,
) -> AppResult<Response> {
    let data = dataset::load(&state).await?;
    let (_, file) = dataset::find_attachment(&data, &attachment_id).ok_or_else(|| {
        AppError::with_message(
            ErrorCode::AttachmentNotFound,
            format!("Attachment not found: {}", attachment_id),
        )
    })?;
    if file.content.is_empty() {
        return Err(AppError::with_message(
            ErrorCode::AttachmentNotFound,
            "File content missing",
        ));
    }
    let bytes = decode_content(&file.content).map_err(|e| {
        AppError::with_message(ErrorCode::InvalidFileContent, format!("Invalid base64: {}", e))
    })?;

    let name = if file.name.is_empty() {
        DEFAULT_ATTACHMENT_NAME
    } else {
        file.name.as_str()
    };
    let content_type = if file.mime_type.is_empty() || file.mime_type == DEFAULT_ATTACHMENT_TYPE {
        mime_guess::from_path(name)
            .first_or_octet_stream()
            .essence_str()
            .to_string()
    } else {
        file.mime_type.clone()
    };
    let disposition = format!("attachment; filename=\"{}\"", name.replace('"', ""));

    Response::builder()
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, bytes.len())
        .header(header::CONTENT_DISPOSITION, disposition)
        .body(Body::from(bytes))
        .map_err(|e| AppError::internal(format!("Failed to build response: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_data_url_and_plain() {
        assert_eq!(decode_content("data:text/plain;base64,aGVsbG8=").unwrap(), b"hello");
        assert_eq!(decode_content("aGVsbG8=").unwrap(), b"hello");
        assert!(decode_content("not base64!").is_err());
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("Drawing.PDF").as_deref(), Some(".pdf"));
        assert_eq!(extension_of("archive.tar.gz").as_deref(), Some(".gz"));
        assert_eq!(extension_of("README"), None);
    }
}
