//! Attachment Model

use serde::{Deserialize, Serialize};

use super::serde_helpers as lenient;

pub const DEFAULT_ATTACHMENT_NAME: &str = "file";
pub const DEFAULT_ATTACHMENT_TYPE: &str = "application/octet-stream";

/// File attached to a card; `content` holds the base64 payload
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Attachment {
    #[serde(deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(rename = "type", deserialize_with = "lenient::string")]
    pub mime_type: String,
    #[serde(deserialize_with = "lenient::count")]
    pub size: u32,
    #[serde(deserialize_with = "lenient::string")]
    pub content: String,
    #[serde(deserialize_with = "lenient::opt_millis")]
    pub created_at: Option<i64>,
}

/// Attachment listing without the payload
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentMeta {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub size: u32,
    pub created_at: Option<i64>,
}

impl From<&Attachment> for AttachmentMeta {
    fn from(a: &Attachment) -> Self {
        Self {
            id: a.id.clone(),
            name: a.name.clone(),
            mime_type: a.mime_type.clone(),
            size: a.size,
            created_at: a.created_at,
        }
    }
}
