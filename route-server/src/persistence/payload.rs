//! 请求体校验与解析
//!
//! 在任何规范化之前执行；被拒绝的请求不会触达存储。

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PayloadError {
    #[error("Payload too large: {size} bytes exceeds limit of {limit} bytes")]
    TooLarge { size: usize, limit: usize },

    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    #[error("Payload must be a JSON object")]
    NotAnObject,
}

/// 检查大小、解析 JSON 并要求顶层为对象
///
/// 空请求体按 `{}` 处理。
pub fn parse_object<T: DeserializeOwned>(body: &[u8], limit: usize) -> Result<T, PayloadError> {
    if body.len() > limit {
        return Err(PayloadError::TooLarge {
            size: body.len(),
            limit,
        });
    }
    let value: Value = if body.iter().all(u8::is_ascii_whitespace) {
        Value::Object(Default::default())
    } else {
        serde_json::from_slice(body).map_err(|e| PayloadError::InvalidJson(e.to_string()))?
    };
    if !value.is_object() {
        return Err(PayloadError::NotAnObject);
    }
    serde_json::from_value(value).map_err(|e| PayloadError::InvalidJson(e.to_string()))
}
