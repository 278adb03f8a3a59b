//! 统一错误处理
//!
//! 错误类型来自 `shared::error`，这里负责把各组件的领域错误转换为
//! [`AppError`]，handler 里直接用 `?` 即可。
//!
//! | 领域错误 | ErrorCode | HTTP |
//! |---------|-----------|------|
//! | `LifecycleError::OperationNotFound` | RouteOperationNotFound | 404 |
//! | `LifecycleError::InvalidTransition` | InvalidTransition | 409 |
//! | `LifecycleError::QuantityMismatch` | QuantityMismatch | 422 |
//! | `EditError::ExecutorLimitReached` | ExecutorLimitReached | 422 |
//! | `PayloadError::TooLarge` | PayloadTooLarge | 413 |
//! | `PayloadError::*` | InvalidFormat | 400 |
//! | `RegistryError` | IdentifierExhausted | 500 |
//! | `StorageError` | DatabaseError / StorageCorrupted | 500 |

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

use crate::cards::{EditError, LifecycleError};
use crate::persistence::PayloadError;
use crate::registry::RegistryError;
use crate::storage::StorageError;

impl From<LifecycleError> for AppError {
    fn from(e: LifecycleError) -> Self {
        let message = e.to_string();
        match e {
            LifecycleError::OperationNotFound(id) => {
                AppError::with_message(ErrorCode::RouteOperationNotFound, message)
                    .with_detail("opId", id)
            }
            LifecycleError::InvalidTransition { transition, status } => {
                AppError::with_message(ErrorCode::InvalidTransition, message)
                    .with_detail("transition", transition.as_str())
                    .with_detail("status", status.as_str())
            }
            LifecycleError::QuantityMismatch {
                expected,
                good,
                scrap,
                hold,
                actual,
            } => AppError::with_message(ErrorCode::QuantityMismatch, message)
                .with_detail("expected", expected)
                .with_detail("good", good)
                .with_detail("scrap", scrap)
                .with_detail("hold", hold)
                .with_detail("actual", actual),
        }
    }
}

impl From<EditError> for AppError {
    fn from(e: EditError) -> Self {
        let message = e.to_string();
        match e {
            EditError::OperationNotFound(id) => {
                AppError::with_message(ErrorCode::RouteOperationNotFound, message)
                    .with_detail("opId", id)
            }
            EditError::ExecutorLimitReached { max } => {
                AppError::with_message(ErrorCode::ExecutorLimitReached, message)
                    .with_detail("max", max)
            }
            EditError::ExecutorIndexOutOfRange { index } => {
                AppError::with_message(ErrorCode::ValueOutOfRange, message)
                    .with_detail("index", index)
            }
        }
    }
}

impl From<PayloadError> for AppError {
    fn from(e: PayloadError) -> Self {
        match e {
            PayloadError::TooLarge { size, limit } => {
                AppError::payload_too_large(limit).with_detail("size", size)
            }
            other => AppError::with_message(ErrorCode::InvalidFormat, other.to_string()),
        }
    }
}

impl From<RegistryError> for AppError {
    fn from(e: RegistryError) -> Self {
        AppError::with_message(ErrorCode::IdentifierExhausted, e.to_string())
    }
}

impl From<StorageError> for AppError {
    fn from(e: StorageError) -> Self {
        let code = classify_storage_error(&e);
        tracing::error!(error = %e, error_code = ?code, "Storage error occurred");
        AppError::with_message(code, e.to_string())
    }
}

/// redb 错误没有稳定的分类，按消息内容识别数据损坏
fn classify_storage_error(e: &StorageError) -> ErrorCode {
    if let StorageError::Serialization(_) = e {
        return ErrorCode::StorageCorrupted;
    }
    let err_str = e.to_string().to_lowercase();
    if err_str.contains("corrupt") || err_str.contains("invalid database") {
        return ErrorCode::StorageCorrupted;
    }
    ErrorCode::DatabaseError
}
