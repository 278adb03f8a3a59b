//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // 404 Not Found
            Self::CardNotFound
            | Self::RouteOperationNotFound
            | Self::AttachmentNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::InvalidTransition => StatusCode::CONFLICT,

            // 413 Payload Too Large
            Self::PayloadTooLarge | Self::FileTooLarge => StatusCode::PAYLOAD_TOO_LARGE,

            // 422 Unprocessable Entity (business rule, retryable after correction)
            Self::QuantityMismatch | Self::ExecutorLimitReached => {
                StatusCode::UNPROCESSABLE_ENTITY
            }

            // 500 Internal Server Error
            Self::InternalError
            | Self::DatabaseError
            | Self::StorageCorrupted
            | Self::IdentifierExhausted => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request (default for validation errors)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}
