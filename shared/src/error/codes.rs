//! Unified error codes for the route card tracker
//!
//! This module defines all error codes used by route-server and its clients.
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 4xxx: Card and route operation errors
//! - 5xxx: Identifier registry errors
//! - 6xxx: Attachment errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Validation failed
    ValidationFailed = 2,
    /// Invalid format
    InvalidFormat = 6,
    /// Value out of range
    ValueOutOfRange = 8,
    /// Request body exceeds the configured ceiling
    PayloadTooLarge = 9,

    // ==================== 4xxx: Card ====================
    /// Card not found
    CardNotFound = 4001,
    /// Route operation not found on the card
    RouteOperationNotFound = 4101,
    /// Transition not allowed from the current operation status
    InvalidTransition = 4102,
    /// Produced counts do not reconcile with the planned quantity
    QuantityMismatch = 4103,
    /// Too many additional executors on one operation
    ExecutorLimitReached = 4104,

    // ==================== 5xxx: Identifier ====================
    /// Identifier space exhausted
    IdentifierExhausted = 5001,

    // ==================== 6xxx: Attachment ====================
    /// Attachment not found
    AttachmentNotFound = 6001,
    /// File too large
    FileTooLarge = 6002,
    /// Invalid file extension
    InvalidFileExtension = 6003,
    /// No filename provided
    NoFilename = 6004,
    /// Empty file provided
    EmptyFile = 6005,
    /// File content is not valid base64
    InvalidFileContent = 6006,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Storage corrupted (data file damaged)
    StorageCorrupted = 9403,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::ValueOutOfRange => "Value is out of range",
            ErrorCode::PayloadTooLarge => "Request body is too large",

            // Card
            ErrorCode::CardNotFound => "Card not found",
            ErrorCode::RouteOperationNotFound => "Route operation not found",
            ErrorCode::InvalidTransition => "Transition not allowed in the current status",
            ErrorCode::QuantityMismatch => "Counts do not match the planned quantity",
            ErrorCode::ExecutorLimitReached => "Additional executor limit reached",

            // Identifier
            ErrorCode::IdentifierExhausted => "No free identifier could be generated",

            // Attachment
            ErrorCode::AttachmentNotFound => "Attachment not found",
            ErrorCode::FileTooLarge => "File too large",
            ErrorCode::InvalidFileExtension => "Invalid file extension",
            ErrorCode::NoFilename => "No filename provided",
            ErrorCode::EmptyFile => "Empty file provided",
            ErrorCode::InvalidFileContent => "File content is not valid base64",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::StorageCorrupted => "Storage is corrupted",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error returned when a u16 does not map to a known [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            2 => Ok(ErrorCode::ValidationFailed),
            6 => Ok(ErrorCode::InvalidFormat),
            8 => Ok(ErrorCode::ValueOutOfRange),
            9 => Ok(ErrorCode::PayloadTooLarge),

            // Card
            4001 => Ok(ErrorCode::CardNotFound),
            4101 => Ok(ErrorCode::RouteOperationNotFound),
            4102 => Ok(ErrorCode::InvalidTransition),
            4103 => Ok(ErrorCode::QuantityMismatch),
            4104 => Ok(ErrorCode::ExecutorLimitReached),

            // Identifier
            5001 => Ok(ErrorCode::IdentifierExhausted),

            // Attachment
            6001 => Ok(ErrorCode::AttachmentNotFound),
            6002 => Ok(ErrorCode::FileTooLarge),
            6003 => Ok(ErrorCode::InvalidFileExtension),
            6004 => Ok(ErrorCode::NoFilename),
            6005 => Ok(ErrorCode::EmptyFile),
            6006 => Ok(ErrorCode::InvalidFileContent),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9403 => Ok(ErrorCode::StorageCorrupted),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::PayloadTooLarge.code(), 9);
        assert_eq!(ErrorCode::CardNotFound.code(), 4001);
        assert_eq!(ErrorCode::QuantityMismatch.code(), 4103);
        assert_eq!(ErrorCode::IdentifierExhausted.code(), 5001);
        assert_eq!(ErrorCode::InvalidFileExtension.code(), 6003);
        assert_eq!(ErrorCode::DatabaseError.code(), 9002);
    }

    #[test]
    fn test_try_from_valid() {
        assert_eq!(ErrorCode::try_from(2), Ok(ErrorCode::ValidationFailed));
        assert_eq!(ErrorCode::try_from(3), Err(InvalidErrorCode(3)));
        assert_eq!(ErrorCode::try_from(4102), Ok(ErrorCode::InvalidTransition));
        assert_eq!(ErrorCode::try_from(6001), Ok(ErrorCode::AttachmentNotFound));
        assert_eq!(ErrorCode::try_from(9403), Ok(ErrorCode::StorageCorrupted));
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(0), Err(InvalidErrorCode(0)));
        assert_eq!(ErrorCode::try_from(999), Err(InvalidErrorCode(999)));
        assert_eq!(ErrorCode::try_from(10000), Err(InvalidErrorCode(10000)));
    }

    #[test]
    fn test_serialize() {
        let json = serde_json::to_string(&ErrorCode::QuantityMismatch).unwrap();
        assert_eq!(json, "4103");
    }

    #[test]
    fn test_deserialize_invalid() {
        let result: Result<ErrorCode, _> = serde_json::from_str("1234");
        assert!(result.is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", ErrorCode::PayloadTooLarge), "9");
        assert_eq!(format!("{}", ErrorCode::CardNotFound), "4001");
    }

    #[test]
    fn test_message() {
        assert_eq!(ErrorCode::CardNotFound.message(), "Card not found");
        assert_eq!(ErrorCode::InternalError.message(), "Internal server error");
    }
}
