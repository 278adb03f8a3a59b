//! 工具模块
//!
//! - [`AppError`] - 应用错误类型 (from shared::error)
//! - [`clock`] - 时钟能力
//! - [`logger`] - 日志初始化

pub mod clock;
pub mod error;
pub mod logger;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
