//! 标识符注册表
//!
//! 生成并去重两类全局标识符：
//!
//! - 卡片条码 (EAN-13，13 位数字含校验位)
//! - 工序代码 (`OP-XXXX`，目录与路线工序共用一个命名空间)
//!
//! 所有生成函数都是纯函数：调用方显式传入已占用集合，
//! 不存在模块级的全局状态，可以在并发请求中安全调用。

mod barcode;
mod op_code;
mod pass;

use thiserror::Error;

pub use barcode::{BARCODE_LEN, check_digit, is_valid_ean13, unique_barcode, unique_barcode_with};
pub use op_code::{step_code, unique_operation_code, unique_operation_code_with};
pub use pass::ensure_identifiers;

/// 注册表错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// 标识符空间已耗尽（实际数据量下不可能出现）
    #[error("identifier space exhausted: {kind}")]
    Exhausted { kind: &'static str },
}

pub type RegistryResult<T> = Result<T, RegistryError>;
