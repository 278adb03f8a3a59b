use thiserror::Error;

use crate::storage::StorageError;
use crate::utils::AppError;

/// 启动与运行期错误
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("存储初始化失败: {0}")]
    Storage(#[from] StorageError),

    #[error("示例数据写入失败: {0}")]
    Seed(#[from] AppError),

    #[error("内部服务器错误: {0}")]
    Internal(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;
