//! Route Server - 工艺路线卡生产跟踪服务
//!
//! # 架构概述
//!
//! - **注册表** (`registry`): 条码、工序编码与卡片标识分配
//! - **卡片** (`cards`): 工序生命周期、字段编辑、创建/复制/归档
//! - **审计** (`audit`): 追加式字段变更日志与执行人历史
//! - **持久化** (`persistence`): 数据集规范化、合并与请求体解析
//! - **存储** (`storage`): 嵌入式 redb 数据集存储
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! route-server/src/
//! ├── core/          # 配置、状态、错误
//! ├── registry/      # 标识分配
//! ├── cards/         # 卡片领域逻辑
//! ├── audit/         # 变更日志
//! ├── persistence/   # 提交流水线
//! ├── storage/       # redb
//! ├── services/      # 数据集服务
//! ├── api/           # HTTP 路由和处理器
//! └── utils/         # 时钟、日志、错误转换
//! ```

pub mod api;
pub mod audit;
pub mod cards;
pub mod core;
pub mod persistence;
pub mod registry;
pub mod services;
pub mod storage;
pub mod utils;

// Re-export 公共类型
pub use core::{Config, Server, ServerState};
pub use storage::DatasetStorage;
pub use utils::{AppError, AppResult, Clock, ManualClock, SystemClock};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// 加载 `.env`、创建工作目录并初始化日志
pub fn setup_environment() -> core::Result<Config> {
    // .env 不存在时忽略
    let _ = dotenv::dotenv();

    let config = Config::from_env();
    config.ensure_work_dir_structure()?;

    let logs_dir = config.logs_dir();
    init_logger_with_file(
        Some(&config.log_level),
        config.log_json,
        config.is_production().then_some(logs_dir.as_path()),
    );
    Ok(config)
}
