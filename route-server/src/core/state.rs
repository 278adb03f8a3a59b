//! 服务器状态
//!
//! 所有 handler 共享的依赖：配置、数据集存储、时钟。
//! 克隆开销很小 (内部全是 `Arc`)。

use std::sync::Arc;

use super::{Config, Result};
use crate::services::dataset;
use crate::storage::DatasetStorage;
use crate::utils::{Clock, SystemClock};

#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 数据集存储 (redb)
    pub storage: DatasetStorage,
    /// 时钟 (测试中替换为 ManualClock)
    pub clock: Arc<dyn Clock>,
}

impl ServerState {
    /// 手动构造，通常使用 [`ServerState::initialize`]
    pub fn new(config: Config, storage: DatasetStorage, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            storage,
            clock,
        }
    }

    /// 创建工作目录、打开数据库，空库时按配置写入示例数据
    pub async fn initialize(config: &Config) -> Result<Self> {
        config.ensure_work_dir_structure()?;

        let db_path = config.database_path();
        let storage = DatasetStorage::open(&db_path)?;
        tracing::info!(path = %db_path.display(), "Dataset storage opened");

        let state = Self::new(config.clone(), storage, Arc::new(SystemClock));
        if config.seed_demo_data {
            dataset::seed_if_empty(&state).await?;
        }
        Ok(state)
    }

    /// 当前时间 (Unix 毫秒)
    pub fn now(&self) -> i64 {
        self.clock.now_millis()
    }
}
