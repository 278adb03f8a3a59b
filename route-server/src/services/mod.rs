//! 服务层
//!
//! - [`dataset`] - 数据集读写：阻塞的 redb 调用放到 `spawn_blocking`，
//!   所有写入都经过持久化合并层

pub mod dataset;
