//! 持久化合并层
//!
//! 客户端提交完整数据集 `(cards, ops, centers)`，这里把它变成可以作为
//! 新基线的规范数据集：
//!
//! ```text
//! 请求体 ─▶ parse_object (大小 / JSON 校验)
//!        ─▶ normalize_dataset
//!        ─▶ ensure_identifiers (全数据集去重)
//!        ─▶ merge_dataset (保留 created_at / initial_snapshot)
//!        ─▶ DatasetStorage::update (单个 redb 写事务内提交)
//! ```
//!
//! [`submit`] 本身是纯函数，由存储层在写事务内调用，
//! 因此读-改-写对并发提交是互斥的。

pub mod merge;
pub mod normalize;
pub mod payload;

use shared::models::Dataset;

use crate::registry::{RegistryResult, ensure_identifiers};

pub use merge::{merge_card, merge_dataset};
pub use normalize::{normalize_card, normalize_dataset, renumber_auto_codes};
pub use payload::{PayloadError, parse_object};

/// 规范化 → 标识符去重 → 合并，返回待提交的数据集
pub fn submit(stored: &Dataset, mut incoming: Dataset, now: i64) -> RegistryResult<Dataset> {
    normalize_dataset(&mut incoming, now);
    ensure_identifiers(&mut incoming)?;
    merge_dataset(stored, &mut incoming, now);
    Ok(incoming)
}
