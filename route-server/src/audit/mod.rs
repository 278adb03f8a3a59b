//! 审计日志模块：卡片级字段变更追踪
//!
//! # 架构
//!
//! ```text
//! 生命周期引擎 / 字段编辑 / diff()
//!   └─ 产出 LogChange (无 id / ts)
//!        └─ append_logs(card, changes, now)  ← 唯一的追加入口
//!             └─ card.logs (append-only)
//! ```
//!
//! 日志一旦追加即不可变，展示时可以按 `ts` 稳定排序，但不会改写存储顺序。

pub mod diff;
pub mod history;
pub mod log;

pub use diff::diff;
pub use history::{build_executor_history, format_history};
pub use log::{LogChange, actions, append_logs, format_seconds, record_log, sorted_logs};
