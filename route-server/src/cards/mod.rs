//! 卡片领域逻辑
//!
//! - [`lifecycle`]: 工序状态机与计时
//! - [`status`]: 卡片状态聚合
//! - [`edits`]: 工序字段直接编辑
//! - [`factory`]: 创建、复制、归档、保存编辑

pub mod edits;
pub mod factory;
pub mod lifecycle;
pub mod status;

pub use edits::{
    CountKind, EditError, EditResult, ExecutorEdit, MAX_COMMENT_CHARS, OperationEdit,
    apply_executor_edit, apply_operation_edit,
};
pub use factory::{archive_card, create_card, duplicate_card, save_card_edit};
pub use lifecycle::{
    LifecycleError, LifecycleResult, Transition, apply_transition, effective_elapsed_seconds,
    run_transition,
};
pub use status::{aggregate, process_state, recalc_status};
