//! Data models
//!
//! Shared between route-server and its clients (via API). The wire format is
//! camelCase JSON; deserialization is lenient, see [`serde_helpers`].

pub mod attachment;
pub mod card;
pub mod catalog;
pub mod dataset;
pub mod log_entry;
pub mod route_operation;
pub mod serde_helpers;
pub mod status;

// Re-exports
pub use attachment::*;
pub use card::*;
pub use catalog::*;
pub use dataset::*;
pub use log_entry::*;
pub use route_operation::*;
pub use status::*;
