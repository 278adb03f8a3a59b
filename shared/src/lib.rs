//! Shared types for the route card tracker
//!
//! Domain models, the unified error system and small utilities used by
//! route-server and its tests.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use axum::{Json, body};
pub use http;
pub use serde::{Deserialize, Serialize};

pub use models::{
    Attachment, Card, CardStatus, Dataset, LogEntry, Operation, OperationStatus, ProcessState,
    RouteOperation, WorkCenter,
};
