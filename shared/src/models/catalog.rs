//! Catalog Models

use serde::{Deserialize, Serialize};

use super::serde_helpers as lenient;

/// Catalog operation: a reusable kind of manufacturing step
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Operation {
    #[serde(deserialize_with = "lenient::string")]
    pub id: String,
    /// Unique across the catalog and every route operation
    #[serde(deserialize_with = "lenient::string")]
    pub code: String,
    #[serde(deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(deserialize_with = "lenient::string")]
    pub desc: String,
    /// Recommended duration in minutes
    #[serde(deserialize_with = "lenient::count")]
    pub rec_time: u32,
}

/// Work center (production resource or location)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkCenter {
    #[serde(deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(deserialize_with = "lenient::string")]
    pub desc: String,
}
