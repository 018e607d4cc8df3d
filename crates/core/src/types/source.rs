//! Provenance of a product record.

use serde::{Deserialize, Serialize};

/// Where a product record lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// Served by the upstream catalog API.
    Api,
    /// Stored in local persisted storage only.
    Local,
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Api => write!(f, "api"),
            Self::Local => write!(f, "local"),
        }
    }
}
