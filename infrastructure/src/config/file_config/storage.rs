//! Storage configuration from TOML (`[storage]` section)
//!
//! Example configuration:
//!
//! ```toml
//! [storage]
//! data_dir = "./data"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw storage configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStorageConfig {
    /// Directory holding session state, document versions, and the round log
    pub data_dir: PathBuf,
}

impl Default for FileStorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
        }
    }
}
