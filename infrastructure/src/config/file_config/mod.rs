//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly with serde defaults, so any key may be
//! omitted.

mod facilitator;
mod storage;

pub use facilitator::FileFacilitatorConfig;
pub use storage::FileStorageConfig;

use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Facilitator gateway settings
    pub facilitator: FileFacilitatorConfig,
    /// Storage locations
    pub storage: FileStorageConfig,
}
