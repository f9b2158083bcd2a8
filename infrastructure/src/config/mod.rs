//! Configuration file loading for roundtable
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `--config <path>` specified file
//! 2. Project root: `./roundtable.toml` or `./.roundtable.toml`
//! 3. XDG config: `$XDG_CONFIG_HOME/roundtable/config.toml`
//! 4. Fallback: `~/.config/roundtable/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{FileConfig, FileFacilitatorConfig, FileStorageConfig};
pub use loader::ConfigLoader;
