//! Config discovery and layered loading

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Format, Serialized, Toml},
};
use std::path::PathBuf;

/// Discovers config files and merges them over the built-in defaults.
///
/// Sources, weakest first: the defaults, the per-user file under the
/// platform config directory, a `roundtable.toml` (or `.roundtable.toml`)
/// in the working directory, and finally an explicitly passed path. Later
/// sources override individual keys, never whole sections.
pub struct ConfigLoader;

impl ConfigLoader {
    pub fn load(config_path: Option<&PathBuf>) -> Result<FileConfig, Box<figment::Error>> {
        let mut sources: Vec<PathBuf> = Vec::new();
        if let Some(global) = Self::global_config_path().filter(|path| path.exists()) {
            sources.push(global);
        }
        if let Some(project) = Self::project_config_path() {
            sources.push(project);
        }
        if let Some(explicit) = config_path {
            sources.push(explicit.clone());
        }

        sources
            .into_iter()
            .fold(
                Figment::from(Serialized::defaults(FileConfig::default())),
                |figment, path| figment.merge(Toml::file(path)),
            )
            .extract()
            .map_err(Box::new)
    }

    /// The built-in defaults alone, for `--no-config`.
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// Per-user config location, `<config dir>/roundtable/config.toml`.
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("roundtable").join("config.toml"))
    }

    /// First existing project file, `roundtable.toml` before the hidden
    /// variant.
    pub fn project_config_path() -> Option<PathBuf> {
        ["roundtable.toml", ".roundtable.toml"]
            .into_iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_any_file() {
        let config = ConfigLoader::load_defaults();
        assert_eq!(config.facilitator.model, "gpt-5");
        assert!(!config.facilitator.offline);
        assert_eq!(config.storage.data_dir, PathBuf::from("./data"));
    }

    #[test]
    fn test_global_path_is_under_the_app_directory() {
        let path = ConfigLoader::global_config_path().unwrap();
        assert!(path.ends_with("roundtable/config.toml"));
    }

    #[test]
    fn test_explicit_file_overrides_only_its_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[facilitator]\ntimeout_secs = 5\noffline = true\n").unwrap();

        let config = ConfigLoader::load(Some(&path)).unwrap();
        assert_eq!(config.facilitator.timeout_secs, 5);
        assert!(config.facilitator.offline);
        // Keys the file does not mention keep their defaults
        assert_eq!(config.facilitator.model, "gpt-5");
        assert_eq!(config.storage.data_dir, PathBuf::from("./data"));
    }
}
