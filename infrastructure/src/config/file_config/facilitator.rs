//! Facilitator gateway configuration from TOML (`[facilitator]` section)
//!
//! Controls which model drives question generation and answer merging,
//! and how long a gateway call may run before the deterministic fallback
//! takes over.
//!
//! Example configuration:
//!
//! ```toml
//! [facilitator]
//! model = "gpt-5"
//! api_key_env = "OPENAI_API_KEY"
//! timeout_secs = 60
//! offline = false
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw facilitator configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileFacilitatorConfig {
    /// Chat model used for question generation and merging
    pub model: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Per-call timeout before the fallback substitutes
    pub timeout_secs: u64,
    /// Skip the remote gateway entirely and run on stub output
    pub offline: bool,
}

impl Default for FileFacilitatorConfig {
    fn default() -> Self {
        Self {
            model: crate::facilitator::DEFAULT_MODEL.to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_secs: 60,
            offline: false,
        }
    }
}

impl FileFacilitatorConfig {
    /// Per-call timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Read the API key from the configured environment variable
    ///
    /// Returns None when the variable is unset or empty, which the
    /// wiring treats the same as `offline = true`.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facilitator_config_default() {
        let config = FileFacilitatorConfig::default();
        assert_eq!(config.model, "gpt-5");
        assert_eq!(config.api_key_env, "OPENAI_API_KEY");
        assert_eq!(config.timeout(), Duration::from_secs(60));
        assert!(!config.offline);
    }

    #[test]
    fn test_facilitator_config_deserialize() {
        let toml_str = r#"
[facilitator]
model = "gpt-4o-mini"
timeout_secs = 5
offline = true
"#;
        let config: super::super::FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.facilitator.model, "gpt-4o-mini");
        assert_eq!(config.facilitator.timeout(), Duration::from_secs(5));
        assert!(config.facilitator.offline);
        // Defaults should apply to omitted keys
        assert_eq!(config.facilitator.api_key_env, "OPENAI_API_KEY");
    }

    #[test]
    fn test_api_key_missing_variable_is_none() {
        let config = FileFacilitatorConfig {
            api_key_env: "ROUNDTABLE_TEST_UNSET_KEY_VAR".to_string(),
            ..Default::default()
        };
        assert!(config.api_key().is_none());
    }

    #[test]
    fn test_api_key_reads_configured_variable() {
        // PATH is set and non-empty in any environment the tests run in
        let config = FileFacilitatorConfig {
            api_key_env: "PATH".to_string(),
            ..Default::default()
        };
        assert!(config.api_key().is_some());
    }
}
