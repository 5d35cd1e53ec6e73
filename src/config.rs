use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use crate::upload::Environment;

pub const TEST_WEBHOOK_URL: &str =
    "https://xlk.ai/webhook-test/e943802d-4d29-48af-b02d-b3d6f49cce11";
pub const PRODUCTION_WEBHOOK_URL: &str =
    "https://xlk.ai/webhook/e943802d-4d29-48af-b02d-b3d6f49cce11";

const CONFIG_DIR_NAME: &str = "time-tracking-uploader";
const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// The two webhook endpoints, selected by the environment switch.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WebhookTargets {
    pub test: String,
    pub production: String,
}

impl Default for WebhookTargets {
    fn default() -> Self {
        Self {
            test: TEST_WEBHOOK_URL.to_string(),
            production: PRODUCTION_WEBHOOK_URL.to_string(),
        }
    }
}

impl WebhookTargets {
    pub fn url_for(&self, environment: Environment) -> &str {
        match environment {
            Environment::Test => &self.test,
            Environment::Production => &self.production,
        }
    }
}

/// Timing of the cosmetic progress bar shown while a request is in flight.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProgressSettings {
    pub tick_ms: u64,
    pub step: u8,
    /// Highest value shown before the response arrives. Values of 100 and
    /// above are clamped to 99 so that 100 always means "settled".
    pub ceiling: u8,
    pub reset_delay_ms: u64,
}

impl Default for ProgressSettings {
    fn default() -> Self {
        Self {
            tick_ms: 200,
            step: 10,
            ceiling: 90,
            reset_delay_ms: 2000,
        }
    }
}

impl ProgressSettings {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }

    pub fn reset_delay(&self) -> Duration {
        Duration::from_millis(self.reset_delay_ms)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub webhooks: WebhookTargets,
    pub progress: ProgressSettings,
}

impl AppConfig {
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Load the user config if present, otherwise the built-in defaults.
    /// A broken file is reported and ignored.
    pub fn load() -> Self {
        let path = Self::default_path();
        if !path.exists() {
            info!("No config file at {:?}, using built-in webhooks", path);
            return Self::default();
        }

        match Self::from_file(&path) {
            Ok(config) => {
                info!("Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                warn!("{}; falling back to defaults", e);
                Self::default()
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_builtin_webhooks() {
        let config = AppConfig::default();
        assert_eq!(config.webhooks.url_for(Environment::Test), TEST_WEBHOOK_URL);
        assert_eq!(
            config.webhooks.url_for(Environment::Production),
            PRODUCTION_WEBHOOK_URL
        );
        assert_eq!(config.progress.tick(), Duration::from_millis(200));
        assert_eq!(config.progress.reset_delay(), Duration::from_millis(2000));
    }

    #[test]
    fn test_partial_file_keeps_remaining_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[webhooks]\ntest = \"http://127.0.0.1:9000/hook\"").unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.webhooks.test, "http://127.0.0.1:9000/hook");
        assert_eq!(config.webhooks.production, PRODUCTION_WEBHOOK_URL);
        assert_eq!(config.progress, ProgressSettings::default());
    }

    #[test]
    fn test_malformed_file_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[webhooks\ntest = ").unwrap();

        let err = AppConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppConfig::from_file(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_zero_tick_is_clamped() {
        let settings = ProgressSettings {
            tick_ms: 0,
            ..ProgressSettings::default()
        };
        assert_eq!(settings.tick(), Duration::from_millis(1));
    }
}
