//! Application configuration.
//!
//! ```toml
//! initial-path = "/"
//! confirm-on-quit = true
//! tick-rate-ms = 100
//!
//! [logging]
//! enabled = true
//! level = "info"
//! directory = "logs"
//! file-name = "rat-router.log"
//! ```
//!
//! Every field is optional. `RUST_LOG` overrides `logging.level`.

use crate::error::{ConfigParseSnafu, ConfigReadSnafu, InvalidConfigSnafu, Result};
use serde::Deserialize;
use snafu::{ResultExt, ensure};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct RouterConfig {
    /// Location the history starts at.
    pub initial_path: String,
    /// Ask the active leave guards before quitting.
    pub confirm_on_quit: bool,
    /// Event poll interval of the application loop.
    pub tick_rate_ms: u64,
    pub logging: LoggingSettings,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            initial_path: "/".to_string(),
            confirm_on_quit: true,
            tick_rate_ms: 100,
            logging: LoggingSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct LoggingSettings {
    pub enabled: bool,
    pub level: String,
    pub directory: PathBuf,
    pub file_name: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            directory: PathBuf::from("logs"),
            file_name: "rat-router.log".to_string(),
        }
    }
}

impl RouterConfig {
    /// Load and validate configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).context(ConfigReadSnafu { path })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context(ConfigParseSnafu)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.initial_path.starts_with('/'),
            InvalidConfigSnafu {
                reason: format!("initial-path must start with '/', got '{}'", self.initial_path),
            }
        );
        ensure!(
            self.tick_rate_ms > 0,
            InvalidConfigSnafu {
                reason: "tick-rate-ms must be greater than zero",
            }
        );
        ensure!(
            !self.logging.level.trim().is_empty(),
            InvalidConfigSnafu {
                reason: "logging.level must not be empty",
            }
        );
        Ok(())
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::io::Write;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = RouterConfig::from_toml_str("").unwrap();
        assert_eq!(config, RouterConfig::default());
        assert_eq!(config.tick_rate(), Duration::from_millis(100));
    }

    #[test]
    fn test_parse_full_config() {
        let config = RouterConfig::from_toml_str(
            r#"
            initial-path = "/editor"
            confirm-on-quit = false
            tick-rate-ms = 50

            [logging]
            enabled = false
            level = "debug"
            directory = "/tmp/rat-router"
            file-name = "demo.log"
            "#,
        )
        .unwrap();

        assert_eq!(config.initial_path, "/editor");
        assert!(!config.confirm_on_quit);
        assert_eq!(config.tick_rate_ms, 50);
        assert!(!config.logging.enabled);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.directory, PathBuf::from("/tmp/rat-router"));
        assert_eq!(config.logging.file_name, "demo.log");
    }

    #[test]
    fn test_rejects_invalid_values() {
        let err = RouterConfig::from_toml_str(r#"initial-path = "editor""#).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));

        let err = RouterConfig::from_toml_str("tick-rate-ms = 0").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));

        let err = RouterConfig::from_toml_str("unknown = 1").unwrap_err();
        assert!(matches!(err, Error::ConfigParse { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "initial-path = \"/about\"").unwrap();

        let config = RouterConfig::load(file.path()).unwrap();
        assert_eq!(config.initial_path, "/about");

        let err = RouterConfig::load(Path::new("/nonexistent/rat-router.toml")).unwrap_err();
        assert!(matches!(err, Error::ConfigRead { .. }));
    }
}
