//! Configuration loading and log level resolution
//!
//! Settings are resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{Error, Result};

/// Environment variable naming the config file
pub const ENV_CONFIG: &str = "ADC_CONFIG";

/// Environment variable overriding the log level
pub const ENV_LOGLEVEL: &str = "ADC_LOGLEVEL";

/// Log level used when nothing else is configured
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Accepted log level names
pub const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Contents of `config.toml`
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct AdcConfig {
    pub logging: LoggingConfig,
    pub augmentation: AugmentationConfig,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct AugmentationConfig {
    /// Seed for augmentation filters that are not given one explicitly
    pub seed: Option<u64>,
}

impl AdcConfig {
    /// Parse config from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid config: {}", e)))
    }

    /// Load config from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Cannot read config file {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Locate and load the config file.
    ///
    /// An explicitly named file (CLI or environment) must exist and parse.
    /// The per-user default file is optional; when absent, defaults apply.
    pub fn resolve(cli_path: Option<&Path>) -> Result<Self> {
        match resolve_config_path(cli_path) {
            ConfigPath::Explicit(path) => Self::load(&path),
            ConfigPath::Default(path) if path.exists() => Self::load(&path),
            ConfigPath::Default(path) => {
                tracing::debug!(path = %path.display(), "No config file, using defaults");
                Ok(Self::default())
            }
            ConfigPath::None => Ok(Self::default()),
        }
    }

    /// Effective log level: CLI > `ADC_LOGLEVEL` > config file > default
    pub fn log_level(&self, cli_level: Option<&str>) -> Result<String> {
        let level = cli_level
            .map(str::to_string)
            .or_else(|| std::env::var(ENV_LOGLEVEL).ok().filter(|l| !l.is_empty()))
            .or_else(|| self.logging.level.clone())
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string())
            .to_ascii_lowercase();

        if LOG_LEVELS.contains(&level.as_str()) {
            Ok(level)
        } else {
            Err(Error::Config(format!(
                "Invalid log level '{}', expected one of: {}",
                level,
                LOG_LEVELS.join(", ")
            )))
        }
    }
}

/// Where the config file comes from
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigPath {
    /// Named on the command line or via `ADC_CONFIG`
    Explicit(PathBuf),
    /// Per-user default location
    Default(PathBuf),
    /// Platform has no config directory
    None,
}

/// Resolve the config file location
pub fn resolve_config_path(cli_path: Option<&Path>) -> ConfigPath {
    if let Some(path) = cli_path {
        return ConfigPath::Explicit(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(ENV_CONFIG) {
        if !path.is_empty() {
            return ConfigPath::Explicit(PathBuf::from(path));
        }
    }

    match dirs::config_dir() {
        Some(dir) => ConfigPath::Default(dir.join("adc").join("config.toml")),
        None => ConfigPath::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config = AdcConfig::from_toml_str(
            r#"
            [logging]
            level = "debug"

            [augmentation]
            seed = 42
            "#,
        )
        .unwrap();
        assert_eq!(config.logging.level.as_deref(), Some("debug"));
        assert_eq!(config.augmentation.seed, Some(42));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        assert_eq!(AdcConfig::from_toml_str("").unwrap(), AdcConfig::default());
    }

    #[test]
    fn test_malformed_config_is_error() {
        assert!(matches!(
            AdcConfig::from_toml_str("[logging\nlevel ="),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_cli_path_is_explicit() {
        let path = Path::new("/tmp/some.toml");
        assert_eq!(
            resolve_config_path(Some(path)),
            ConfigPath::Explicit(path.to_path_buf())
        );
    }
}
