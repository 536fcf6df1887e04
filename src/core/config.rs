use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_INTERVAL: i64 = 300;
pub const DEFAULT_PERIOD: i32 = 60;
pub const DEFAULT_END_TIME_OFFSET: i64 = 0;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Values used when the matching command-line flag is absent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Defaults {
    pub profile: Option<String>,
    pub region: Option<String>,
    pub scheme: Option<String>,
    pub interval: Option<i64>,
    pub period: Option<i32>,
    pub end_time_offset: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub defaults: Defaults,
}

impl AppConfig {
    /// Get the config file path, respecting XDG_CONFIG_HOME
    pub fn config_path() -> PathBuf {
        let config_dir = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("~"))
                    .join(".config")
            });
        config_dir.join("metrics-cloudwatch").join("config.toml")
    }

    /// Load config from an explicit path, or from the default path when none
    /// is given. Only a missing default file falls back to defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => {
                let path = Self::config_path();
                if !path.exists() {
                    return Ok(Self::default());
                }
                Self::load_from(&path)
            }
        }
    }

    fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::ParseError {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Validate the config
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if let Some(interval) = self.defaults.interval {
            if interval <= 0 {
                issues.push(format!("Invalid interval: {} (must be positive)", interval));
            }
        }
        if let Some(period) = self.defaults.period {
            if period <= 0 {
                issues.push(format!("Invalid period: {} (must be positive)", period));
            }
        }
        if let Some(offset) = self.defaults.end_time_offset {
            if offset < 0 {
                issues.push(format!(
                    "Invalid end_time_offset: {} (must not be negative)",
                    offset
                ));
            }
        }
        if self.defaults.region.as_deref() == Some("") {
            issues.push("Invalid region: empty string".to_string());
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        let issues = config.validate();
        assert!(issues.is_empty(), "Default config should be valid, got: {:?}", issues);
    }

    #[test]
    fn validate_catches_non_positive_period() {
        let mut config = AppConfig::default();
        config.defaults.period = Some(0);
        let issues = config.validate();
        assert!(issues.iter().any(|i| i.contains("period")));
    }

    #[test]
    fn validate_catches_negative_interval_and_offset() {
        let mut config = AppConfig::default();
        config.defaults.interval = Some(-5);
        config.defaults.end_time_offset = Some(-1);
        let issues = config.validate();
        assert!(issues.iter().any(|i| i.contains("interval")));
        assert!(issues.iter().any(|i| i.contains("end_time_offset")));
    }

    #[test]
    fn validate_catches_empty_region() {
        let mut config = AppConfig::default();
        config.defaults.region = Some(String::new());
        assert!(config.validate().iter().any(|i| i.contains("region")));
    }

    #[test]
    fn parse_defaults_toml() {
        let toml = r#"
[defaults]
profile = "monitoring"
region = "eu-west-1"
scheme = "aws.cloudwatch"
interval = 600
period = 300
"#;
        let config: AppConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.defaults.profile.as_deref(), Some("monitoring"));
        assert_eq!(config.defaults.region.as_deref(), Some("eu-west-1"));
        assert_eq!(config.defaults.scheme.as_deref(), Some("aws.cloudwatch"));
        assert_eq!(config.defaults.interval, Some(600));
        assert_eq!(config.defaults.period, Some(300));
        assert_eq!(config.defaults.end_time_offset, None);
    }

    #[test]
    fn parse_empty_toml_gives_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn load_missing_explicit_path_is_an_error() {
        let path = std::env::temp_dir().join("metrics-cloudwatch-no-such-config.toml");
        let err = AppConfig::load(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
    }

    #[test]
    fn load_rejects_malformed_file() {
        let path = std::env::temp_dir().join(format!(
            "metrics-cloudwatch-bad-{}.toml",
            std::process::id()
        ));
        std::fs::write(&path, "[defaults]\nperiod = \"sixty\"\n").unwrap();
        let result = AppConfig::load(Some(&path));
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn config_path_uses_xdg_when_set() {
        std::env::set_var("XDG_CONFIG_HOME", "/tmp/test_xdg_config");
        let path = AppConfig::config_path();
        std::env::remove_var("XDG_CONFIG_HOME");
        assert_eq!(
            path,
            PathBuf::from("/tmp/test_xdg_config/metrics-cloudwatch/config.toml")
        );
    }
}
