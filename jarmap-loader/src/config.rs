//! Runtime settings for the bootstrap worker

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Names the JSON file [`LoaderConfig::from_env`] reads.
pub const CONFIG_ENV: &str = "JARMAP_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoaderConfig {
    /// Dotted name of the class holding the entry point
    pub entry_class: String,
    pub entry_method: String,
    /// Pause between a successful load and the entry-point call
    pub settle_delay_ms: u64,
    /// Archive read at run time when none was embedded at build time
    pub archive_path: Option<PathBuf>,
    /// Used when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            entry_class: "EntryPoint".to_string(),
            entry_method: "init".to_string(),
            settle_delay_ms: 500,
            archive_path: None,
            log_filter: "info".to_string(),
        }
    }
}

impl LoaderConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Read the file named by [`CONFIG_ENV`], or fall back to defaults when
    /// the variable is unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_missing_fields_take_defaults() {
        let config = LoaderConfig::from_json(r#"{"entry_class": "com.example.Boot"}"#).unwrap();

        assert_eq!(
            config,
            LoaderConfig {
                entry_class: "com.example.Boot".to_string(),
                ..LoaderConfig::default()
            }
        );
        assert_eq!(config.settle_delay(), Duration::from_millis(500));
    }

    #[test]
    fn test_full_config() {
        let config = LoaderConfig::from_json(
            r#"{
                "entry_class": "a.B",
                "entry_method": "start",
                "settle_delay_ms": 0,
                "archive_path": "/tmp/app.jar",
                "log_filter": "jarmap_loader=debug"
            }"#,
        )
        .unwrap();

        assert_eq!(config.entry_method, "start");
        assert_eq!(config.settle_delay(), Duration::ZERO);
        assert_eq!(config.archive_path, Some(PathBuf::from("/tmp/app.jar")));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let err = LoaderConfig::from_json(r#"{"entry_klass": "a.B"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = LoaderConfig::from_file(Path::new("/nonexistent/jarmap.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/jarmap.json"));
    }
}
