//! Logging configuration.
//!
//! Read from YAML:
//!
//! ```yaml
//! level: info
//! log_dir: logs
//! file_name: relaylog.log
//! rotation: daily
//! json: true
//! console: true
//! redact_sensitive: true
//! max_report_depth: 64
//! ```
//!
//! Every field is optional. A missing file yields the defaults.

use std::path::{Path, PathBuf};

use relaylog_report::DEFAULT_MAX_DEPTH;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Default filter directive when neither config nor `RUST_LOG` set one.
pub const DEFAULT_LEVEL: &str = "info";

/// Default log file name inside `log_dir`.
pub const DEFAULT_FILE_NAME: &str = "relaylog.log";

const KNOWN_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read logging config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse logging config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// File rotation policy for the rolling appender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rotation {
    #[default]
    Daily,
    Hourly,
    Never,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `relaylog_logging=debug,warn`.
    pub level: String,
    /// Directory for the log file. No file output when unset.
    pub log_dir: Option<PathBuf>,
    pub file_name: String,
    pub rotation: Rotation,
    /// Write the file layer as JSON lines instead of plain text.
    pub json: bool,
    /// Mirror output to stdout.
    pub console: bool,
    /// Mask secrets in messages before they reach the subscriber.
    pub redact_sensitive: bool,
    /// Nested causes rendered per exception report.
    pub max_report_depth: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LEVEL.to_string(),
            log_dir: None,
            file_name: DEFAULT_FILE_NAME.to_string(),
            rotation: Rotation::default(),
            json: false,
            console: true,
            redact_sensitive: false,
            max_report_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl LoggingConfig {
    /// Parse a YAML document.
    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }

    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }

    /// Full path of the log file, if file output is configured.
    pub fn log_file_path(&self) -> Option<PathBuf> {
        self.log_dir.as_ref().map(|dir| dir.join(&self.file_name))
    }

    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::default();

        for directive in self.level.split(',').map(str::trim) {
            let level = directive.rsplit('=').next().unwrap_or(directive);
            if !KNOWN_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
                report.error("level", format!("Unknown level '{level}' in '{directive}'"));
            }
        }
        if self.file_name.trim().is_empty() {
            report.error("file_name", "File name cannot be empty");
        } else if self.file_name.contains(['/', '\\']) {
            report.error("file_name", "File name must not contain path separators");
        }
        if self.max_report_depth == 0 {
            report.warning(
                "max_report_depth",
                "Depth 0 renders only the outermost exception of every chain",
            );
        }
        if self.log_dir.is_none() && !self.console {
            report.warning("console", "No log_dir and console disabled: output is discarded");
        }

        report
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    pub path: String,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigIssue>,
    pub warnings: Vec<ConfigIssue>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigIssue {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warning(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigIssue {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Load a config file. A missing file yields [`LoggingConfig::default`].
pub fn load_config(path: &Path) -> Result<LoggingConfig, ConfigError> {
    if !path.exists() {
        debug!(path = %path.display(), "Logging config does not exist; using defaults");
        return Ok(LoggingConfig::default());
    }

    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = LoggingConfig::from_yaml(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    info!(path = %path.display(), "Loaded logging config");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert_eq!(config.max_report_depth, DEFAULT_MAX_DEPTH);
        assert!(config.validate().is_valid());
        assert!(config.log_file_path().is_none());
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = LoggingConfig::from_yaml("level: debug\nrotation: hourly\n").unwrap();
        assert_eq!(config.level, "debug");
        assert_eq!(config.rotation, Rotation::Hourly);
        assert_eq!(config.file_name, DEFAULT_FILE_NAME);
        assert!(config.console);
    }

    #[test]
    fn empty_yaml_is_default() {
        assert_eq!(LoggingConfig::from_yaml("  \n").unwrap(), LoggingConfig::default());
    }

    #[test]
    fn unknown_rotation_is_parse_error() {
        assert!(LoggingConfig::from_yaml("rotation: weekly").is_err());
    }

    #[test]
    fn log_file_path_joins_dir() {
        let config = LoggingConfig::default().with_log_dir("/var/log/app");
        assert_eq!(
            config.log_file_path(),
            Some(PathBuf::from("/var/log/app").join(DEFAULT_FILE_NAME))
        );
    }

    #[test]
    fn validation_flags_bad_values() {
        let config = LoggingConfig {
            level: "relaylog_logging=verbose,info".to_string(),
            file_name: "logs/app.log".to_string(),
            max_report_depth: 0,
            ..Default::default()
        };
        let report = config.validate();
        assert!(!report.is_valid());
        assert_eq!(report.errors.len(), 2);
        assert_eq!(report.errors[0].path, "level");
        assert_eq!(report.errors[1].path, "file_name");
        assert_eq!(report.warnings[0].path, "max_report_depth");
    }

    #[test]
    fn module_directives_accepted() {
        let config = LoggingConfig {
            level: "relaylog_logging=debug, warn".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_valid());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("absent.yaml")).unwrap();
        assert_eq!(config, LoggingConfig::default());
    }

    #[test]
    fn loads_file_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "level: warn\nlog_dir: /tmp/relaylog\njson: true\nredact_sensitive: true").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.level, "warn");
        assert_eq!(config.log_dir, Some(PathBuf::from("/tmp/relaylog")));
        assert!(config.json);
        assert!(config.redact_sensitive);
    }

    #[test]
    fn malformed_file_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "level: [unterminated").unwrap();

        let err = load_config(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("failed to parse logging config"));
    }
}
