//! Logging configuration and initialization.

use std::path::Path;
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

use crate::error::{ConfigError, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::InvalidValue {
                field: "LOG_FORMAT",
                reason: format!("expected 'pretty' or 'json', got '{other}'"),
            }),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,
    pub format: LogFormat,
    /// Extra sink written alongside stderr.
    pub file_path: Option<PathBuf>,
}

impl LoggingSettings {
    /// Map a `LOG_LEVEL` name to a tracing level directive.
    ///
    /// `WARNING` and `CRITICAL` are accepted as aliases for `warn` and `error`.
    pub fn parse_level(value: &str) -> std::result::Result<String, ConfigError> {
        let level = match value.trim().to_ascii_uppercase().as_str() {
            "TRACE" => "trace",
            "DEBUG" => "debug",
            "INFO" => "info",
            "WARN" | "WARNING" => "warn",
            "ERROR" | "CRITICAL" => "error",
            _ => {
                return Err(ConfigError::InvalidValue {
                    field: "LOG_LEVEL",
                    reason: format!(
                        "'{value}' is not one of DEBUG, INFO, WARNING, ERROR, CRITICAL"
                    ),
                })
            }
        };
        Ok(level.to_string())
    }

    /// Lower the level for `-v` flags on the command line.
    #[must_use]
    pub fn with_verbosity(mut self, verbose: u8) -> Self {
        match verbose {
            0 => {}
            1 => self.level = "debug".into(),
            _ => self.level = "trace".into(),
        }
        self
    }

    /// Initialize the tracing subscriber with this logging configuration.
    ///
    /// The returned guard flushes the file sink and must be held until exit.
    #[allow(clippy::result_large_err)]
    pub fn init(&self) -> Result<Option<WorkerGuard>> {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));

        let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();
        layers.push(match self.format {
            LogFormat::Json => fmt::layer().json().with_writer(std::io::stderr).boxed(),
            LogFormat::Pretty => fmt::layer().with_writer(std::io::stderr).boxed(),
        });

        let guard = match &self.file_path {
            Some(path) => {
                let (writer, guard) = file_writer(path)?;
                layers.push(match self.format {
                    LogFormat::Json => fmt::layer().json().with_writer(writer).boxed(),
                    LogFormat::Pretty => fmt::layer().with_ansi(false).with_writer(writer).boxed(),
                });
                Some(guard)
            }
            None => None,
        };

        tracing_subscriber::registry().with(layers).with(filter).init();
        Ok(guard)
    }
}

#[allow(clippy::result_large_err)]
fn file_writer(path: &Path) -> Result<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    let file_name = path.file_name().ok_or_else(|| ConfigError::InvalidValue {
        field: "LOG_FILE_PATH",
        reason: format!("'{}' does not name a file", path.display()),
    })?;
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(directory)?;

    let appender = tracing_appender::rolling::never(directory, file_name);
    Ok(tracing_appender::non_blocking(appender))
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Pretty,
            file_path: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_aliases_map_to_tracing_levels() {
        assert_eq!(LoggingSettings::parse_level("WARNING").unwrap(), "warn");
        assert_eq!(LoggingSettings::parse_level("critical").unwrap(), "error");
        assert_eq!(LoggingSettings::parse_level(" Info ").unwrap(), "info");
    }

    #[test]
    fn unknown_level_is_rejected() {
        let err = LoggingSettings::parse_level("LOUD").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { field: "LOG_LEVEL", .. }));
    }

    #[test]
    fn format_parses_case_insensitively() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn verbosity_overrides_level() {
        let settings = LoggingSettings::default();
        assert_eq!(settings.clone().with_verbosity(0).level, "info");
        assert_eq!(settings.clone().with_verbosity(1).level, "debug");
        assert_eq!(settings.with_verbosity(3).level, "trace");
    }
}
