//! Application settings read from the environment.
//!
//! [`Settings::from_env`] reads the process environment (after `.env` has been
//! loaded by the binary); [`Settings::from_lookup`] reads any key/value source
//! and is what the tests use. Malformed values are rejected at load time,
//! while missing Square credentials are only reported by
//! [`Settings::require_square`] for the commands that talk to Square.

use std::path::{Path, PathBuf};
use std::time::Duration;

use super::logging::{LogFormat, LoggingSettings};
use crate::domain::entity::Platform;
use crate::error::{ConfigError, Result};

const DEFAULT_DATABASE_URL: &str = "closet_sync.db";
const DEFAULT_GRAPH_API_VERSION: &str = "v19.0";
const DEFAULT_DATA_DIR: &str = "data";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseSettings {
    pub url: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATABASE_URL.into(),
        }
    }
}

/// Square deployment the access token belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SquareEnvironment {
    #[default]
    Sandbox,
    Production,
}

impl SquareEnvironment {
    #[must_use]
    pub const fn base_url(self) -> &'static str {
        match self {
            Self::Sandbox => "https://connect.squareupsandbox.com",
            Self::Production => "https://connect.squareup.com",
        }
    }

    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl std::str::FromStr for SquareEnvironment {
    type Err = ConfigError;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sandbox" => Ok(Self::Sandbox),
            "production" => Ok(Self::Production),
            other => Err(ConfigError::InvalidValue {
                field: "SQUARE_ENVIRONMENT",
                reason: format!("expected 'sandbox' or 'production', got '{other}'"),
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SquareSettings {
    pub access_token: Option<String>,
    pub environment: SquareEnvironment,
    pub application_id: Option<String>,
}

/// Square credentials that are known to be present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SquareCredentials {
    pub access_token: String,
    pub environment: SquareEnvironment,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SocialSettings {
    pub instagram_access_token: Option<String>,
    pub instagram_business_account_id: Option<String>,
    pub facebook_access_token: Option<String>,
    pub facebook_page_id: Option<String>,
    pub tiktok_access_token: Option<String>,
    pub graph_api_version: String,
}

impl SocialSettings {
    /// Token and business account id, when both are set.
    #[must_use]
    pub fn instagram(&self) -> Option<(&str, &str)> {
        Some((
            self.instagram_access_token.as_deref()?,
            self.instagram_business_account_id.as_deref()?,
        ))
    }

    /// Token and page id, when both are set.
    #[must_use]
    pub fn facebook(&self) -> Option<(&str, &str)> {
        Some((
            self.facebook_access_token.as_deref()?,
            self.facebook_page_id.as_deref()?,
        ))
    }

    /// Platforms with enough credentials to sync, in a fixed order.
    #[must_use]
    pub fn configured_platforms(&self) -> Vec<Platform> {
        let mut platforms = Vec::new();
        if self.instagram().is_some() {
            platforms.push(Platform::Instagram);
        }
        if self.facebook().is_some() {
            platforms.push(Platform::Facebook);
        }
        if self.tiktok_access_token.is_some() {
            platforms.push(Platform::Tiktok);
        }
        platforms
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSettings {
    pub days_back: u32,
    pub quick_days: u32,
    pub health_check_timeout: Duration,
    pub data_dir: PathBuf,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            days_back: 30,
            quick_days: 7,
            health_check_timeout: Duration::from_secs(10),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }
}

/// Everything the binary needs, grouped by concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub square: SquareSettings,
    pub social: SocialSettings,
    pub logging: LoggingSettings,
    pub sync: SyncSettings,
}

impl Default for Settings {
    /// The settings of an empty environment.
    fn default() -> Self {
        Self {
            database: DatabaseSettings::default(),
            square: SquareSettings::default(),
            social: SocialSettings {
                graph_api_version: DEFAULT_GRAPH_API_VERSION.into(),
                ..SocialSettings::default()
            },
            logging: LoggingSettings::default(),
            sync: SyncSettings::default(),
        }
    }
}

impl Settings {
    /// Read settings from the process environment.
    #[allow(clippy::result_large_err)]
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings from an arbitrary key/value source.
    ///
    /// Blank values count as unset.
    #[allow(clippy::result_large_err)]
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let database = DatabaseSettings {
            url: get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.into()),
        };

        let square = SquareSettings {
            access_token: get("SQUARE_ACCESS_TOKEN"),
            environment: get("SQUARE_ENVIRONMENT")
                .map(|value| value.parse())
                .transpose()?
                .unwrap_or_default(),
            application_id: get("SQUARE_APPLICATION_ID"),
        };

        let social = SocialSettings {
            instagram_access_token: get("INSTAGRAM_ACCESS_TOKEN"),
            instagram_business_account_id: get("INSTAGRAM_BUSINESS_ACCOUNT_ID"),
            facebook_access_token: get("FACEBOOK_ACCESS_TOKEN"),
            facebook_page_id: get("FACEBOOK_PAGE_ID"),
            tiktok_access_token: get("TIKTOK_ACCESS_TOKEN"),
            graph_api_version: get("GRAPH_API_VERSION")
                .unwrap_or_else(|| DEFAULT_GRAPH_API_VERSION.into()),
        };

        let defaults = LoggingSettings::default();
        let logging = LoggingSettings {
            level: match get("LOG_LEVEL") {
                Some(level) => LoggingSettings::parse_level(&level)?,
                None => defaults.level,
            },
            format: get("LOG_FORMAT")
                .map(|value| value.parse::<LogFormat>())
                .transpose()?
                .unwrap_or(defaults.format),
            file_path: get("LOG_FILE_PATH").map(PathBuf::from),
        };

        let sync_defaults = SyncSettings::default();
        let sync = SyncSettings {
            days_back: parse_number(get("SYNC_DAYS_BACK"), "SYNC_DAYS_BACK")?
                .unwrap_or(sync_defaults.days_back),
            quick_days: parse_number(get("QUICK_SYNC_DAYS"), "QUICK_SYNC_DAYS")?
                .unwrap_or(sync_defaults.quick_days),
            health_check_timeout: parse_number(get("HEALTH_CHECK_TIMEOUT"), "HEALTH_CHECK_TIMEOUT")?
                .map_or(sync_defaults.health_check_timeout, |secs| {
                    Duration::from_secs(u64::from(secs))
                }),
            data_dir: get("DATA_DIR").map_or(sync_defaults.data_dir, PathBuf::from),
        };

        let settings = Self {
            database,
            square,
            social,
            logging,
            sync,
        };
        settings.validate()?;
        Ok(settings)
    }

    #[allow(clippy::result_large_err)]
    fn validate(&self) -> Result<()> {
        if self.sync.days_back == 0 {
            return Err(ConfigError::InvalidValue {
                field: "SYNC_DAYS_BACK",
                reason: "must be greater than 0".into(),
            }
            .into());
        }
        if self.sync.quick_days == 0 {
            return Err(ConfigError::InvalidValue {
                field: "QUICK_SYNC_DAYS",
                reason: "must be greater than 0".into(),
            }
            .into());
        }
        if self.sync.health_check_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "HEALTH_CHECK_TIMEOUT",
                reason: "must be greater than 0".into(),
            }
            .into());
        }
        Ok(())
    }

    /// Square credentials, for commands that cannot run without them.
    #[allow(clippy::result_large_err)]
    pub fn require_square(&self) -> Result<SquareCredentials> {
        let access_token = self
            .square
            .access_token
            .clone()
            .ok_or(ConfigError::MissingField {
                field: "SQUARE_ACCESS_TOKEN",
            })?;
        Ok(SquareCredentials {
            access_token,
            environment: self.square.environment,
        })
    }
}

#[allow(clippy::result_large_err)]
fn parse_number(value: Option<String>, field: &'static str) -> Result<Option<u32>> {
    value
        .map(|raw| {
            raw.parse::<u32>().map_err(|err| {
                ConfigError::InvalidValue {
                    field,
                    reason: format!("'{raw}' is not a whole number: {err}"),
                }
                .into()
            })
        })
        .transpose()
}

const ENV_TEMPLATE: &str = "\
# closet-sync configuration
# Copy this file to .env and fill in your actual values.

# Database
DATABASE_URL=closet_sync.db

# Square (required for sync and health)
# Credentials come from the Square Developer Dashboard.
SQUARE_ACCESS_TOKEN=your_square_access_token_here
# sandbox or production
SQUARE_ENVIRONMENT=sandbox
SQUARE_APPLICATION_ID=your_square_application_id_here

# Instagram Graph API (business or creator account)
INSTAGRAM_ACCESS_TOKEN=
INSTAGRAM_BUSINESS_ACCOUNT_ID=

# Facebook Graph API (page access token)
FACEBOOK_ACCESS_TOKEN=
FACEBOOK_PAGE_ID=

# TikTok Business API
TIKTOK_ACCESS_TOKEN=

GRAPH_API_VERSION=v19.0

# Logging
# DEBUG, INFO, WARNING, ERROR or CRITICAL
LOG_LEVEL=INFO
# pretty or json
LOG_FORMAT=pretty
# Optional file sink in addition to stderr
LOG_FILE_PATH=

# Sync
SYNC_DAYS_BACK=30
QUICK_SYNC_DAYS=7
# Seconds
HEALTH_CHECK_TIMEOUT=10
DATA_DIR=data
";

/// Write a commented `.env` template to `path`.
///
/// Never overwrites: an existing file is reported as
/// [`ConfigError::AlreadyExists`].
#[allow(clippy::result_large_err)]
pub fn write_env_template(path: &Path) -> Result<()> {
    if path.exists() {
        return Err(ConfigError::AlreadyExists(path.display().to_string()).into());
    }
    std::fs::write(path, ENV_TEMPLATE)?;
    Ok(())
}
