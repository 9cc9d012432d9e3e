//! Bot configuration file.

use derive_getters::Getters;
use plebiscite_error::{ConfigError, ConfigErrorKind, PlebisciteError, PlebisciteResult};
use plebiscite_vote::VoteConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration, read from TOML.
///
/// Every table is optional:
///
/// ```toml
/// [vote]
/// yes_emoji = "👍"
/// no_emoji = "👎"
/// cooldown_secs = 1800
/// expiration_secs = 300
/// required_yes_votes = 3
///
/// [database]
/// pool_size = 5
///
/// [logging]
/// level = "info"
/// json = false
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Getters)]
#[serde(default)]
pub struct BotConfig {
    /// Vote lifecycle settings.
    vote: VoteConfig,
    /// Connection pool settings.
    database: DatabaseConfig,
    /// Log output settings.
    logging: LoggingConfig,
}

/// Connection pool settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Maximum pooled connections.
    pool_size: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { pool_size: 5 }
    }
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset.
    level: String,
    /// Emit JSON lines instead of text.
    json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl BotConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> PlebisciteResult<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            PlebisciteError::from(ConfigError::new(ConfigErrorKind::Read {
                path: path.as_ref().display().to_string(),
                reason: e.to_string(),
            }))
        })?;
        Self::from_toml(&content)
    }

    /// Load the file if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> PlebisciteResult<Self> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> PlebisciteResult<Self> {
        let config: Self = toml::from_str(content).map_err(|e| {
            PlebisciteError::from(ConfigError::new(ConfigErrorKind::Parse(e.to_string())))
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> PlebisciteResult<()> {
        self.vote.validate()?;
        if self.database.pool_size == 0 {
            return Err(ConfigError::new(ConfigErrorKind::invalid(
                "database.pool_size",
                "must be at least 1",
            ))
            .into());
        }
        Ok(())
    }
}
