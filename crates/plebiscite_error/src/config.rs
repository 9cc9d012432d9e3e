//! Startup configuration errors.

/// What went wrong while loading settings or setting up logging.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum ConfigErrorKind {
    /// The config file could not be read.
    #[display("Failed to read {path}: {reason}")]
    Read {
        /// File that was requested.
        path: String,
        /// IO failure.
        reason: String,
    },

    /// The config file is not valid TOML for the expected shape.
    #[display("Failed to parse config: {_0}")]
    Parse(String),

    /// A setting parsed but is out of range.
    #[display("Invalid {field}: {reason}")]
    Invalid {
        /// Dotted setting name, e.g. `vote.expiration_secs`.
        field: &'static str,
        /// Why the value was refused.
        reason: String,
    },

    /// The log filter or subscriber could not be installed.
    #[display("Logging setup failed: {_0}")]
    Logging(String),
}

impl ConfigErrorKind {
    /// Shorthand for [`ConfigErrorKind::Invalid`].
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Configuration error with source location.
///
/// ```
/// use plebiscite_error::{ConfigError, ConfigErrorKind};
///
/// let err = ConfigError::new(ConfigErrorKind::invalid("database.pool_size", "must be at least 1"));
/// assert!(err.to_string().contains("Invalid database.pool_size"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Configuration Error: {} at line {} in {}", kind, line, file)]
pub struct ConfigError {
    /// What failed.
    pub kind: ConfigErrorKind,
    /// Line number where the error was created.
    pub line: u32,
    /// File where the error was created.
    pub file: &'static str,
}

impl ConfigError {
    /// Create a new ConfigError at the caller's location.
    #[track_caller]
    pub fn new(kind: ConfigErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_error_names_the_file() {
        let err = ConfigError::new(ConfigErrorKind::Read {
            path: "plebiscite.toml".into(),
            reason: "permission denied".into(),
        });
        assert_eq!(
            err.kind.to_string(),
            "Failed to read plebiscite.toml: permission denied"
        );
        assert!(err.file.ends_with("config.rs"));
    }
}
