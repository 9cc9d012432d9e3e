//! Top-level error wrapper types.

use crate::{ConfigError, DatabaseError, PlatformError, VoteError};

/// Every error a Plebiscite operation can produce.
///
/// # Examples
///
/// ```
/// use plebiscite_error::{ConfigError, ConfigErrorKind, PlebisciteError};
///
/// let err: PlebisciteError = ConfigError::new(ConfigErrorKind::Parse("bad".into())).into();
/// assert!(format!("{}", err).contains("Configuration Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum PlebisciteErrorKind {
    /// User-correctable vote error
    #[from(VoteError)]
    Vote(VoteError),
    /// Storage error
    #[from(DatabaseError)]
    Database(DatabaseError),
    /// Chat platform error
    #[from(PlatformError)]
    Platform(PlatformError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
}

/// Plebiscite error with kind discrimination.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Plebiscite Error: {}", _0)]
pub struct PlebisciteError(Box<PlebisciteErrorKind>);

impl PlebisciteError {
    /// Create a new error from a kind.
    pub fn new(kind: PlebisciteErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &PlebisciteErrorKind {
        &self.0
    }

    /// Reply text for user-correctable errors, `None` for internal ones.
    ///
    /// ```
    /// use plebiscite_error::{DatabaseError, DatabaseErrorKind, PlebisciteError};
    ///
    /// let err: PlebisciteError = DatabaseError::new(DatabaseErrorKind::NotFound).into();
    /// assert!(err.user_message().is_none());
    /// ```
    pub fn user_message(&self) -> Option<String> {
        match self.kind() {
            PlebisciteErrorKind::Vote(e) => Some(e.kind.to_string()),
            _ => None,
        }
    }
}

// Generic From implementation for any type that converts to PlebisciteErrorKind
impl<T> From<T> for PlebisciteError
where
    T: Into<PlebisciteErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Plebiscite operations.
pub type PlebisciteResult<T> = std::result::Result<T, PlebisciteError>;
