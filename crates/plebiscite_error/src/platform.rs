//! Chat platform error types.
//!
//! Raised by `ChatPlatform` implementations when a platform request fails for a
//! reason other than "the thing does not exist" (absence is modelled as `None`).

/// Chat platform error variants.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display)]
pub enum PlatformErrorKind {
    /// Platform API request failed (HTTP error, rate limit, gateway error).
    #[display("Platform request failed: {_0}")]
    Request(String),

    /// Connecting to the platform failed.
    #[display("Connection failed: {_0}")]
    ConnectionFailed(String),

    /// The platform refused the operation (HTTP 403): the bot lacks a
    /// permission or ranks too low.
    #[display("Insufficient permissions: {_0}")]
    InsufficientPermissions(String),
}

impl PlatformErrorKind {
    /// Classify a failed HTTP response by status code.
    ///
    /// ```
    /// use plebiscite_error::PlatformErrorKind;
    ///
    /// assert_eq!(
    ///     PlatformErrorKind::from_status(403, "Missing Permissions"),
    ///     PlatformErrorKind::InsufficientPermissions("Missing Permissions".into())
    /// );
    /// ```
    pub fn from_status(status: u16, detail: impl Into<String>) -> Self {
        match status {
            403 => Self::InsufficientPermissions(detail.into()),
            _ => Self::Request(detail.into()),
        }
    }
}

/// Chat platform error with source location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Platform Error: {} at line {} in {}", kind, line, file)]
pub struct PlatformError {
    /// The kind of error that occurred
    pub kind: PlatformErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl PlatformError {
    /// Create a new PlatformError with automatic location tracking.
    ///
    /// # Example
    /// ```
    /// use plebiscite_error::{PlatformError, PlatformErrorKind};
    ///
    /// let err = PlatformError::new(PlatformErrorKind::Request("502".into()));
    /// assert!(err.to_string().contains("502"));
    /// ```
    #[track_caller]
    pub fn new(kind: PlatformErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

#[cfg(feature = "discord")]
impl From<serenity::Error> for PlatformError {
    #[track_caller]
    fn from(err: serenity::Error) -> Self {
        let kind = match &err {
            serenity::Error::Http(serenity::http::HttpError::UnsuccessfulRequest(response)) => {
                PlatformErrorKind::from_status(response.status_code.as_u16(), err.to_string())
            }
            _ => PlatformErrorKind::Request(err.to_string()),
        };
        PlatformError::new(kind)
    }
}
