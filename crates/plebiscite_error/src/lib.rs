//! Error types for Plebiscite.
//!
//! This crate provides the error types shared by every Plebiscite crate.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! Errors split into two audiences. [`VoteError`] is user-correctable and its
//! kind text is shown verbatim to the requester. Everything else is internal:
//! it is logged and the requester only sees a generic notice.
//!
//! # Examples
//!
//! ```
//! use plebiscite_error::{PlebisciteResult, VoteError, VoteErrorKind};
//!
//! fn check_name(name: &str) -> PlebisciteResult<()> {
//!     if name.contains('`') {
//!         Err(VoteError::new(VoteErrorKind::NameContainsBacktick))?
//!     }
//!     Ok(())
//! }
//!
//! let err = check_name("a`b").unwrap_err();
//! assert!(err.user_message().is_some());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod database;
mod error;
mod platform;
mod vote;

pub use config::{ConfigError, ConfigErrorKind};
pub use database::{DatabaseError, DatabaseErrorKind};
pub use error::{PlebisciteError, PlebisciteErrorKind, PlebisciteResult};
pub use platform::{PlatformError, PlatformErrorKind};
pub use vote::{VoteError, VoteErrorKind};
