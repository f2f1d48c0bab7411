#![warn(mismatched_lifetime_syntaxes)]
#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Error types for tempshare
//!
//! Errors are split by domain. Creation failures surface through these
//! types; teardown failures are logged where they happen and never reach
//! the caller.

use std::borrow::Cow;

use thiserror::Error;

pub mod config;
pub mod resource;

pub use config::ConfigError;
pub use resource::ResourceError;

/// Generic error type for cross-crate boundaries
#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("resource error: {0}")]
    Resource(#[from] ResourceError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an internal error with a message
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

/// Result type alias for tempshare operations
pub type Result<T> = std::result::Result<T, Error>;

/// Minimal interface for rendering user-facing error information.
pub trait UserFacingError {
    /// Short message suitable for CLI output.
    fn user_message(&self) -> Cow<'_, str>;

    /// Optional remediation hint.
    fn user_hint(&self) -> Option<&'static str> {
        None
    }

    /// Whether retrying the same operation is likely to succeed.
    fn is_retryable(&self) -> bool {
        false
    }

    /// Stable error code for structured reporting.
    fn user_code(&self) -> Option<&'static str> {
        None
    }
}

impl UserFacingError for Error {
    fn user_message(&self) -> Cow<'_, str> {
        match self {
            Error::Resource(err) => err.user_message(),
            Error::Config(err) => err.user_message(),
            Error::Internal(_) => Cow::Owned(self.to_string()),
        }
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Error::Resource(err) => err.user_hint(),
            Error::Config(err) => err.user_hint(),
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        match self {
            Error::Resource(err) => err.is_retryable(),
            _ => false,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        match self {
            Error::Resource(err) => err.user_code(),
            Error::Config(err) => err.user_code(),
            Error::Internal(_) => Some("error.internal"),
        }
    }
}
