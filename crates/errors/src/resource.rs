//! Resource lifecycle error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum ResourceError {
    /// The physical close of a resource failed. Never surfaced by teardown
    /// paths; logged at the `ManagedResource` boundary instead.
    #[error("failed to close {name}: {message}")]
    CloseFailed { name: String, message: String },

    #[error("resource already attached to this manager: {name}")]
    DuplicateName { name: String },

    #[error("invalid suffix {suffix:?}: {reason}")]
    InvalidSuffix { suffix: String, reason: String },

    #[error("failed to create resource in {dir}: {message}")]
    CreateFailed { dir: String, message: String },
}

impl ResourceError {
    /// Build a `CloseFailed` from an I/O error
    #[must_use]
    pub fn close_failed(name: impl Into<String>, err: &std::io::Error) -> Self {
        Self::CloseFailed {
            name: name.into(),
            message: err.to_string(),
        }
    }

    /// Build a `CreateFailed` from an I/O error raised inside `dir`
    #[must_use]
    pub fn create_failed(dir: &std::path::Path, err: &std::io::Error) -> Self {
        Self::CreateFailed {
            dir: dir.display().to_string(),
            message: err.to_string(),
        }
    }
}

impl UserFacingError for ResourceError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::DuplicateName { .. } => {
                Some("Release the existing resource first or create it from another manager.")
            }
            Self::InvalidSuffix { .. } => {
                Some("Use a plain file extension such as `.csv` or `.csv.gz`.")
            }
            Self::CreateFailed { .. } => {
                Some("Check that the temp directory exists and is writable.")
            }
            Self::CloseFailed { .. } => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self, Self::CreateFailed { .. })
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::CloseFailed { .. } => "resource.close_failed",
            Self::DuplicateName { .. } => "resource.duplicate_name",
            Self::InvalidSuffix { .. } => "resource.invalid_suffix",
            Self::CreateFailed { .. } => "resource.create_failed",
        };
        Some(code)
    }
}
