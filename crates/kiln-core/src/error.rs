//! Unified error handling for Kiln Core.
//!
//! [`KilnError`] wraps the domain and application errors and gives every
//! failure a stable, machine-readable [`ErrorCode`] alongside the human
//! message and user-actionable suggestions.

use serde::{Serialize, Serializer, ser::SerializeStruct};
use thiserror::Error;

use crate::application::error::{FileSystemError, RenderError};
use crate::domain::error::{BlueprintError, BlueprintNotFound, ValidationError};

/// Root error type for Kiln Core operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KilnError {
    /// The request is incomplete or contradictory.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No blueprint serves the requested axis combination.
    #[error(transparent)]
    BlueprintNotFound(#[from] BlueprintNotFound),

    /// A template or predicate failed; nothing was written.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Writing failed; the transaction was rolled back.
    #[error(transparent)]
    FileSystem(#[from] FileSystemError),

    /// A blueprint definition could not be loaded.
    #[error(transparent)]
    Blueprint(#[from] BlueprintError),

    /// Configuration or setup errors.
    #[error("configuration error: {message}")]
    Configuration { message: String },
}

/// Stable, machine-readable error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorCode {
    Validation,
    BlueprintNotFound,
    Render,
    Filesystem,
    InvalidBlueprint,
    Configuration,
}

impl ErrorCode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::BlueprintNotFound => "blueprint-not-found",
            Self::Render => "render",
            Self::Filesystem => "filesystem",
            Self::InvalidBlueprint => "invalid-blueprint",
            Self::Configuration => "configuration",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error categories for UI display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Configuration,
    Internal,
}

impl KilnError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation(_) => ErrorCode::Validation,
            Self::BlueprintNotFound(_) => ErrorCode::BlueprintNotFound,
            Self::Render(_) => ErrorCode::Render,
            Self::FileSystem(_) => ErrorCode::Filesystem,
            Self::Blueprint(_) => ErrorCode::InvalidBlueprint,
            Self::Configuration { .. } => ErrorCode::Configuration,
        }
    }

    /// Get error category for display/styling purposes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation(_) => ErrorCategory::Validation,
            Self::BlueprintNotFound(_) => ErrorCategory::NotFound,
            Self::Configuration { .. } | Self::Blueprint(_) => ErrorCategory::Configuration,
            Self::Render(_) | Self::FileSystem(_) => ErrorCategory::Internal,
        }
    }

    /// Whether retrying the same request later could succeed.
    ///
    /// Only filesystem failures qualify; every other error means the request
    /// (or a blueprint) has to change.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::FileSystem(_))
    }

    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Validation(e) => e.suggestions(),
            Self::BlueprintNotFound(e) => e.suggestions(),
            Self::Render(e) => e.suggestions(),
            Self::FileSystem(e) => e.suggestions(),
            Self::Blueprint(e) => e.suggestions(),
            Self::Configuration { .. } => vec![
                "Check your configuration with: kiln config list".into(),
            ],
        }
    }
}

impl Serialize for KilnError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("KilnError", 4)?;
        s.serialize_field("code", &self.code())?;
        s.serialize_field("message", &self.to_string())?;
        s.serialize_field("retryable", &self.is_retryable())?;
        s.serialize_field("suggestions", &self.suggestions())?;
        s.end()
    }
}

/// Convenient result type alias.
pub type KilnResult<T> = Result<T, KilnError>;
