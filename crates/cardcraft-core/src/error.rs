//! Error types for Cardcraft operations.
//!
//! This module provides a common [`Error`] type and [`Result<T>`] alias used
//! across all Cardcraft crates. Uses `thiserror` for derive macros.
//!
//! The variants form a closed set so callers can distinguish failure causes
//! without string matching:
//!
//! - [`Error::Validation`]: rejected locally, before any network call
//! - [`Error::Upstream`]: a remote service answered with a failure
//! - [`Error::Transport`]: the request never completed (timeout, DNS, reset)
//! - [`Error::Config`]: a component could not be constructed from settings

use thiserror::Error;

/// Errors that can occur in Cardcraft operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Input rejected by local validation; no network call was made.
    #[error("{0}")]
    Validation(String),

    /// A remote service (content API, media provider, blob storage)
    /// reported a failure. `stage` names the operation that failed.
    #[error("{stage} failed: {detail}")]
    Upstream {
        /// The operation that failed, e.g. "audio generation".
        stage: String,
        /// Failure description, including the HTTP status where known.
        detail: String,
    },

    /// The request never completed: timeout, DNS failure, connection reset.
    #[error("request failed: {0}")]
    Transport(String),

    /// A component could not be constructed from the supplied settings.
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an upstream error for the given stage.
    pub fn upstream(stage: impl Into<String>, detail: impl ToString) -> Self {
        Self::Upstream {
            stage: stage.into(),
            detail: detail.to_string(),
        }
    }

    /// Create a transport error.
    pub fn transport(detail: impl ToString) -> Self {
        Self::Transport(detail.to_string())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this error was raised by local validation.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Whether this error came back from a remote service.
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Upstream { .. })
    }

    /// Whether the request failed in transit.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

/// Result type alias using Cardcraft's Error type.
pub type Result<T> = std::result::Result<T, Error>;
