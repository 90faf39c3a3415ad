//! Structured error model for connector operations.
//!
//! [`ConnectorError`] carries a category, a stable code and a message.
//! Construct via the category-specific factory methods; the category
//! decides which [`FailureType`] the error is reported under.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::trace::FailureType;

/// Broad classification of a connector error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Invalid connector configuration.
    Config,
    /// Credentials rejected by the remote system.
    Auth,
    /// Transient network error (retryable).
    TransientNetwork,
    /// Internal connector error.
    Internal,
}

impl ErrorCategory {
    /// Failure type reported to the platform for this category.
    #[must_use]
    pub fn failure_type(self) -> FailureType {
        match self {
            Self::Config | Self::Auth => FailureType::ConfigError,
            Self::TransientNetwork => FailureType::TransientError,
            Self::Internal => FailureType::SystemError,
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Config => "config",
            Self::Auth => "auth",
            Self::TransientNetwork => "transient_network",
            Self::Internal => "internal",
        };
        f.write_str(s)
    }
}

/// Structured error from a connector operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("[{category}] {code}: {message}")]
pub struct ConnectorError {
    pub category: ErrorCategory,
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ConnectorError {
    fn new(category: ErrorCategory, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            category,
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Configuration error.
    #[must_use]
    pub fn config(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Config, code, message)
    }

    /// Authentication error.
    #[must_use]
    pub fn auth(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Auth, code, message)
    }

    /// Transient network error.
    #[must_use]
    pub fn transient_network(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::TransientNetwork, code, message)
    }

    /// Internal connector error.
    #[must_use]
    pub fn internal(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Internal, code, message)
    }

    /// Attach structured diagnostic details.
    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Failure type this error is reported under.
    #[must_use]
    pub fn failure_type(&self) -> FailureType {
        self.category.failure_type()
    }
}
