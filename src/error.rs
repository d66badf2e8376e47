//! Error types for the Logz.io provider.

use thiserror::Error;

use crate::schema::Diagnostic;

/// Errors that can occur while configuring the provider or reading a data source.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// No record matched the supplied lookup attributes.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// A configuration value had the wrong shape.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The provider is missing credentials or was never configured.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The requested data source type is unknown.
    #[error("Unknown resource type: {0}")]
    UnknownResource(String),

    /// A response body could not be decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The HTTP request could not be completed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The Logz.io API answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code returned by the API.
        status: u16,
        /// Response body, truncated.
        message: String,
    },
}

impl ProviderError {
    /// Get the error message as a string.
    pub fn message(&self) -> &str {
        match self {
            Self::NotFound(msg) => msg,
            Self::Validation(msg) => msg,
            Self::Configuration(msg) => msg,
            Self::UnknownResource(msg) => msg,
            Self::Serialization(_err) => "serialization error (see Debug output)",
            Self::Http(_err) => "http error (see Debug output)",
            Self::Api { message, .. } => message,
        }
    }

    /// Whether this error came from talking to the remote API.
    ///
    /// Transport errors are never retried; they are handed back to the caller as-is.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::Api { .. } | Self::Serialization(_)
        )
    }

    /// The HTTP status of an [`ProviderError::Api`] error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<ProviderError> for Diagnostic {
    fn from(err: ProviderError) -> Self {
        let summary = match &err {
            ProviderError::NotFound(_) => "Log shipping token not found",
            ProviderError::Validation(_) => "Invalid configuration",
            ProviderError::Configuration(_) => "Provider configuration error",
            ProviderError::UnknownResource(_) => "Unknown data source",
            ProviderError::Serialization(_)
            | ProviderError::Http(_)
            | ProviderError::Api { .. } => "Logz.io API request failed",
        };
        Diagnostic::error(summary).with_detail(err.to_string())
    }
}
