use std::error::Error as StdError;
use thiserror::Error;

/// Result type alias for Opsgenie operations
pub type Result<T> = std::result::Result<T, OpsgenieError>;

/// Errors that can occur when interacting with the Opsgenie alert API
#[derive(Debug, Error)]
pub enum OpsgenieError {
    /// The call was rejected locally before any request was sent
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Failed to build HTTP client
    #[error("Failed to build HTTP client: {0}")]
    BuildHttpClient(#[source] reqwest::Error),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[source] reqwest_middleware::Error),

    /// Response body did not match the expected shape
    #[error("Failed to decode response: {0}")]
    Decode(#[source] reqwest::Error),

    /// Base URL could not be parsed or joined with an endpoint path
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Environment configuration is missing or malformed
    #[error("Configuration error: {0}")]
    Config(String),

    /// Opsgenie API returned an error response
    ///
    /// `message` is the raw response body, so remote errors such as
    /// "Alert does not exist" reach the caller unchanged.
    #[error("Opsgenie API error: HTTP {status} - {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body returned by Opsgenie
        message: String,
    },
}

impl OpsgenieError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Check if the error is retryable
    ///
    /// Returns `true` for:
    /// - Network/connection errors
    /// - Timeout errors
    /// - Server errors (5xx status codes)
    ///
    /// The client itself never retries.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Request(source) => {
                if let Some(reqwest_err) = StdError::source(source) {
                    if let Some(err) = reqwest_err.downcast_ref::<reqwest::Error>() {
                        return err.is_connect() || err.is_timeout();
                    }
                }
                false
            }
            Self::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Check if the call was rejected before reaching the network
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
