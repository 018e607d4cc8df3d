//! Error types for the catalog API client.

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when talking to the catalog API.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The request never produced a response (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API error: {status}{}", describe(.message.as_deref()))]
    Status {
        /// HTTP status code.
        status: u16,
        /// Message from the JSON error body, when there was one.
        message: Option<String>,
    },

    /// The response body did not have the expected shape.
    #[error("Parse error: {0}")]
    Decode(String),

    /// A request URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(String),

    /// The call needs a bearer token and none was set.
    #[error("Not authenticated")]
    Unauthenticated,
}

impl GatewayError {
    /// HTTP status of the failed call, when one is known.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            Self::Decode(_) | Self::Url(_) | Self::Unauthenticated => None,
        }
    }

    /// Server-provided error message, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

impl From<url::ParseError> for GatewayError {
    fn from(e: url::ParseError) -> Self {
        Self::Url(e.to_string())
    }
}

fn describe(message: Option<&str>) -> String {
    message.map(|m| format!(" - {m}")).unwrap_or_default()
}

/// Error body returned by the catalog API.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_error_display() {
        let err = GatewayError::Status {
            status: 404,
            message: Some("Product with id '999' not found".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "API error: 404 - Product with id '999' not found"
        );
        assert_eq!(err.status(), Some(404));

        let err = GatewayError::Status {
            status: 500,
            message: None,
        };
        assert_eq!(err.to_string(), "API error: 500");
        assert_eq!(err.message(), None);
    }

    #[test]
    fn test_status_unknown_for_local_failures() {
        assert_eq!(GatewayError::Unauthenticated.status(), None);
        assert_eq!(GatewayError::Decode("eof".to_string()).status(), None);
    }
}
