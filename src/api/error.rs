//! Error taxonomy for upstream API access.

use thiserror::Error;

/// Errors from the articulation API client.
///
/// Cancellation is deliberately a variant here rather than a panic or a
/// silent return: callers must distinguish it from genuine network
/// failures and must never log it as one.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The cancellation signal fired before or during the request.
    #[error("request cancelled")]
    Cancelled,

    /// Transport-level failure (connection, timeout, decode).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("unexpected status {status} from {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },
}

impl ApiError {
    /// Whether this error is a cancellation rather than a failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ApiError::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancelled_is_distinguished() {
        assert!(ApiError::Cancelled.is_cancelled());

        let status = ApiError::Status {
            status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            url: "http://example.com/api/institutions".to_string(),
        };
        assert!(!status.is_cancelled());
        assert!(status.to_string().contains("500"));
    }
}
