//! Error types for backend communication.

/// Errors from talking to the legal guidance backend.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("network error: {0}")]
    Network(String),
    #[error("backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to decode response: {0}")]
    Decode(String),
    #[error("invalid backend URL: {0}")]
    InvalidUrl(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_display() {
        let err = ClientError::Network("connection refused".to_string());
        assert_eq!(err.to_string(), "network error: connection refused");

        let err = ClientError::Status {
            status: 503,
            body: "unavailable".to_string(),
        };
        assert_eq!(err.to_string(), "backend returned HTTP 503: unavailable");

        let err = ClientError::Decode("expected object".to_string());
        assert_eq!(err.to_string(), "failed to decode response: expected object");

        let err = ClientError::InvalidUrl("ftp://x".to_string());
        assert_eq!(err.to_string(), "invalid backend URL: ftp://x");
    }
}
