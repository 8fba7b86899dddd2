//! Error types for the ACME TXT solver
//!
//! Every failure of a Present/CleanUp call surfaces as one of these variants.
//! Nothing is recovered or retried locally; the calling framework owns retry
//! policy and can use [`Error::is_retryable`] to drive it.

use thiserror::Error;

/// Result type alias for solver operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the ACME TXT solver
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or malformed configuration (including incomplete secret refs)
    #[error("Configuration error: {0}")]
    Config(String),

    /// The referenced secret, or the key inside it, does not exist
    #[error("Secret not found: {0}")]
    SecretNotFound(String),

    /// The secret backend failed for a reason other than absence
    #[error("Secret store error: {0}")]
    SecretStore(String),

    /// The provider rejected the credentials (HTTP 401)
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The credentials lack access to the resource (HTTP 403)
    #[error("Permission denied: {0}")]
    Permission(String),

    /// Any other non-success status returned by the provider
    #[error("Unexpected status {status} from DNS API: {body}")]
    Transport {
        /// HTTP status code
        status: u16,
        /// Decoded diagnostic payload, or the raw body if undecodable
        body: String,
    },

    /// A request body could not be serialized
    #[error("Failed to encode request: {0}")]
    Encoding(String),

    /// A response body could not be deserialized
    #[error("Failed to decode response: {0}")]
    Decoding(String),

    /// Connection-level failure reported by the transport
    #[error("Network error: {0}")]
    Network(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a "secret not found" error
    pub fn secret_not_found(msg: impl Into<String>) -> Self {
        Self::SecretNotFound(msg.into())
    }

    /// Create a secret store error
    pub fn secret_store(msg: impl Into<String>) -> Self {
        Self::SecretStore(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a permission error
    pub fn permission(msg: impl Into<String>) -> Self {
        Self::Permission(msg.into())
    }

    /// Create a transport error for an unexpected status code
    pub fn transport(status: u16, body: impl Into<String>) -> Self {
        Self::Transport {
            status,
            body: body.into(),
        }
    }

    /// Create an encoding error
    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    /// Create a decoding error
    pub fn decoding(msg: impl Into<String>) -> Self {
        Self::Decoding(msg.into())
    }

    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Whether a later attempt of the same call could succeed
    ///
    /// Connection failures and 5xx/429 responses are transient; everything
    /// else needs a configuration or credential change first.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Network(_) => true,
            Error::Transport { status, .. } => *status == 429 || (500..=599).contains(status),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_display() {
        let err = Error::transport(500, r#"{"code":13}"#);
        let msg = err.to_string();
        assert!(msg.contains("500"));
        assert!(msg.contains(r#"{"code":13}"#));
    }

    #[test]
    fn test_retryable_classification() {
        assert!(Error::network("connection reset").is_retryable());
        assert!(Error::transport(503, "").is_retryable());
        assert!(Error::transport(429, "").is_retryable());
        assert!(!Error::transport(409, "").is_retryable());
        assert!(!Error::auth("credentials not valid").is_retryable());
        assert!(!Error::config("missing tenant").is_retryable());
    }
}
