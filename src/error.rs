//! AlumTrace Error Types
//!
//! Centralized error handling for the record locator, claim flow and
//! the remote service clients.

use thiserror::Error;

/// Central error type for AlumTrace
#[derive(Error, Debug)]
pub enum TraceError {
    /// Input rejected before any request was made. The message is user-facing.
    #[error("{0}")]
    Validation(String),

    /// The service answered with a non-success status
    #[error("{message} (HTTP {status})")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// A claim step was invoked out of order
    #[error("Claim flow error: {0}")]
    Flow(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TraceError {
    /// Message suitable for showing to the person at the keyboard
    pub fn user_message(&self) -> String {
        match self {
            TraceError::Validation(msg) => msg.clone(),
            TraceError::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// True for failures where the request never got an answer
    pub fn is_transport(&self) -> bool {
        match self {
            TraceError::Network(_) => true,
            TraceError::Http(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            _ => false,
        }
    }
}

/// Result type alias for AlumTrace operations
pub type TraceResult<T> = Result<T, TraceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_hides_status() {
        let err = TraceError::Api {
            status: 400,
            message: "Username already taken".to_string(),
        };
        assert_eq!(err.user_message(), "Username already taken");
        assert_eq!(err.to_string(), "Username already taken (HTTP 400)");
    }

    #[test]
    fn test_transport_classification() {
        assert!(TraceError::Network("refused".into()).is_transport());
        assert!(!TraceError::Validation("x".into()).is_transport());
    }
}
