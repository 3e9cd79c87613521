use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Microsoft Graph API error ({status}): {message}")]
    Graph { status: StatusCode, message: String },

    #[error("Invalid response from Microsoft Graph: {0}")]
    InvalidResponse(String),

    #[error("OAuth2 authentication error: {0}")]
    Auth(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    Input(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Whether a bounded retry may recover from this failure. Covers server
    /// errors, throttling, and connection-level transport failures.
    pub fn is_transient(&self) -> bool {
        match self {
            AppError::Graph { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            AppError::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_error(status: StatusCode) -> AppError {
        AppError::Graph {
            status,
            message: "test".to_string(),
        }
    }

    #[test]
    fn test_server_errors_are_transient() {
        assert!(graph_error(StatusCode::GATEWAY_TIMEOUT).is_transient());
        assert!(graph_error(StatusCode::INTERNAL_SERVER_ERROR).is_transient());
        assert!(graph_error(StatusCode::TOO_MANY_REQUESTS).is_transient());
    }

    #[test]
    fn test_client_errors_are_not_transient() {
        assert!(!graph_error(StatusCode::BAD_REQUEST).is_transient());
        assert!(!graph_error(StatusCode::NOT_FOUND).is_transient());
        assert!(!graph_error(StatusCode::UNAUTHORIZED).is_transient());
    }

    #[test]
    fn test_local_errors_are_not_transient() {
        assert!(!AppError::Input("missing drive".to_string()).is_transient());
        assert!(!AppError::Auth("expired".to_string()).is_transient());
        assert!(!AppError::Config("missing".to_string()).is_transient());
    }
}
