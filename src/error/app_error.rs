use thiserror::Error;

use crate::auth::AuthError;

/// Errors surfaced to HTTP clients.
///
/// Every variant converts into a JSON error response; the error itself is
/// also attached to the response so the access log records it.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found error
    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    /// Bad request error with descriptive message
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    /// Missing or rejected credentials
    #[error("Unauthorized: {message}")]
    Unauthorized {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// Authenticated but not permitted
    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    /// Configuration error with key information
    #[error("Configuration error: {key}")]
    Configuration {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    /// A collaborator over the network failed
    #[error("Upstream service failed: {service}")]
    Upstream {
        service: String,
        #[source]
        source: anyhow::Error,
    },

    /// Internal error for unexpected failures
    #[error("Internal error")]
    Internal {
        #[source]
        source: anyhow::Error,
    },
}

impl AppError {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        AppError::Unauthorized {
            message: message.into(),
            source: None,
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        AppError::Forbidden {
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError::BadRequest {
            message: message.into(),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        AppError::Internal { source: error }
    }
}

impl From<AuthError> for AppError {
    fn from(error: AuthError) -> Self {
        if error.is_configuration() {
            AppError::Configuration {
                key: "auth".to_string(),
                source: error.into(),
            }
        } else if let AuthError::KeySet { .. } = error {
            AppError::Upstream {
                service: "jwks".to_string(),
                source: error.into(),
            }
        } else {
            AppError::Unauthorized {
                message: error.to_string(),
                source: Some(error.into()),
            }
        }
    }
}

/// Type alias for Result with AppError to simplify function signatures
pub type AppResult<T> = Result<T, AppError>;
