use thiserror::Error;

/// Avaandmed client error types
#[derive(Error, Debug)]
pub enum AvaandmedError {
    /// The request never produced a response (DNS, connect, timeout, TLS).
    /// Not retried; the operation is aborted.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization/deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL parsing failed: {0}")]
    Url(#[from] url::ParseError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The service answered with a non-success status.
    #[error("API error: {status} {uri} - {message}")]
    Api {
        status: u16,
        uri: String,
        message: String,
    },

    /// Rejected locally before any request was sent.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type for Avaandmed operations
pub type AvaandmedResult<T> = Result<T, AvaandmedError>;

impl AvaandmedError {
    /// Create an API error from a status code, request URI and message
    pub fn api_error(status: u16, uri: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            uri: uri.into(),
            message: message.into(),
        }
    }

    /// Create an authentication error
    pub fn auth_error(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }

    /// Create an invalid parameter error
    pub fn invalid_param(message: impl Into<String>) -> Self {
        Self::InvalidParameter(message.into())
    }

    /// HTTP status carried by the error, if the service sent one
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_api_error(&self) -> bool {
        matches!(self, Self::Api { .. })
    }

    pub fn is_invalid_parameter(&self) -> bool {
        matches!(self, Self::InvalidParameter(_))
    }

    /// True when no response was received at all
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Http(_))
    }
}
