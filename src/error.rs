//! Error types for content generation and WordPress publishing.

use thiserror::Error;

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error kinds surfaced by the generator and the publisher
#[derive(Debug, Error)]
pub enum Error {
    /// Operation invoked before the WordPress connection was configured
    #[error("WordPress not configured")]
    NotConfigured,

    /// Feature not available for the configured site mode
    #[error("Not supported: {0}")]
    Unsupported(String),

    /// HTTP 401 from a WordPress endpoint
    #[error("Authentication failed: {0}")]
    AuthFailure(String),

    /// HTTP 403
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// HTTP 404
    #[error("Not found: {0}")]
    NotFound(String),

    /// Any other non-success status, body kept verbatim
    #[error("API error: {status} - {body}")]
    ApiError { status: u16, body: String },

    /// Request exceeded its deadline
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// DNS, connection refused, TLS and other transport failures
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Malformed JSON or missing structure in a response
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Map a non-success HTTP status to an error kind.
    ///
    /// 401, 403 and 404 get their own kinds; everything else becomes
    /// [`Error::ApiError`] with the body attached.
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        match status {
            401 => Error::AuthFailure(body),
            403 => Error::AccessDenied(body),
            404 => Error::NotFound(body),
            _ => Error::ApiError { status, body },
        }
    }

    /// Short machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            Error::NotConfigured => "not_configured",
            Error::Unsupported(_) => "unsupported",
            Error::AuthFailure(_) => "auth_failure",
            Error::AccessDenied(_) => "access_denied",
            Error::NotFound(_) => "not_found",
            Error::ApiError { .. } => "api_error",
            Error::Timeout(_) => "timeout",
            Error::NetworkError(_) => "network_error",
            Error::ParseError(_) => "parse_error",
            Error::Config(_) => "config",
            Error::Io(_) => "io",
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        // URLにはクエリ上のクレデンシャルが含まれうる
        let err = err.without_url();
        if err.is_timeout() {
            Error::Timeout(err.to_string())
        } else if err.is_decode() {
            Error::ParseError(err.to_string())
        } else {
            Error::NetworkError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::ParseError(err.to_string())
    }
}
