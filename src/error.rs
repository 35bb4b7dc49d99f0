use crate::response::Response;
use thiserror::Error;

/// Main error type for REST API operations
#[derive(Debug, Error)]
pub enum RestError {
    /// Token endpoint unreachable or returned an unusable grant response
    #[error("authentication failed: {message}")]
    Authentication { message: String },

    /// 401 from the resource endpoint; surfaced once the retry path is exhausted
    #[error("unauthorized access: HTTP {status}")]
    Unauthorized { status: u16, body: String },

    /// Error returned by the REST API endpoint, raised when deserializing
    /// an error response through `Response::apply`
    #[error("REST API error: {name}: {message}")]
    Api {
        name: String,
        message: String,
        response: Response,
    },

    /// Response body claimed JSON but failed to parse
    #[error("malformed response body (status {status}): {detail}")]
    MalformedResponse { status: u16, detail: String },

    /// Transport-level failure, not recovered
    #[error("network error: {0}")]
    Network(String),

    /// Transport-enforced timeout, kept distinct from other network failures
    #[error("request timed out: {0}")]
    Timeout(String),

    /// Request building error
    #[error("failed to build request: {0}")]
    RequestBuild(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl RestError {
    /// Create a new API error from an error Response
    pub fn from_response(response: &Response) -> Self {
        let name = response.error_name().unwrap_or("unknown").to_string();
        let message = response
            .error_message()
            .unwrap_or("unknown error")
            .to_string();

        RestError::Api {
            name,
            message,
            response: response.clone(),
        }
    }

    /// Check if this error is an unauthorized access error
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, RestError::Unauthorized { .. })
    }

    /// Check if this error is a transport timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, RestError::Timeout(_))
    }

    /// Get the HTTP status code if this error carries one
    pub fn status_code(&self) -> Option<u16> {
        match self {
            RestError::Unauthorized { status, .. } => Some(*status),
            RestError::MalformedResponse { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for RestError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RestError::Timeout(err.to_string())
        } else {
            RestError::Network(err.to_string())
        }
    }
}

/// Result type for REST operations
pub type Result<T> = std::result::Result<T, RestError>;
