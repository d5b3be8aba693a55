//! Error types for the survey image service

use thiserror::Error;

/// Result type alias for service operations
pub type Result<T> = std::result::Result<T, SisError>;

/// Error types that can occur while serving a cutout request
#[derive(Error, Debug, Clone)]
pub enum SisError {
    #[error("Invalid PDS4 logical identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Unsupported survey: {0}")]
    UnsupportedSurvey(String),

    #[error("Malformed product id for {survey}: {product_id}")]
    MalformedProductId { survey: String, product_id: String },

    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid parameter {name}: {message}")]
    InvalidParameter { name: String, message: String },

    #[error("Request resolves to an empty cache file name")]
    EmptyFilename,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Upstream archive returned client error: {status} - {message}")]
    UpstreamClientError { status: u16, message: String },

    #[error("Upstream archive returned server error: {status} - {message}")]
    UpstreamServerError { status: u16, message: String },

    #[error("Cache store error: {0}")]
    CacheStoreError(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl SisError {
    /// Whether the error is attributable to the caller's input.
    ///
    /// Client errors are never retried and never logged as system
    /// faults; everything else indicates a deployment or upstream
    /// problem.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            SisError::InvalidIdentifier(_)
                | SisError::UnsupportedSurvey(_)
                | SisError::MalformedProductId { .. }
                | SisError::UnsupportedFormat(_)
                | SisError::MissingParameter(_)
                | SisError::InvalidParameter { .. }
                | SisError::EmptyFilename
                | SisError::UpstreamClientError { .. }
        )
    }

    /// Convert the error to an HTTP status code.
    ///
    /// Validation and identifier errors map to 400, upstream archive
    /// failures to their own status or 502, and configuration or
    /// internal failures to 500.
    pub fn to_http_status(&self) -> u16 {
        match self {
            SisError::InvalidIdentifier(_) => 400,
            SisError::UnsupportedSurvey(_) => 400,
            SisError::MalformedProductId { .. } => 400,
            SisError::UnsupportedFormat(_) => 400,
            SisError::MissingParameter(_) => 400,
            SisError::InvalidParameter { .. } => 400,
            SisError::EmptyFilename => 400,

            SisError::UpstreamClientError { status, .. } => *status,
            SisError::UpstreamServerError { .. } => 502,

            SisError::ConfigError(_) => 500,
            SisError::CacheStoreError(_) => 500,
            SisError::EncodingError(_) => 500,
            SisError::InternalError(_) => 500,
        }
    }

    /// Create an UpstreamClientError from a status code and message
    pub fn upstream_client_error(status: u16, message: impl Into<String>) -> Self {
        SisError::UpstreamClientError {
            status,
            message: message.into(),
        }
    }

    /// Create an UpstreamServerError from a status code and message
    pub fn upstream_server_error(status: u16, message: impl Into<String>) -> Self {
        SisError::UpstreamServerError {
            status,
            message: message.into(),
        }
    }

    /// Create an upstream error from an HTTP status code,
    /// categorized as 4xx or 5xx
    pub fn from_upstream_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        if (400..500).contains(&status) {
            SisError::upstream_client_error(status, message)
        } else {
            SisError::upstream_server_error(status, message)
        }
    }
}
