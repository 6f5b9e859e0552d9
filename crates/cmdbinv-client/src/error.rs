//! Error types for the CMDB client

use thiserror::Error;

/// Errors that can occur when talking to the CMDB
#[derive(Error, Debug)]
pub enum ClientError {
    /// HTTP request failed at the network level
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Login was rejected
    #[error("authentication failed ({status}): {message}")]
    Authentication {
        /// HTTP status code
        status: u16,
        /// Response body from the server
        message: String,
    },

    /// API returned an error status
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message from server
        message: String,
    },

    /// Response body did not have the expected structure
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ClientError {
    /// Login was rejected by the server
    #[must_use]
    pub fn is_authentication(&self) -> bool {
        matches!(self, ClientError::Authentication { .. })
    }

    /// Network failure, bad address, or an error status outside login
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ClientError::Http(_) | ClientError::Url(_) | ClientError::Api { .. }
        )
    }

    /// Malformed response body
    #[must_use]
    pub fn is_parse(&self) -> bool {
        matches!(self, ClientError::InvalidResponse(_))
    }
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ClientError>;
