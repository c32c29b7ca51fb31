//! Error types for the share_inspect crate.

use thiserror::Error;

/// Errors that can occur when inspecting sharing links via Microsoft Graph.
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    #[error("Failed to read credentials file: {0}")]
    CredentialsFileError(#[from] std::io::Error),

    #[error("Failed to parse credentials JSON: {0}")]
    CredentialsParseError(#[from] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Invalid share identifier (missing u! prefix): {0}")]
    InvalidShareId(String),

    #[error("Malformed share identifier payload: {0}")]
    MalformedShareId(String),

    #[error("Unsupported HTTP method: {0}")]
    UnsupportedMethod(reqwest::Method),

    #[error("Retries exhausted after {attempts} attempts: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },

    #[error("JWT encoding error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("Invalid certificate thumbprint: {0}")]
    InvalidThumbprint(#[from] hex::FromHexError),

    #[error("Token refresh failed: {0}")]
    TokenRefreshError(String),
}

/// Result type alias for GraphError.
pub type Result<T> = std::result::Result<T, GraphError>;
