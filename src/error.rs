//! Error types for the cloud_gallery crate.

use thiserror::Error;

use crate::link_parser::Provider;

/// Errors that can occur while listing images from a cloud source.
#[derive(Error, Debug)]
pub enum GalleryError {
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

    #[error("Invalid link: {0}")]
    InvalidLink(String),

    #[error("Link is for {actual}, expected {expected}")]
    ProviderMismatch { expected: Provider, actual: Provider },

    #[error("No lister configured for {0}")]
    ListerNotConfigured(Provider),

    #[error("Failed to scan local folder: {0}")]
    LocalScan(String),

    #[error("JWT encoding error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("Token refresh failed: {0}")]
    TokenRefreshError(String),
}

/// Result type alias for GalleryError.
pub type Result<T> = std::result::Result<T, GalleryError>;

/// Why a string could not be turned into a [`ParsedLink`](crate::link_parser::ParsedLink).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    #[error("Link is empty")]
    Empty,

    #[error("Unsupported link: {0}")]
    Unrecognized(String),

    #[error("Malformed {provider} link: {reason}")]
    Malformed { provider: Provider, reason: String },
}
