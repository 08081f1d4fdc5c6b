// src/error.rs

//! Unified error handling for the forum client.

use std::fmt;

use thiserror::Error;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// The server answered with a failure status
    #[error("{message}")]
    Api { status: u16, message: String },

    /// Response envelope did not carry the expected sentinel
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Client-side input validation failed
    #[error("{0}")]
    Validation(String),

    /// Content could not be rendered
    #[error("Render error: {0}")]
    Render(String),

    /// No page matches the requested location
    #[error("Not found: {0}")]
    NotFound(String),
}

impl AppError {
    /// Create an API failure error.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create a protocol error.
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol(message.into())
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a render error.
    pub fn render(message: impl fmt::Display) -> Self {
        Self::Render(message.to_string())
    }

    /// Create a not-found error.
    pub fn not_found(location: impl Into<String>) -> Self {
        Self::NotFound(location.into())
    }

    /// Whether this error was raised before anything reached the network.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
