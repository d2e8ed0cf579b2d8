//! Error types for Shopmate
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// All error types that can occur while answering a chat request
#[derive(Debug, Error)]
pub enum ShopmateError {
    /// Caller sent a request we cannot act on (missing message, bad body)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Missing or malformed configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Model or catalog service unreachable or returned an error
    #[error("Upstream unavailable: {0}")]
    Upstream(String),

    /// Model asked for a tool that is not in the registry
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Tool execution error
    #[error("Tool error: {0}")]
    Tool(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ShopmateError {
    /// Whether the error was caused by the caller rather than by us or an upstream
    pub fn is_client_error(&self) -> bool {
        matches!(self, ShopmateError::InvalidInput(_))
    }
}

/// Result type alias for Shopmate operations
pub type Result<T> = std::result::Result<T, ShopmateError>;
