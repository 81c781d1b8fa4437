//! Error Types

use thiserror::Error;

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Agent error types
#[derive(Error, Debug)]
pub enum AgentError {
    /// Missing or malformed caller input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error (missing credential, duplicate tool, ...)
    #[error("Configuration error: {0}")]
    Config(String),

    /// The model provider answered with a non-success status
    #[error("Provider error ({status}): {message}")]
    Provider { status: u16, message: String },

    /// Provider unavailable or not responding
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Rate limited by the provider
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// The orchestration loop ran out of tool rounds
    #[error("Maximum iterations ({0}) reached")]
    MaxIterations(usize),

    /// Tool input did not match its declared schema
    #[error("Tool validation error: {0}")]
    ToolValidation(String),

    /// Tool execution failed
    #[error("Tool execution error: {0}")]
    ToolExecution(String),

    /// Transcript shape violated (e.g. unmatched tool result ids)
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AgentError {
    /// Check if error is retryable
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::ProviderUnavailable(_) | Self::RateLimited(_) => true,
            Self::Provider { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Convert to a user-friendly message.
    ///
    /// Provider response bodies are never echoed here; they may quote the
    /// request back, and the request carries the credential header.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidInput(msg) => msg.clone(),
            Self::Config(_) => "The service is not configured to reach the language model.".into(),
            Self::Provider { status, .. } => {
                format!("The AI service rejected the request (status {status}).")
            }
            Self::ProviderUnavailable(_) => {
                "The AI service is currently unavailable. Please try again.".into()
            }
            Self::RateLimited(_) => "The AI service is busy. Please wait a moment and retry.".into(),
            Self::MaxIterations(n) => format!(
                "The request could not be completed within {n} tool rounds. Please try a simpler query."
            ),
            Self::ToolValidation(msg) => format!("Invalid tool input: {msg}"),
            Self::ToolExecution(msg) => format!("Tool error: {msg}"),
            Self::Protocol(_) | Self::Json(_) => "An unexpected error occurred.".into(),
        }
    }
}
