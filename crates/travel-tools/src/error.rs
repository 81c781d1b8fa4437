//! Error Types for Travel Tools

use agent_core::AgentError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TravelError>;

#[derive(Error, Debug)]
pub enum TravelError {
    #[error("Place not found: {0}")]
    PlaceNotFound(String),

    #[error("{service} returned HTTP {status}")]
    Upstream { service: &'static str, status: u16 },

    #[error("Unexpected {service} response: {detail}")]
    BadResponse { service: &'static str, detail: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl From<TravelError> for AgentError {
    fn from(err: TravelError) -> Self {
        match err {
            TravelError::InvalidInput(msg) => Self::ToolValidation(msg),
            TravelError::Config(msg) => Self::Config(msg),
            // Drop the request URL; the model only needs the failure kind.
            TravelError::Network(e) => Self::ToolExecution(format!("Network error: {}", e.without_url())),
            other => Self::ToolExecution(other.to_string()),
        }
    }
}
