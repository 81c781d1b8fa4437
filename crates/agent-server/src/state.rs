//! Application State

use std::sync::Arc;

use agent_core::{LlmProvider, ToolRegistry};

use crate::config::ServerConfig;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Model provider (None if no credential is configured)
    pub provider: Option<Arc<dyn LlmProvider>>,

    /// Tool registry with all available tools
    pub tools: Arc<ToolRegistry>,

    pub config: Arc<ServerConfig>,
}
