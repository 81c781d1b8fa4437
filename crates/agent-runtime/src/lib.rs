//! # agent-runtime
//!
//! Model providers for the travel agent.
//!
//! ## Providers
//!
//! - **Anthropic**: Messages API with native tool use
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_runtime::AnthropicProvider;
//!
//! let provider = AnthropicProvider::from_env()?;
//! let agent = AgentBuilder::new()
//!     .provider(Arc::new(provider))
//!     .tools(registry)
//!     .build()?;
//! ```

pub mod anthropic;
pub mod retry;

pub use anthropic::{AnthropicConfig, AnthropicProvider};
pub use retry::RetryConfig;

// Re-export core types for convenience
pub use agent_core::{Agent, AgentError, LlmProvider, Result, ToolRegistry};
