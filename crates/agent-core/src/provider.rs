//! LLM Provider Strategy Pattern
//!
//! The orchestration loop talks to the model through [`LlmProvider::send`]
//! and nothing else. Request shaping, headers, retries and error mapping
//! live in the implementation (see `agent-runtime`).
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_core::provider::LlmProvider;
//!
//! let provider = AnthropicProvider::from_config(config)?;
//! let reply = provider.send(&conversation, registry.descriptors()).await?;
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::message::{Conversation, ContentBlock};
use crate::tool::ToolDescriptor;

/// Generation settings applied by a provider on every call
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Model identifier (e.g., "claude-3-5-sonnet-latest")
    pub model: String,

    /// Upper bound on output tokens per reply
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature; provider default when unset
    #[serde(default)]
    pub temperature: Option<f32>,
}

const fn default_max_tokens() -> u32 {
    1024
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            model: "claude-3-5-sonnet-latest".into(),
            max_tokens: default_max_tokens(),
            temperature: None,
        }
    }
}

/// Token usage statistics
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Why the model stopped generating
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    EndTurn,
    ToolUse,
    MaxTokens,
    StopSequence,
    Other(String),
}

impl StopReason {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "end_turn" => Self::EndTurn,
            "tool_use" => Self::ToolUse,
            "max_tokens" => Self::MaxTokens,
            "stop_sequence" => Self::StopSequence,
            other => Self::Other(other.to_string()),
        }
    }
}

/// One model reply, already mapped onto the closed block set
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AssistantReply {
    /// Ordered content blocks (text and tool requests)
    pub content: Vec<ContentBlock>,

    /// Model that generated this response
    pub model: String,

    pub stop_reason: Option<StopReason>,

    /// Token usage statistics (if available)
    pub usage: Option<TokenUsage>,
}

/// Strategy trait for model providers
///
/// Implement this trait to add support for new LLM backends.
/// The agent works exclusively through this interface.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name for logs and service description
    fn name(&self) -> &str;

    /// Model the provider will call
    fn model(&self) -> &str;

    /// Send the full conversation and tool set, returning the next reply.
    ///
    /// Provider-level failures (rate limits, rejected requests, network)
    /// come back as their own `AgentError` variants, never as tool errors.
    async fn send(
        &self,
        conversation: &Conversation,
        tools: &[ToolDescriptor],
    ) -> Result<AssistantReply>;
}
