//! Scripted provider for tests and offline demos.
//!
//! Replays a fixed list of replies and records every conversation it was
//! shown, so callers can assert on exactly what the model would have seen.

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::{AgentError, Result};
use crate::message::{ContentBlock, Conversation};
use crate::provider::{AssistantReply, LlmProvider, StopReason};
use crate::tool::ToolDescriptor;

/// One scripted step
#[derive(Clone, Debug)]
pub enum ScriptStep {
    Reply(Vec<ContentBlock>),
    /// Fail the call as the provider would with this HTTP status
    Fail { status: u16, message: String },
    /// Fail the call as if the provider could not be reached
    Unreachable,
}

pub struct ScriptedProvider {
    steps: Mutex<VecDeque<ScriptStep>>,
    /// Replayed forever once `steps` is drained
    repeat: Option<ScriptStep>,
    seen: Mutex<Vec<Conversation>>,
}

impl ScriptedProvider {
    pub fn new(steps: Vec<ScriptStep>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
            repeat: None,
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Replies from a list of block sequences
    pub fn replies(replies: Vec<Vec<ContentBlock>>) -> Self {
        Self::new(replies.into_iter().map(ScriptStep::Reply).collect())
    }

    /// Returns the same step on every call
    pub fn repeating(step: ScriptStep) -> Self {
        Self {
            steps: Mutex::new(VecDeque::new()),
            repeat: Some(step),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Number of `send` calls made so far
    pub async fn calls(&self) -> usize {
        self.seen.lock().await.len()
    }

    /// Conversations as they were at each call
    pub async fn seen(&self) -> Vec<Conversation> {
        self.seen.lock().await.clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "Scripted"
    }

    fn model(&self) -> &str {
        "scripted"
    }

    async fn send(
        &self,
        conversation: &Conversation,
        _tools: &[ToolDescriptor],
    ) -> Result<AssistantReply> {
        self.seen.lock().await.push(conversation.clone());

        let step = self
            .steps
            .lock()
            .await
            .pop_front()
            .or_else(|| self.repeat.clone())
            .ok_or_else(|| AgentError::ProviderUnavailable("script exhausted".into()))?;

        match step {
            ScriptStep::Reply(content) => {
                let stop_reason = if content.iter().any(|b| b.as_tool_request().is_some()) {
                    StopReason::ToolUse
                } else {
                    StopReason::EndTurn
                };
                Ok(AssistantReply {
                    content,
                    model: self.model().to_string(),
                    stop_reason: Some(stop_reason),
                    usage: None,
                })
            }
            ScriptStep::Fail { status: 429, message } => Err(AgentError::RateLimited(message)),
            ScriptStep::Fail { status, message } => Err(AgentError::Provider { status, message }),
            ScriptStep::Unreachable => {
                Err(AgentError::ProviderUnavailable("connection refused".into()))
            }
        }
    }
}
