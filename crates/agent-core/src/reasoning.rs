//! Orchestration Loop
//!
//! Drives model calls and tool rounds for one request:
//!
//! ```text
//! AwaitingModel ─▶ InspectingReply ─┬─▶ Done(text)
//!       ▲                           └─▶ DispatchingTools ─┬─▶ AwaitingModel
//!       └─────────────────────────────────────────────────┘  └─▶ Exhausted
//! ```
//!
//! Model calls never overlap for one conversation; tool calls inside a
//! single round run concurrently (see [`Dispatcher`]).

use std::collections::HashSet;
use std::sync::Arc;

use crate::dispatch::Dispatcher;
use crate::error::{AgentError, Result};
use crate::message::{Conversation, ToolRequest, Turn};
use crate::provider::LlmProvider;
use crate::tool::ToolRegistry;

/// Tool rounds allowed per request unless configured otherwise
pub const DEFAULT_MAX_ITERATIONS: usize = 5;

const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant. \
Use the available tools whenever they help answer the question, then answer in plain prose. \
Never show raw tool output to the user.";

/// Agent configuration
#[derive(Clone, Debug)]
pub struct AgentConfig {
    /// System prompt sent with every model call
    pub system_prompt: String,

    /// Maximum tool rounds before giving up
    pub max_iterations: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.into(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

/// Loop state; `Done` and `Exhausted` are terminal
#[derive(Clone, Debug, PartialEq)]
pub enum LoopState {
    AwaitingModel,
    InspectingReply,
    DispatchingTools(Vec<ToolRequest>),
    Done(String),
    Exhausted,
}

impl LoopState {
    /// Decide what follows an assistant turn.
    ///
    /// A reply that repeats a request id, or carries neither requests nor
    /// text, cannot be continued and fails the request.
    pub fn inspect(turn: &Turn) -> Result<Self> {
        let requests = turn.tool_requests();
        if requests.is_empty() {
            let text = turn.final_text();
            if text.trim().is_empty() {
                return Err(AgentError::Protocol(
                    "model reply has neither text nor tool requests".into(),
                ));
            }
            return Ok(Self::Done(text));
        }

        let mut ids = HashSet::new();
        if let Some(dup) = requests.iter().find(|r| !ids.insert(r.id.as_str())) {
            return Err(AgentError::Protocol(format!(
                "model repeated tool request id '{}' in one reply",
                dup.id
            )));
        }
        Ok(Self::DispatchingTools(requests.into_iter().cloned().collect()))
    }

    /// Decide what follows a completed tool round
    pub const fn after_dispatch(iteration: usize, max_iterations: usize) -> Self {
        if iteration >= max_iterations {
            Self::Exhausted
        } else {
            Self::AwaitingModel
        }
    }
}

/// Final answer plus the size of the exchange that produced it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Answer {
    pub text: String,
    pub model_calls: usize,
    pub tool_rounds: usize,
}

/// The main Agent struct
pub struct Agent {
    provider: Arc<dyn LlmProvider>,
    dispatcher: Dispatcher,
    config: AgentConfig,
}

impl Agent {
    fn new(
        provider: Arc<dyn LlmProvider>,
        tools: Arc<ToolRegistry>,
        config: AgentConfig,
    ) -> Self {
        Self {
            provider,
            dispatcher: Dispatcher::new(tools),
            config,
        }
    }

    /// Run the loop over an already-seeded conversation
    pub async fn run(&self, conversation: &mut Conversation) -> Result<Answer> {
        let max = self.config.max_iterations;
        let mut iteration = 0;
        let mut model_calls = 0;
        let mut state = LoopState::AwaitingModel;

        loop {
            state = match state {
                LoopState::AwaitingModel => {
                    model_calls += 1;
                    let reply = self
                        .provider
                        .send(conversation, self.dispatcher.registry().descriptors())
                        .await?;
                    tracing::debug!(
                        call = model_calls,
                        blocks = reply.content.len(),
                        stop_reason = ?reply.stop_reason,
                        "Model replied"
                    );
                    conversation.push_assistant(reply.content);
                    LoopState::InspectingReply
                }
                LoopState::InspectingReply => {
                    let turn = conversation.last().ok_or_else(|| {
                        AgentError::Protocol("no assistant turn to inspect".into())
                    })?;
                    LoopState::inspect(turn).inspect_err(|e| {
                        tracing::warn!(model_calls, error = %e, "Unusable model reply");
                    })?
                }
                LoopState::DispatchingTools(requests) => {
                    tracing::debug!(
                        round = iteration + 1,
                        tools = ?requests.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(),
                        "Dispatching tool batch"
                    );
                    let results = self.dispatcher.dispatch(&requests).await;
                    conversation.push_tool_results(results)?;
                    iteration += 1;
                    LoopState::after_dispatch(iteration, max)
                }
                LoopState::Done(text) => {
                    tracing::info!(model_calls, tool_rounds = iteration, "Conversation complete");
                    return Ok(Answer {
                        text,
                        model_calls,
                        tool_rounds: iteration,
                    });
                }
                LoopState::Exhausted => {
                    tracing::warn!(model_calls, max, "Tool rounds exhausted without a final answer");
                    return Err(AgentError::MaxIterations(max));
                }
            };
        }
    }

    /// Run with a simple string input (creates a request-scoped conversation)
    pub async fn ask(&self, input: &str) -> Result<Answer> {
        let input = input.trim();
        if input.is_empty() {
            return Err(AgentError::InvalidInput("Please provide an input".into()));
        }
        let mut conversation =
            Conversation::seeded(Some(self.config.system_prompt.clone()), input);
        self.run(&mut conversation).await
    }
}

/// Builder for Agent configuration
pub struct AgentBuilder {
    provider: Option<Arc<dyn LlmProvider>>,
    tools: Option<Arc<ToolRegistry>>,
    config: AgentConfig,
}

impl Default for AgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            tools: None,
            config: AgentConfig::default(),
        }
    }

    #[must_use]
    pub fn provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Shared registry; may be reused across agents
    #[must_use]
    pub fn tools(mut self, tools: Arc<ToolRegistry>) -> Self {
        self.tools = Some(tools);
        self
    }

    #[must_use]
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = prompt.into();
        self
    }

    #[must_use]
    pub const fn max_iterations(mut self, max: usize) -> Self {
        self.config.max_iterations = max;
        self
    }

    pub fn build(self) -> Result<Agent> {
        let provider = self
            .provider
            .ok_or_else(|| AgentError::Config("Provider is required".into()))?;
        if self.config.max_iterations == 0 {
            return Err(AgentError::Config("max_iterations must be at least 1".into()));
        }
        let tools = self
            .tools
            .ok_or_else(|| AgentError::Config("Tool registry is required".into()))?;

        Ok(Agent::new(provider, tools, self.config))
    }
}
