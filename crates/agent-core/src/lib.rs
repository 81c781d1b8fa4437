//! # agent-core
//!
//! Provider-agnostic tool orchestration: a model is called with the
//! conversation and a fixed tool set, tool requests in its reply are
//! executed, and results are fed back until the model answers in prose.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Agent                                │
//! │  ┌──────────────┐  ┌──────────────┐  ┌───────────────────┐  │
//! │  │ Orchestration│  │  Dispatcher  │  │   LlmProvider     │  │
//! │  │     Loop     │──│  + Registry  │  │   (Strategy)      │  │
//! │  └──────┬───────┘  └──────────────┘  └─────────▲─────────┘  │
//! │         └──────────── Conversation ────────────┘            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `LlmProvider` trait keeps the loop independent of the wire format
//! of any particular model vendor.

pub mod dispatch;
pub mod error;
pub mod message;
pub mod mock;
pub mod provider;
pub mod reasoning;
pub mod tool;

pub use dispatch::{Dispatcher, UNKNOWN_TOOL};
pub use error::{AgentError, Result};
pub use message::{ContentBlock, Conversation, Role, ToolInput, ToolRequest, ToolResultBlock, Turn, TurnContent};
pub use provider::{AssistantReply, GenerationOptions, LlmProvider};
pub use reasoning::{Agent, AgentBuilder, AgentConfig, Answer, LoopState, DEFAULT_MAX_ITERATIONS};
pub use tool::{InputSchema, ParamKind, ParameterSchema, Tool, ToolDescriptor, ToolOutcome, ToolRegistry};
