//! Anthropic Messages API Provider
//!
//! Implementation of `LlmProvider` over `POST /v1/messages` with native
//! tool use. Conversation blocks map onto the wire as
//! `text` / `tool_use` / `tool_result`.

use std::time::Duration;

use agent_core::{
    error::{AgentError, Result},
    message::{ContentBlock, Conversation, Role, ToolRequest, ToolResultBlock, TurnContent},
    provider::{AssistantReply, GenerationOptions, LlmProvider, StopReason, TokenUsage},
    tool::ToolDescriptor,
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::retry::RetryConfig;

const API_VERSION: &str = "2023-06-01";

/// Anthropic provider configuration
#[derive(Clone)]
pub struct AnthropicConfig {
    /// API credential, sent only as the `x-api-key` header
    pub api_key: String,

    /// API base URL
    pub base_url: String,

    pub generation: GenerationOptions,

    /// Per-attempt request timeout in seconds
    pub timeout_secs: u64,

    pub retry: RetryConfig,
}

impl std::fmt::Debug for AnthropicConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicConfig")
            .field("api_key", &"[redacted]")
            .field("base_url", &self.base_url)
            .field("generation", &self.generation)
            .field("timeout_secs", &self.timeout_secs)
            .field("retry", &self.retry)
            .finish()
    }
}

impl AnthropicConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: "https://api.anthropic.com".into(),
            generation: GenerationOptions::default(),
            timeout_secs: 60,
            retry: RetryConfig::default(),
        }
    }

    /// Read `ANTHROPIC_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, reading through `lookup`
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = lookup("ANTHROPIC_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| AgentError::Config("ANTHROPIC_API_KEY is not set".into()))?;

        let mut config = Self::new(api_key.trim());
        if let Some(url) = lookup("ANTHROPIC_BASE_URL") {
            config.base_url = url;
        }
        if let Some(model) = lookup("ANTHROPIC_MODEL") {
            config.generation.model = model;
        }
        if let Some(raw) = lookup("ANTHROPIC_MAX_TOKENS") {
            config.generation.max_tokens = parse_number("ANTHROPIC_MAX_TOKENS", &raw)?;
        }
        if let Some(raw) = lookup("ANTHROPIC_TIMEOUT_SECS") {
            config.timeout_secs = parse_number("ANTHROPIC_TIMEOUT_SECS", &raw)?;
        }
        if let Some(raw) = lookup("ANTHROPIC_MAX_RETRIES") {
            config.retry = RetryConfig::with_retries(parse_number("ANTHROPIC_MAX_RETRIES", &raw)?);
        }
        Ok(config)
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| AgentError::Config(format!("{key} must be a number, got '{raw}'")))
}

// ============================================================================
// Wire format
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WireBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },
    ToolResult {
        tool_use_id: String,
        content: String,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        is_error: bool,
    },
    /// Block kinds we don't act on (thinking, server tools, ...)
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum WireContent {
    Text(String),
    Blocks(Vec<WireBlock>),
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: Role,
    content: WireContent,
}

#[derive(Debug, Serialize)]
struct WireTool<'a> {
    name: &'a str,
    description: &'a str,
    input_schema: Value,
}

#[derive(Debug, Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool<'a>>,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    content: Vec<WireBlock>,
    #[serde(default)]
    model: String,
    #[serde(default)]
    stop_reason: Option<String>,
    #[serde(default)]
    usage: Option<TokenUsage>,
}

#[derive(Debug, Deserialize)]
struct WireErrorBody {
    error: WireErrorDetail,
}

#[derive(Debug, Deserialize)]
struct WireErrorDetail {
    message: String,
}

fn to_wire_block(block: &ContentBlock) -> WireBlock {
    match block {
        ContentBlock::Text { text } => WireBlock::Text { text: text.clone() },
        ContentBlock::ToolRequest(req) => WireBlock::ToolUse {
            id: req.id.clone(),
            name: req.name.clone(),
            input: Value::Object(req.input.clone()),
        },
        ContentBlock::ToolResult(ToolResultBlock {
            tool_request_id,
            content,
            is_error,
        }) => WireBlock::ToolResult {
            tool_use_id: tool_request_id.clone(),
            content: content.clone(),
            is_error: *is_error,
        },
    }
}

fn from_wire_block(block: WireBlock) -> Option<ContentBlock> {
    match block {
        WireBlock::Text { text } => Some(ContentBlock::Text { text }),
        WireBlock::ToolUse { id, name, input } => Some(ContentBlock::ToolRequest(ToolRequest {
            id,
            name,
            // The API always sends an object; anything else means "no arguments".
            input: match input {
                Value::Object(map) => map,
                _ => serde_json::Map::new(),
            },
        })),
        WireBlock::ToolResult { .. } | WireBlock::Unsupported => None,
    }
}

// ============================================================================
// Provider
// ============================================================================

/// Anthropic LLM provider
pub struct AnthropicProvider {
    client: Client,
    config: AnthropicConfig,
}

impl AnthropicProvider {
    /// Create from configuration
    pub fn from_config(config: AnthropicConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AgentError::Config(format!("HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_config(AnthropicConfig::from_env()?)
    }

    fn build_request<'a>(
        &'a self,
        conversation: &'a Conversation,
        tools: &'a [ToolDescriptor],
    ) -> WireRequest<'a> {
        let messages = conversation
            .turns()
            .iter()
            .map(|turn| WireMessage {
                role: turn.role,
                content: match &turn.content {
                    TurnContent::Text(text) => WireContent::Text(text.clone()),
                    TurnContent::Blocks(blocks) => {
                        WireContent::Blocks(blocks.iter().map(to_wire_block).collect())
                    }
                },
            })
            .collect();

        WireRequest {
            model: &self.config.generation.model,
            max_tokens: self.config.generation.max_tokens,
            system: conversation.system_prompt(),
            temperature: self.config.generation.temperature,
            messages,
            tools: tools
                .iter()
                .map(|t| WireTool {
                    name: &t.name,
                    description: &t.description,
                    input_schema: t.input_schema.to_json_schema(),
                })
                .collect(),
        }
    }

    async fn post_once(&self, request: &WireRequest<'_>) -> Result<WireResponse> {
        let url = format!("{}/v1/messages", self.config.base_url.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", API_VERSION)
            .json(request)
            .send()
            .await
            .map_err(|e| AgentError::ProviderUnavailable(e.without_url().to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AgentError::ProviderUnavailable(e.without_url().to_string()))?;

        if status.is_success() {
            return serde_json::from_str(&body).map_err(|e| AgentError::Provider {
                status: status.as_u16(),
                message: format!("malformed response body: {e}"),
            });
        }

        let message = serde_json::from_str::<WireErrorBody>(&body)
            .map(|b| b.error.message)
            .unwrap_or_else(|_| format!("HTTP {status}"));

        if status == StatusCode::TOO_MANY_REQUESTS {
            Err(AgentError::RateLimited(message))
        } else {
            Err(AgentError::Provider {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "Anthropic"
    }

    fn model(&self) -> &str {
        &self.config.generation.model
    }

    async fn send(
        &self,
        conversation: &Conversation,
        tools: &[ToolDescriptor],
    ) -> Result<AssistantReply> {
        let request = self.build_request(conversation, tools);
        let retry = &self.config.retry;
        let mut attempt = 0;

        let response = loop {
            match self.post_once(&request).await {
                Ok(response) => break response,
                Err(e) if e.is_retryable() && attempt < retry.max_retries => {
                    let delay = retry.delay_for_attempt(attempt);
                    tracing::warn!(
                        attempt = attempt + 1,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %e,
                        "Retrying model call"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        };

        Ok(AssistantReply {
            content: response
                .content
                .into_iter()
                .filter_map(from_wire_block)
                .collect(),
            model: response.model,
            stop_reason: response.stop_reason.as_deref().map(StopReason::parse),
            usage: response.usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_core::tool::{InputSchema, ParamKind, ParameterSchema};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server: &MockServer, retries: u32) -> AnthropicProvider {
        let mut config = AnthropicConfig::new("test_api_key");
        config.base_url = server.uri();
        config.retry = RetryConfig::immediate(retries);
        AnthropicProvider::from_config(config).unwrap()
    }

    fn weather_tool() -> ToolDescriptor {
        ToolDescriptor {
            name: "get_weather".into(),
            description: "Current weather".into(),
            input_schema: InputSchema::new(vec![ParameterSchema::required(
                "latitude",
                ParamKind::Number,
                "Latitude",
            )]),
        }
    }

    #[test]
    fn test_config_from_lookup() {
        let config = AnthropicConfig::from_lookup(|k| match k {
            "ANTHROPIC_API_KEY" => Some("sk-test".into()),
            "ANTHROPIC_MAX_TOKENS" => Some("512".into()),
            "ANTHROPIC_MAX_RETRIES" => Some("4".into()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.generation.max_tokens, 512);
        assert_eq!(config.retry.max_retries, 4);
        assert_eq!(config.base_url, "https://api.anthropic.com");
        assert!(!format!("{config:?}").contains("sk-test"));
    }

    #[test]
    fn test_missing_key_is_config_error() {
        let err = AnthropicConfig::from_lookup(|_| None).unwrap_err();
        assert!(matches!(err, AgentError::Config(_)));
        let err = AnthropicConfig::from_lookup(|k| {
            (k == "ANTHROPIC_API_KEY").then(|| "  ".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, AgentError::Config(_)));
    }

    #[tokio::test]
    async fn test_tool_use_reply_is_mapped() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "test_api_key"))
            .and(header("anthropic-version", API_VERSION))
            .and(body_partial_json(json!({
                "max_tokens": 1024,
                "system": "be brief",
                "tools": [{"name": "get_weather"}],
                "messages": [{"role": "user", "content": "weather in Paris"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "msg_1",
                "type": "message",
                "role": "assistant",
                "model": "claude-test",
                "content": [
                    {"type": "thinking", "thinking": "hmm", "signature": "x"},
                    {"type": "text", "text": "Checking."},
                    {"type": "tool_use", "id": "toolu_1", "name": "get_weather", "input": {"latitude": 48.85}}
                ],
                "stop_reason": "tool_use",
                "usage": {"input_tokens": 20, "output_tokens": 10}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider_for(&server, 0);
        let conversation =
            Conversation::seeded(Some("be brief".into()), "weather in Paris");

        let reply = provider.send(&conversation, &[weather_tool()]).await.unwrap();

        assert_eq!(reply.content.len(), 2);
        assert_eq!(reply.content[0].as_text(), Some("Checking."));
        let request = reply.content[1].as_tool_request().unwrap();
        assert_eq!(request.id, "toolu_1");
        assert_eq!(request.input["latitude"], json!(48.85));
        assert_eq!(reply.stop_reason, Some(StopReason::ToolUse));
        assert_eq!(reply.usage.unwrap().output_tokens, 10);
    }

    #[tokio::test]
    async fn test_tool_results_sent_as_tool_result_blocks() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "messages": [
                    {"role": "user"},
                    {"role": "assistant", "content": [{"type": "tool_use", "id": "t1"}]},
                    {"role": "user", "content": [
                        {"type": "tool_result", "tool_use_id": "t1", "is_error": true}
                    ]}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [{"type": "text", "text": "Sorry, I couldn't find it."}],
                "model": "claude-test",
                "stop_reason": "end_turn"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut conversation = Conversation::seeded(None, "weather in Atlantis");
        conversation.push_assistant(vec![ContentBlock::tool_request(
            "t1",
            "get_coordinates",
            serde_json::Map::new(),
        )]);
        conversation
            .push_tool_results(vec![ToolResultBlock {
                tool_request_id: "t1".into(),
                content: r#"{"error":"Place not found: Atlantis"}"#.into(),
                is_error: true,
            }])
            .unwrap();

        let reply = provider_for(&server, 0).send(&conversation, &[]).await.unwrap();
        assert_eq!(reply.content[0].as_text(), Some("Sorry, I couldn't find it."));
    }

    #[tokio::test]
    async fn test_rate_limit_is_distinct_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "type": "error",
                "error": {"type": "rate_limit_error", "message": "Number of requests has exceeded your rate limit"}
            })))
            .expect(3)
            .mount(&server)
            .await;

        let err = provider_for(&server, 2)
            .send(&Conversation::seeded(None, "hi"), &[])
            .await
            .unwrap_err();

        assert!(matches!(err, AgentError::RateLimited(ref m) if m.contains("rate limit")));
    }

    #[tokio::test]
    async fn test_bad_request_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "type": "error",
                "error": {"type": "invalid_request_error", "message": "messages: field required"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let err = provider_for(&server, 3)
            .send(&Conversation::seeded(None, "hi"), &[])
            .await
            .unwrap_err();

        match err {
            AgentError::Provider { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "messages: field required");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_host_is_unavailable() {
        let mut config = AnthropicConfig::new("test_api_key");
        config.base_url = "http://127.0.0.1:9".into();
        config.retry = RetryConfig::immediate(0);
        let provider = AnthropicProvider::from_config(config).unwrap();

        let err = provider
            .send(&Conversation::seeded(None, "hi"), &[])
            .await
            .unwrap_err();

        assert!(matches!(err, AgentError::ProviderUnavailable(_)));
        assert!(!err.to_string().contains("127.0.0.1"));
    }

    #[tokio::test]
    async fn test_unparseable_success_body_is_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .expect(1)
            .mount(&server)
            .await;

        let err = provider_for(&server, 2)
            .send(&Conversation::seeded(None, "hi"), &[])
            .await
            .unwrap_err();

        match err {
            AgentError::Provider { status, message } => {
                assert_eq!(status, 200);
                assert!(message.starts_with("malformed response body"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_server_error_retried_then_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(529).set_body_string("overloaded"))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [{"type": "text", "text": "ok"}],
                "model": "claude-test"
            })))
            .mount(&server)
            .await;

        let reply = provider_for(&server, 1)
            .send(&Conversation::seeded(None, "hi"), &[])
            .await
            .unwrap();
        assert_eq!(reply.content[0].as_text(), Some("ok"));
    }
}
