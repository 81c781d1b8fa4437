//! HTTP Handlers

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::Instrument;

use agent_core::{AgentBuilder, AgentError};
use travel_tools::TRAVEL_AGENT_PROMPT;

use crate::state::AppState;

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub model_configured: bool,
}

#[derive(Serialize)]
pub struct ToolInfo {
    pub name: String,
    pub description: String,
}

#[derive(Serialize)]
pub struct InfoResponse {
    pub name: &'static str,
    pub version: &'static str,
    pub model: Option<String>,
    pub max_tool_rounds: usize,
    pub tools: Vec<ToolInfo>,
}

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    #[serde(default, alias = "query")]
    pub input: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub response: String,
}

/// Every failure is reported with this body and nothing else
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

/// HTTP status for a failed query
pub const fn status_for(error: &AgentError) -> StatusCode {
    match error {
        AgentError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        AgentError::Config(_) => StatusCode::SERVICE_UNAVAILABLE,
        AgentError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
        AgentError::Provider { .. } | AgentError::ProviderUnavailable(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<AgentError> for ErrorResponse {
    fn from(error: AgentError) -> Self {
        Self {
            error: error.user_message(),
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        model_configured: state.provider.is_some(),
    })
}

/// Describe the configured model and tool set
pub async fn service_info(State(state): State<AppState>) -> Json<InfoResponse> {
    let tools = state
        .tools
        .descriptors()
        .iter()
        .map(|d| ToolInfo {
            name: d.name.clone(),
            description: d.description.clone(),
        })
        .collect();

    Json(InfoResponse {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        model: state.provider.as_ref().map(|p| p.model().to_string()),
        max_tool_rounds: state.config.max_tool_rounds,
        tools,
    })
}

/// Answer one travel query
pub async fn query_handler(
    State(state): State<AppState>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<QueryResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::debug!("Rejected query body: {}", rejection.body_text());
        api_error(
            StatusCode::BAD_REQUEST,
            r#"Request body must be JSON of the form {"input": "..."}"#,
        )
    })?;

    let input = request.input.as_deref().map(str::trim).unwrap_or_default();
    if input.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "No input provided"));
    }

    let provider = state.provider.clone().ok_or_else(|| {
        tracing::warn!("Query received but no model credential is configured");
        let error = AgentError::Config("ANTHROPIC_API_KEY is not set".into());
        (status_for(&error), Json(ErrorResponse::from(error)))
    })?;

    let agent = AgentBuilder::new()
        .provider(provider)
        .tools(state.tools.clone())
        .system_prompt(TRAVEL_AGENT_PROMPT)
        .max_iterations(state.config.max_tool_rounds)
        .build()
        .map_err(|e| {
            tracing::error!("Agent setup failed: {}", e);
            (status_for(&e), Json(ErrorResponse::from(e)))
        })?;

    let request_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("query", %request_id);

    let answer = agent.ask(input).instrument(span.clone()).await.map_err(|e| {
        let _entered = span.enter();
        tracing::error!("Query failed: {}", e);
        (status_for(&e), Json(ErrorResponse::from(e)))
    })?;

    span.in_scope(|| {
        tracing::info!(
            model_calls = answer.model_calls,
            tool_rounds = answer.tool_rounds,
            "Query answered"
        );
    });

    Ok(Json(QueryResponse {
        response: answer.text,
    }))
}
