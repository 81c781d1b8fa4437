//! Router assembly

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::handlers::{health_check, query_handler, service_info};
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let static_files = ServeDir::new(&state.config.static_dir);

    Router::new()
        // Health & info
        .route("/health", get(health_check))
        .route("/api/info", get(service_info))
        // Agent API
        .route("/api/query", post(query_handler))
        // Static files (chat page)
        .fallback_service(static_files)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use agent_core::{
        ContentBlock, LlmProvider, ToolInput, ToolRegistry,
        mock::{ScriptStep, ScriptedProvider},
    };

    use super::*;
    use crate::config::ServerConfig;

    fn state_with(provider: Option<Arc<ScriptedProvider>>, max_tool_rounds: usize) -> AppState {
        AppState {
            provider: provider.map(|p| p as Arc<dyn LlmProvider>),
            tools: Arc::new(ToolRegistry::new()),
            config: Arc::new(ServerConfig {
                max_tool_rounds,
                ..ServerConfig::default()
            }),
        }
    }

    fn weather_request(id: &str) -> ContentBlock {
        let mut input = ToolInput::new();
        input.insert("place_name".into(), json!("Paris"));
        ContentBlock::tool_request(id, "get_weather", input)
    }

    async fn post_query(state: AppState, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/api/query")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = router(state).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn get_json(state: AppState, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = router(state).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_query_returns_final_text() {
        let provider = Arc::new(ScriptedProvider::replies(vec![vec![ContentBlock::text(
            "Paris is mild today.",
        )]]));
        let (status, body) =
            post_query(state_with(Some(provider.clone()), 5), r#"{"input": "  Weather in Paris?  "}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"response": "Paris is mild today."}));
        assert_eq!(provider.calls().await, 1);
    }

    #[tokio::test]
    async fn test_query_alias_and_tool_round() {
        let provider = Arc::new(ScriptedProvider::replies(vec![
            vec![weather_request("t1")],
            vec![ContentBlock::text("I could not check the weather.")],
        ]));
        let (status, body) =
            post_query(state_with(Some(provider.clone()), 5), r#"{"query": "Weather in Paris?"}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["response"], "I could not check the weather.");
        assert_eq!(provider.calls().await, 2);
    }

    #[tokio::test]
    async fn test_missing_input_is_rejected_without_model_call() {
        let provider = Arc::new(ScriptedProvider::replies(vec![]));
        for payload in [r"{}", r#"{"input": "   "}"#] {
            let (status, body) = post_query(state_with(Some(provider.clone()), 5), payload).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body, json!({"error": "No input provided"}));
        }
        assert_eq!(provider.calls().await, 0);
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let (status, body) = post_query(state_with(None, 5), "not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
        assert_eq!(body.as_object().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unconfigured_provider_is_unavailable() {
        let (status, body) = post_query(state_with(None, 5), r#"{"input": "hi"}"#).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body["error"].as_str().unwrap().contains("not configured"));
    }

    #[tokio::test]
    async fn test_invalid_round_limit_is_unavailable() {
        let provider = Arc::new(ScriptedProvider::replies(vec![vec![ContentBlock::text("hi")]]));
        let (status, body) =
            post_query(state_with(Some(provider.clone()), 0), r#"{"input": "hi"}"#).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body["error"].is_string());
        assert_eq!(provider.calls().await, 0);
    }

    #[tokio::test]
    async fn test_exhausted_rounds_is_server_error() {
        let provider = Arc::new(ScriptedProvider::repeating(ScriptStep::Reply(vec![
            weather_request("again"),
        ])));
        let (status, body) =
            post_query(state_with(Some(provider.clone()), 2), r#"{"input": "loop forever"}"#).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("2 tool rounds"));
        assert_eq!(provider.calls().await, 2);
    }

    #[tokio::test]
    async fn test_provider_failures_map_to_status() {
        let limited = Arc::new(ScriptedProvider::new(vec![ScriptStep::Fail {
            status: 429,
            message: "slow down".into(),
        }]));
        let (status, _) = post_query(state_with(Some(limited), 5), r#"{"input": "hi"}"#).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

        let rejected = Arc::new(ScriptedProvider::new(vec![ScriptStep::Fail {
            status: 401,
            message: "invalid x-api-key sk-ant-secret".into(),
        }]));
        let (status, body) = post_query(state_with(Some(rejected), 5), r#"{"input": "hi"}"#).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(!body["error"].as_str().unwrap().contains("sk-ant"));

        let unreachable = Arc::new(ScriptedProvider::new(vec![ScriptStep::Unreachable]));
        let (status, body) = post_query(state_with(Some(unreachable), 5), r#"{"input": "hi"}"#).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body["error"].as_str().unwrap().contains("unavailable"));
    }

    #[tokio::test]
    async fn test_health_and_info() {
        let provider = Arc::new(ScriptedProvider::replies(vec![]));
        let (status, body) = get_json(state_with(Some(provider.clone()), 5), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["model_configured"], true);

        let (status, body) = get_json(state_with(Some(provider), 3), "/api/info").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["model"], "scripted");
        assert_eq!(body["max_tool_rounds"], 3);
        assert!(body["tools"].as_array().unwrap().is_empty());
    }
}
