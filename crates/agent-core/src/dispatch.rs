//! Tool Dispatch
//!
//! Runs one batch of tool requests (everything a single assistant turn asked
//! for) and produces exactly one result block per request. Failures are
//! turned into `{"error": ...}` outcomes here and never propagate further.

use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;

use crate::message::{ToolRequest, ToolResultBlock};
use crate::tool::{ToolOutcome, ToolRegistry};

/// Outcome reported for a name the registry does not know
pub const UNKNOWN_TOOL: &str = "Unknown tool";

/// Fans a batch out to the registry's handlers and joins the results
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
}

impl Dispatcher {
    pub const fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Execute every request concurrently and wait for all of them.
    ///
    /// Results come back in request order, though nothing downstream
    /// depends on that.
    pub async fn dispatch(&self, requests: &[ToolRequest]) -> Vec<ToolResultBlock> {
        let tasks = requests.iter().map(|request| {
            let registry = Arc::clone(&self.registry);
            let request = request.clone();
            async move {
                let outcome = run_one(registry, &request).await;
                ToolResultBlock {
                    tool_request_id: request.id,
                    content: outcome.to_content(),
                    is_error: outcome.is_error(),
                }
            }
        });
        join_all(tasks).await
    }
}

async fn run_one(registry: Arc<ToolRegistry>, request: &ToolRequest) -> ToolOutcome {
    let Some(tool) = registry.lookup(&request.name) else {
        tracing::warn!(tool = %request.name, id = %request.id, "Model requested unknown tool");
        return ToolOutcome::error(UNKNOWN_TOOL);
    };

    if let Some(descriptor) = registry.descriptor(&request.name) {
        if let Err(e) = descriptor.input_schema.validate(&request.input) {
            tracing::warn!(tool = %request.name, id = %request.id, error = %e, "Rejected tool input");
            return ToolOutcome::error(format!("Invalid input: {e}"));
        }
    }

    let started = Instant::now();
    let input = request.input.clone();
    // A separate task so a panicking handler only takes itself down.
    let handle = tokio::spawn(async move { tool.execute(&input).await });

    let outcome = match handle.await {
        Ok(Ok(value)) => ToolOutcome::Success(value),
        Ok(Err(e)) => {
            tracing::warn!(tool = %request.name, id = %request.id, error = %e, "Tool failed");
            ToolOutcome::error(e.to_string())
        }
        Err(join_err) => {
            tracing::error!(tool = %request.name, id = %request.id, error = %join_err, "Tool task aborted");
            ToolOutcome::error(format!("Tool '{}' panicked", request.name))
        }
    };

    tracing::debug!(
        tool = %request.name,
        id = %request.id,
        elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        error = outcome.is_error(),
        "Tool finished"
    );
    outcome
}
