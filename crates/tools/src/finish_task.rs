//! `finish_task` — the terminal signal of an agent run.
//!
//! Returns a JSON payload: `{"status":"TASK_COMPLETE","summary":...,"timestamp":...}`.
//! The agent loop recognises the tool by name and ends the run.

use async_trait::async_trait;
use codewright_core::tool::{ExecutionContext, Tool, ToolParams};
use tracing::info;

pub const FINISH_TASK: &str = "finish_task";

pub struct FinishTaskTool;

/// Pull the summary back out of a `finish_task` result.
///
/// Falls back to the raw result when it is not the expected payload.
pub fn extract_summary(result: &str) -> String {
    serde_json::from_str::<serde_json::Value>(result)
        .ok()
        .and_then(|v| v.get("summary").and_then(|s| s.as_str()).map(String::from))
        .unwrap_or_else(|| result.to_string())
}

#[async_trait]
impl Tool for FinishTaskTool {
    fn name(&self) -> &str {
        FINISH_TASK
    }

    fn description(&self) -> &str {
        "Signals that the task is complete. MUST be called when all work is done.\nParameters: {\"summary\": \"brief summary of what was accomplished\"}\nReturns: Task completion confirmation."
    }

    async fn execute(&self, parameters: &str, _ctx: &ExecutionContext) -> String {
        let summary = ToolParams::parse(parameters).field_or_raw("summary");
        info!(summary = %summary, "Task marked complete");
        serde_json::json!({
            "status": "TASK_COMPLETE",
            "summary": summary,
            "timestamp": chrono::Utc::now().timestamp_millis(),
        })
        .to_string()
    }
}
