//! `log_thought` — record a reasoning step. No side effects beyond logging.

use async_trait::async_trait;
use codewright_core::tool::{ExecutionContext, Tool, ToolParams};
use tracing::info;

pub struct LogThoughtTool;

#[async_trait]
impl Tool for LogThoughtTool {
    fn name(&self) -> &str {
        "log_thought"
    }

    fn description(&self) -> &str {
        "Logs a thought or reasoning step. Use this to explain your thinking process.\nParameters: {\"thought\": \"your reasoning here\"}\nReturns: Confirmation message."
    }

    async fn execute(&self, parameters: &str, _ctx: &ExecutionContext) -> String {
        let thought = ToolParams::parse(parameters).field_or_raw("thought");
        info!(thought = %thought, "Agent thought");
        format!("Thought logged: {thought}")
    }
}
