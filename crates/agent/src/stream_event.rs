//! Agent-level streaming events.
//!
//! `StreamEvent` is the observable protocol of one agent run. The transport
//! layer can forward events over SSE using `event_type()` as the event name
//! and the serde representation as the payload.

use serde::{Deserialize, Serialize};

/// Events emitted by an agent run, in order.
///
/// A run that is not cancelled ends with exactly one `TaskComplete` or `Error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// A new model turn is starting.
    IterationStart { iteration: u32, max_iterations: u32 },

    /// Partial text from the model (only when chunk events are enabled).
    AiThinking { content: String },

    /// The full model text of one turn, once its stream closed.
    AiResponse { content: String },

    /// A tool is about to run. Parameters are redacted for display.
    ToolCall { tool_name: String, parameters: String },

    /// A tool finished. The result is the display form, not the raw output.
    ToolResult { tool_name: String, result: String },

    /// `finish_task` ran; the run is over.
    TaskComplete { summary: String },

    /// The run failed.
    Error { error: String, message: String },

    /// Progress note from a composite run.
    Log { message: String },
}

impl StreamEvent {
    /// SSE event name for this event type.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::IterationStart { .. } => "iteration_start",
            Self::AiThinking { .. } => "ai_thinking",
            Self::AiResponse { .. } => "ai_response",
            Self::ToolCall { .. } => "tool_call",
            Self::ToolResult { .. } => "tool_result",
            Self::TaskComplete { .. } => "task_complete",
            Self::Error { .. } => "error",
            Self::Log { .. } => "log",
        }
    }

    /// Human-readable one-line description.
    pub fn message(&self) -> String {
        match self {
            Self::IterationStart {
                iteration,
                max_iterations,
            } => format!("Starting iteration {iteration} of {max_iterations}"),
            Self::AiThinking { content } | Self::AiResponse { content } => content.clone(),
            Self::ToolCall { tool_name, .. } => format!("Calling tool {tool_name}"),
            Self::ToolResult { tool_name, .. } => format!("Tool {tool_name} completed"),
            Self::TaskComplete { summary } => format!("Task completed successfully:\n\n{summary}"),
            Self::Error { message, .. } | Self::Log { message } => message.clone(),
        }
    }

    /// Whether this event ends a run.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::TaskComplete { .. } | Self::Error { .. })
    }

    /// Append this event to a plain-text run log.
    ///
    /// Each event contributes its message on its own line; tool results also
    /// contribute their display text. Partial `AiThinking` deltas are skipped.
    pub fn append_to(&self, out: &mut String) {
        if let Self::AiThinking { .. } = self {
            return;
        }
        out.push_str(&self.message());
        out.push('\n');
        if let Self::ToolResult { result, .. } = self {
            out.push_str(result);
            out.push('\n');
        }
    }
}
