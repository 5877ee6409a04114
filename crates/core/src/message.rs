//! Message and Transcript domain types.
//!
//! A `Message` is what crosses the provider boundary. A `Transcript` is the
//! append-only record one agent run builds up and re-sends to the model on
//! every iteration, rendered as a single block of prompt text.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for one agent run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub String);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The role of a message sender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single message sent to or received from a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique message ID
    pub id: String,

    /// Who sent this message
    pub role: Role,

    /// The text content
    pub content: String,

    /// Timestamp
    pub timestamp: DateTime<Utc>,
}

impl Message {
    fn with_role(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(Role::User, content)
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role(Role::Assistant, content)
    }
}

/// Injected after an iteration in which the model called no tool.
pub const TOOL_USE_REMINDER: &str = "You must use tools to complete the task. \
     Call tools using format: TOOL: tool_name {parameters}";

/// One entry of a run transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TranscriptEntry {
    /// Agent-specific system prompt
    SystemPrompt { text: String },
    /// Rendered `- name: description` lines
    ToolDocs { text: String },
    /// Summary of the working directory
    DirectoryContext { text: String },
    /// The task as the user phrased it
    UserRequest { text: String },
    /// Fixed instruction that closes the preamble
    Kickoff,
    /// Raw (unredacted) output of one tool execution
    ToolResult { tool: String, output: String },
    /// One full streamed assistant turn
    Assistant { text: String },
    /// Reminder to use the tool-call syntax
    Correction,
}

/// The ordered, append-only conversation of one agent run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a transcript with the standard preamble.
    ///
    /// An empty `directory_context` is left out entirely.
    pub fn seeded(
        system_prompt: &str,
        tool_docs: &str,
        directory_context: &str,
        user_request: &str,
    ) -> Self {
        let mut transcript = Self::new();
        transcript.push(TranscriptEntry::SystemPrompt {
            text: system_prompt.to_string(),
        });
        transcript.push(TranscriptEntry::ToolDocs {
            text: tool_docs.to_string(),
        });
        if !directory_context.is_empty() {
            transcript.push(TranscriptEntry::DirectoryContext {
                text: directory_context.to_string(),
            });
        }
        transcript.push(TranscriptEntry::UserRequest {
            text: user_request.to_string(),
        });
        transcript.push(TranscriptEntry::Kickoff);
        transcript
    }

    pub fn push(&mut self, entry: TranscriptEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render the whole transcript as the prompt text sent to the model.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            match entry {
                TranscriptEntry::SystemPrompt { text } => {
                    out.push_str(text);
                    out.push_str("\n\n");
                }
                TranscriptEntry::ToolDocs { text } => {
                    out.push_str("Available Tools:\n");
                    out.push_str(text);
                    out.push_str("\n\n");
                }
                TranscriptEntry::DirectoryContext { text } => {
                    out.push_str("Directory Context:\n");
                    out.push_str(text);
                    out.push_str("\n\n");
                }
                TranscriptEntry::UserRequest { text } => {
                    out.push_str("User Request: ");
                    out.push_str(text);
                    out.push_str("\n\n");
                }
                TranscriptEntry::Kickoff => {
                    out.push_str("Begin your work. Use tools to accomplish the task.\n");
                }
                TranscriptEntry::ToolResult { tool, output } => {
                    out.push_str(&format!("Tool Result ({tool}): {output}\n\n"));
                }
                TranscriptEntry::Assistant { text } => {
                    out.push_str("Assistant: ");
                    out.push_str(text);
                    out.push_str("\n\n");
                }
                TranscriptEntry::Correction => {
                    out.push_str("System: ");
                    out.push_str(TOOL_USE_REMINDER);
                    out.push_str("\n\n");
                }
            }
        }
        out
    }

    /// Rough token estimate (4 chars ≈ 1 token).
    pub fn estimated_tokens(&self) -> usize {
        self.render().len() / 4
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_user_message() {
        let msg = Message::user("Hello, agent!");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "Hello, agent!");
    }

    #[test]
    fn seeded_transcript_renders_preamble_in_order() {
        let t = Transcript::seeded("SYS", "- a: b", "tree", "do it");
        let text = t.render();
        let sys = text.find("SYS").unwrap();
        let tools = text.find("Available Tools:\n- a: b").unwrap();
        let ctx = text.find("Directory Context:\ntree").unwrap();
        let req = text.find("User Request: do it").unwrap();
        let kick = text.find("Begin your work.").unwrap();
        assert!(sys < tools && tools < ctx && ctx < req && req < kick);
    }

    #[test]
    fn empty_directory_context_is_omitted() {
        let t = Transcript::seeded("SYS", "docs", "", "req");
        assert!(!t.render().contains("Directory Context:"));
        assert_eq!(t.len(), 4);
    }

    #[test]
    fn turns_render_with_labels() {
        let mut t = Transcript::new();
        t.push(TranscriptEntry::ToolResult {
            tool: "log_thought".into(),
            output: "Thought logged: x".into(),
        });
        t.push(TranscriptEntry::Assistant { text: "hi".into() });
        t.push(TranscriptEntry::Correction);
        let text = t.render();
        assert!(text.contains("Tool Result (log_thought): Thought logged: x\n\n"));
        assert!(text.contains("Assistant: hi\n\n"));
        assert!(text.contains("System: You must use tools to complete the task."));
        assert!(text.contains("TOOL: tool_name {parameters}"));
    }

    #[test]
    fn transcript_token_estimate() {
        let mut t = Transcript::new();
        // "Assistant: " + 9 chars + "\n\n" = 22 chars ≈ 5 tokens
        t.push(TranscriptEntry::Assistant {
            text: "123456789".into(),
        });
        assert_eq!(t.estimated_tokens(), 5);
    }
}
