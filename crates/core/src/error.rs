//! Error types for the Codewright domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

use crate::agent::AgentType;

/// The top-level error type for all Codewright operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Agent / orchestration errors ---
    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Stream interrupted: {0}")]
    StreamInterrupted(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Failures inside a tool.
///
/// These never cross the `Tool::execute` boundary as `Err`; tools render them
/// into an `Error: ...` result string the model can read and react to.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unknown tool '{0}'")]
    NotFound(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Path is not a file: {0}")]
    NotAFile(String),

    #[error("Directory not found: {0}")]
    DirectoryNotFound(String),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    #[error("File too large (max {}): {path}", human_size(.limit_bytes))]
    TooLarge { path: String, limit_bytes: u64 },

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl ToolError {
    /// Render as the `Error: ...` string fed back to the model.
    pub fn to_result_string(&self) -> String {
        format!("Error: {self}")
    }
}

/// `1048576` -> `1MB`, `2048` -> `2KB`, anything else in bytes.
fn human_size(bytes: &u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    match *bytes {
        b if b >= MB && b % MB == 0 => format!("{}MB", b / MB),
        b if b >= KB && b % KB == 0 => format!("{}KB", b / KB),
        b => format!("{b} bytes"),
    }
}

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Agent not found for type: {0}")]
    NotRegistered(AgentType),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = Error::Provider(ProviderError::ApiError {
            status_code: 429,
            message: "Too many requests".into(),
        });
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn tool_error_renders_as_result_string() {
        let err = ToolError::NotFound("shell".into());
        assert_eq!(err.to_result_string(), "Error: Unknown tool 'shell'");

        let err = ToolError::TooLarge {
            path: "/tmp/big.bin".into(),
            limit_bytes: 1024,
        };
        assert_eq!(
            err.to_result_string(),
            "Error: File too large (max 1KB): /tmp/big.bin"
        );

        let err = ToolError::TooLarge {
            path: "/f".into(),
            limit_bytes: 1024 * 1024,
        };
        assert_eq!(err.to_string(), "File too large (max 1MB): /f");
    }

    #[test]
    fn agent_error_names_missing_type() {
        let err = Error::Agent(AgentError::NotRegistered(AgentType::Bugfix));
        assert!(err.to_string().contains("BUGFIX"));
    }
}
