//! `read_file` — return the text content of a file, size-capped.

use async_trait::async_trait;
use codewright_core::error::ToolError;
use codewright_core::tool::{ExecutionContext, Tool, ToolParams};
use tracing::{error, info};

/// Default cap: 1 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1024 * 1024;

pub struct ReadFileTool {
    max_file_size: u64,
}

impl ReadFileTool {
    pub fn new() -> Self {
        Self::with_max_file_size(DEFAULT_MAX_FILE_SIZE)
    }

    pub fn with_max_file_size(max_file_size: u64) -> Self {
        Self { max_file_size }
    }

    async fn read(&self, path: &str, ctx: &ExecutionContext) -> Result<String, ToolError> {
        let file = ctx.resolve(path);
        let shown = file.display().to_string();

        let metadata = match tokio::fs::metadata(&file).await {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ToolError::FileNotFound(shown));
            }
            Err(e) => return Err(e.into()),
        };

        if !metadata.is_file() {
            return Err(ToolError::NotAFile(shown));
        }

        if metadata.len() > self.max_file_size {
            return Err(ToolError::TooLarge {
                path: shown,
                limit_bytes: self.max_file_size,
            });
        }

        let content = tokio::fs::read_to_string(&file).await?;
        info!(path = %shown, bytes = metadata.len(), "Read file");
        Ok(content)
    }
}

impl Default for ReadFileTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for ReadFileTool {
    fn name(&self) -> &str {
        "read_file"
    }

    fn description(&self) -> &str {
        "Reads the content of a file.\nParameters: {\"path\": \"file/path\"}\nReturns: File content as string."
    }

    async fn execute(&self, parameters: &str, ctx: &ExecutionContext) -> String {
        let path = ToolParams::parse(parameters).field_or_raw("path");
        match self.read(&path, ctx).await {
            Ok(content) => content,
            Err(e) => {
                error!(path = %path, error = %e, "Error reading file");
                e.to_result_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_definition() {
        let tool = ReadFileTool::new();
        assert_eq!(tool.name(), "read_file");
        assert!(tool.description().contains(r#"{"path": "file/path"}"#));
    }

    #[tokio::test]
    async fn read_existing_file_under_base_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("hello.txt"), "Hello, world!").unwrap();

        let ctx = ExecutionContext::with_base_dir(dir.path());
        let out = ReadFileTool::new()
            .execute(r#"{"path": "hello.txt"}"#, &ctx)
            .await;
        assert_eq!(out, "Hello, world!");
    }

    #[tokio::test]
    async fn raw_parameter_is_used_as_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.md"), "raw").unwrap();

        let ctx = ExecutionContext::with_base_dir(dir.path());
        let out = ReadFileTool::new().execute("  notes.md  ", &ctx).await;
        assert_eq!(out, "raw");
    }

    #[tokio::test]
    async fn missing_file_is_an_error_result() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ExecutionContext::with_base_dir(dir.path());
        let out = ReadFileTool::new()
            .execute(r#"{"path": "nope.txt"}"#, &ctx)
            .await;
        assert!(out.starts_with("Error: File not found: "));
        assert!(out.ends_with("nope.txt"));
    }

    #[tokio::test]
    async fn directory_is_not_a_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        let ctx = ExecutionContext::with_base_dir(dir.path());
        let out = ReadFileTool::new().execute(r#"{"path": "sub"}"#, &ctx).await;
        assert!(out.starts_with("Error: Path is not a file: "));
    }

    #[tokio::test]
    async fn oversized_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("big.txt"), "x".repeat(2048)).unwrap();
        let ctx = ExecutionContext::with_base_dir(dir.path());
        let out = ReadFileTool::with_max_file_size(1024)
            .execute(r#"{"path": "big.txt"}"#, &ctx)
            .await;
        assert!(out.starts_with("Error: File too large (max 1KB): "));
    }
}
