//! `write_file` — create or overwrite a file, creating parent directories.

use async_trait::async_trait;
use codewright_core::error::ToolError;
use codewright_core::tool::{ExecutionContext, Tool, ToolParams};
use tracing::{error, info};

pub struct WriteFileTool;

impl WriteFileTool {
    async fn write(
        &self,
        path: &str,
        content: &str,
        ctx: &ExecutionContext,
    ) -> Result<String, ToolError> {
        let file = ctx.resolve(path);

        if let Some(parent) = file.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&file, content).await?;

        let shown = file.display().to_string();
        info!(path = %shown, bytes = content.len(), "Wrote file");
        Ok(shown)
    }
}

#[async_trait]
impl Tool for WriteFileTool {
    fn name(&self) -> &str {
        "write_file"
    }

    fn description(&self) -> &str {
        "Writes content to a file. Creates parent directories if needed.\nParameters: {\"path\": \"file/path\", \"content\": \"file content\"}\nReturns: Success message or error."
    }

    async fn execute(&self, parameters: &str, ctx: &ExecutionContext) -> String {
        // Unparseable parameters leave both fields empty; the write then fails on the base dir.
        let params = ToolParams::parse(parameters);
        let path = params.field("path").unwrap_or_default();
        let content = params.field("content").unwrap_or_default();

        match self.write(&path, &content, ctx).await {
            Ok(shown) => format!("Success: File written to {shown}"),
            Err(e) => {
                error!(path = %path, error = %e, "Error writing file");
                e.to_result_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ExecutionContext::with_base_dir(dir.path());

        let out = WriteFileTool
            .execute(r#"{"path": "a/b/c.txt", "content": "nested"}"#, &ctx)
            .await;

        let expected = dir.path().join("a/b/c.txt");
        assert_eq!(out, format!("Success: File written to {}", expected.display()));
        assert_eq!(std::fs::read_to_string(expected).unwrap(), "nested");
    }

    #[tokio::test]
    async fn write_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("f.txt"), "old content that is longer").unwrap();
        let ctx = ExecutionContext::with_base_dir(dir.path());

        WriteFileTool
            .execute(r#"{"path": "f.txt", "content": "new"}"#, &ctx)
            .await;
        assert_eq!(std::fs::read_to_string(dir.path().join("f.txt")).unwrap(), "new");
    }

    #[tokio::test]
    async fn escaped_content_is_unescaped() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ExecutionContext::with_base_dir(dir.path());

        WriteFileTool
            .execute(
                r#"{"path": "m.rs", "content": "fn main() {\n    println!(\"hi\");\n}\n"}"#,
                &ctx,
            )
            .await;
        assert_eq!(
            std::fs::read_to_string(dir.path().join("m.rs")).unwrap(),
            "fn main() {\n    println!(\"hi\");\n}\n"
        );
    }

    #[tokio::test]
    async fn malformed_parameters_yield_error() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ExecutionContext::with_base_dir(dir.path());
        let out = WriteFileTool.execute("not json", &ctx).await;
        assert!(out.starts_with("Error: "));
    }
}
