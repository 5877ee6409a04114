//! `list_files` — shallow directory listing with `[DIR]`/`[FILE]` tags.

use async_trait::async_trait;
use codewright_core::error::ToolError;
use codewright_core::tool::{ExecutionContext, Tool, ToolParams};
use tracing::{error, info};

pub struct ListFilesTool;

impl ListFilesTool {
    async fn list(&self, path: &str, ctx: &ExecutionContext) -> Result<String, ToolError> {
        let dir = ctx.resolve(path);
        let shown = dir.display().to_string();

        let metadata = match tokio::fs::metadata(&dir).await {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ToolError::DirectoryNotFound(shown));
            }
            Err(e) => return Err(e.into()),
        };
        if !metadata.is_dir() {
            return Err(ToolError::NotADirectory(shown));
        }

        let mut entries = Vec::new();
        let mut read_dir = tokio::fs::read_dir(&dir).await?;
        while let Some(entry) = read_dir.next_entry().await? {
            let is_dir = entry.file_type().await?.is_dir();
            entries.push((entry.file_name().to_string_lossy().into_owned(), is_dir));
        }
        entries.sort();

        info!(path = %shown, count = entries.len(), "Listed directory");

        let mut out = format!("Files in {shown}:\n");
        for (name, is_dir) in entries {
            let tag = if is_dir { "[DIR]" } else { "[FILE]" };
            out.push_str(&format!("{tag} {name}\n"));
        }
        Ok(out)
    }
}

#[async_trait]
impl Tool for ListFilesTool {
    fn name(&self) -> &str {
        "list_files"
    }

    fn description(&self) -> &str {
        "Lists files and directories in a given path.\nParameters: {\"path\": \"directory/path\"}\nReturns: List of files and directories with their types."
    }

    async fn execute(&self, parameters: &str, ctx: &ExecutionContext) -> String {
        let path = match ToolParams::parse(parameters) {
            ToolParams::Json(value) => value
                .get("path")
                .and_then(|p| p.as_str())
                .unwrap_or_default()
                .to_string(),
            ToolParams::Raw(raw) => raw,
        };
        let path = if path.trim().is_empty() { "." } else { path.as_str() };

        match self.list(path, ctx).await {
            Ok(listing) => listing,
            Err(e) => {
                error!(path = %path, error = %e, "Error listing files");
                e.to_result_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lists_sorted_and_tagged() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.txt"), "").unwrap();
        std::fs::create_dir(dir.path().join("a_dir")).unwrap();
        std::fs::write(dir.path().join("c.rs"), "").unwrap();

        let ctx = ExecutionContext::with_base_dir(dir.path());
        let out = ListFilesTool.execute(r#"{"path": "."}"#, &ctx).await;

        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[0].starts_with("Files in "));
        assert_eq!(&lines[1..], &["[DIR] a_dir", "[FILE] b.txt", "[FILE] c.rs"]);
    }

    #[tokio::test]
    async fn empty_path_lists_base_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("only.txt"), "").unwrap();
        let ctx = ExecutionContext::with_base_dir(dir.path());

        let out = ListFilesTool.execute("{}", &ctx).await;
        assert!(out.contains("[FILE] only.txt"));
    }

    #[tokio::test]
    async fn missing_directory_is_an_error_result() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ExecutionContext::with_base_dir(dir.path());
        let out = ListFilesTool.execute(r#"{"path": "ghost"}"#, &ctx).await;
        assert!(out.starts_with("Error: Directory not found: "));
    }

    #[tokio::test]
    async fn file_is_not_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("f.txt"), "").unwrap();
        let ctx = ExecutionContext::with_base_dir(dir.path());
        let out = ListFilesTool.execute(r#"{"path": "f.txt"}"#, &ctx).await;
        assert!(out.starts_with("Error: Not a directory: "));
    }
}
