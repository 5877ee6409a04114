//! Built-in tool implementations for Codewright.
//!
//! Tools give an agent the ability to act on a project directory:
//! read and write files, list directories, record reasoning, and
//! signal that the task is finished.
//!
//! Each agent kind gets its own registry: analysis agents are read-only,
//! code and bugfix agents may also write.

pub mod directory_context;
pub mod finish_task;
pub mod list_files;
pub mod log_thought;
pub mod read_file;
pub mod write_file;

use codewright_core::AgentType;
use codewright_core::tool::ToolRegistry;
use std::sync::Arc;

pub use directory_context::build_directory_context;
pub use finish_task::{FINISH_TASK, extract_summary};

/// Read-only tools used by the analysis agent.
pub fn analysis_tools(max_file_size: u64) -> ToolRegistry {
    ToolRegistry::new()
        .with(Arc::new(log_thought::LogThoughtTool))
        .with(Arc::new(list_files::ListFilesTool))
        .with(Arc::new(read_file::ReadFileTool::with_max_file_size(
            max_file_size,
        )))
        .with(Arc::new(finish_task::FinishTaskTool))
}

/// Read-write tools used by the code and bugfix agents.
pub fn code_tools(max_file_size: u64) -> ToolRegistry {
    ToolRegistry::new()
        .with(Arc::new(log_thought::LogThoughtTool))
        .with(Arc::new(list_files::ListFilesTool))
        .with(Arc::new(read_file::ReadFileTool::with_max_file_size(
            max_file_size,
        )))
        .with(Arc::new(write_file::WriteFileTool))
        .with(Arc::new(finish_task::FinishTaskTool))
}

/// The tool set for an agent kind.
pub fn tools_for(agent_type: AgentType, max_file_size: u64) -> ToolRegistry {
    match agent_type {
        AgentType::Analyze => analysis_tools(max_file_size),
        AgentType::Code | AgentType::Bugfix => code_tools(max_file_size),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codewright_core::tool::{ExecutionContext, ToolCall};

    const MIB: u64 = 1024 * 1024;

    #[test]
    fn analysis_tools_are_read_only() {
        let registry = tools_for(AgentType::Analyze, MIB);
        assert_eq!(
            registry.names(),
            vec!["log_thought", "list_files", "read_file", "finish_task"]
        );
        assert!(registry.get("write_file").is_none());
    }

    #[test]
    fn code_and_bugfix_tools_can_write() {
        for kind in [AgentType::Code, AgentType::Bugfix] {
            let registry = tools_for(kind, MIB);
            assert_eq!(registry.len(), 5);
            assert!(registry.get("write_file").is_some());
        }
    }

    #[test]
    fn descriptions_render_one_entry_per_tool() {
        let docs = code_tools(MIB).descriptions();
        assert!(docs.starts_with("- log_thought: Logs a thought"));
        assert!(docs.contains("\n- write_file: Writes content to a file."));
        assert_eq!(docs.matches("\n- ").count(), 4);
    }

    #[tokio::test]
    async fn write_then_read_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ExecutionContext::with_base_dir(dir.path());
        let registry = code_tools(MIB);

        let written = registry
            .execute(
                &ToolCall::new("write_file", r#"{"path":"a/b.txt","content":"hi"}"#),
                &ctx,
            )
            .await;
        assert!(written.starts_with("Success: File written to "));

        let read = registry
            .execute(&ToolCall::new("read_file", r#"{"path":"a/b.txt"}"#), &ctx)
            .await;
        assert_eq!(read, "hi");
    }

    #[tokio::test]
    async fn concurrent_contexts_do_not_leak() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        let registry = code_tools(MIB);
        let ctx_a = ExecutionContext::with_base_dir(a.path());
        let ctx_b = ExecutionContext::with_base_dir(b.path());

        let call_a = ToolCall::new("write_file", r#"{"path":"x.txt","content":"A"}"#);
        let call_b = ToolCall::new("write_file", r#"{"path":"x.txt","content":"B"}"#);
        let (ra, rb) = tokio::join!(
            registry.execute(&call_a, &ctx_a),
            registry.execute(&call_b, &ctx_b),
        );
        assert!(ra.starts_with("Success"));
        assert!(rb.starts_with("Success"));

        assert_eq!(std::fs::read_to_string(a.path().join("x.txt")).unwrap(), "A");
        assert_eq!(std::fs::read_to_string(b.path().join("x.txt")).unwrap(), "B");
    }
}
