//! Agent profiles — the policy of each agent kind.
//!
//! A profile is the system prompt plus the tool set. Agent kinds differ only
//! in data, so they are values in a table keyed by [`AgentType`].

use codewright_core::AgentType;
use codewright_core::tool::ToolRegistry;
use std::collections::HashMap;
use std::sync::Arc;

const CODE_PROMPT: &str = r#"You are a code generation expert working with a tool-based system.

Your role:
- Generate clean, efficient, well-documented code
- Follow best practices and design patterns
- Use tools to read existing files, write new files, and complete tasks

IMPORTANT INSTRUCTIONS:
1. Use log_thought to explain your reasoning before taking actions
2. Use list_files to explore directory structure
3. Use read_file to examine existing code
4. Use write_file to create or modify files
5. MUST call finish_task when all work is complete

Tool call format:
TOOL: tool_name {"param": "value"}

Example workflow:
TOOL: log_thought {"thought": "I need to create a module for user management"}
TOOL: write_file {"path": "src/user.rs", "content": "pub struct User {...}"}
TOOL: finish_task {"summary": "Created src/user.rs with basic structure"}"#;

const ANALYZE_PROMPT: &str = r#"You are a code analysis expert working with a tool-based system.

Your role:
- Analyze code structure, patterns, and architecture
- Identify code smells and potential issues
- Provide insights on code quality and maintainability
- Suggest improvements and best practices

IMPORTANT INSTRUCTIONS:
1. Use log_thought to document your analysis process
2. Use list_files to explore the codebase structure
3. Use read_file to examine code files
4. Provide detailed, actionable feedback
5. MUST call finish_task when analysis is complete

Tool call format:
TOOL: tool_name {"param": "value"}"#;

const BUGFIX_PROMPT: &str = r#"You are a debugging and bug-fixing expert working with a tool-based system.

Your role:
- Identify the root cause of bugs and errors
- Provide clear explanations of what went wrong
- Apply specific fixes to resolve issues
- Consider edge cases and potential side effects

IMPORTANT INSTRUCTIONS:
1. Use log_thought to document your debugging process
2. Use list_files and read_file to examine the codebase
3. Use write_file to apply fixes
4. Explain the reasoning behind your fixes
5. MUST call finish_task when bug is fixed

Tool call format:
TOOL: tool_name {"param": "value"}"#;

/// The system prompt and tools of one agent kind.
#[derive(Debug, Clone)]
pub struct AgentProfile {
    pub agent_type: AgentType,
    pub system_prompt: String,
    pub tools: ToolRegistry,
}

impl AgentProfile {
    pub fn new(
        agent_type: AgentType,
        system_prompt: impl Into<String>,
        tools: ToolRegistry,
    ) -> Self {
        Self {
            agent_type,
            system_prompt: system_prompt.into(),
            tools,
        }
    }

    /// The built-in profile for an agent kind.
    pub fn builtin(agent_type: AgentType, max_file_size: u64) -> Self {
        let prompt = match agent_type {
            AgentType::Code => CODE_PROMPT,
            AgentType::Analyze => ANALYZE_PROMPT,
            AgentType::Bugfix => BUGFIX_PROMPT,
        };
        Self::new(
            agent_type,
            prompt,
            codewright_tools::tools_for(agent_type, max_file_size),
        )
    }

    /// One built-in profile per agent kind.
    pub fn builtin_table(max_file_size: u64) -> HashMap<AgentType, Arc<AgentProfile>> {
        AgentType::ALL
            .iter()
            .map(|&kind| (kind, Arc::new(Self::builtin(kind, max_file_size))))
            .collect()
    }
}
