//! Tool trait — the abstraction over agent capabilities.
//!
//! Tools are what give the agent the ability to act in the world:
//! read and write files, list directories, record reasoning, finish a task.
//! Every tool runs against an explicit [`ExecutionContext`] that carries the
//! sandbox base directory of the current run.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use crate::error::ToolError;

/// A tool invocation extracted from model output.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ToolCall {
    /// Name of the tool to execute
    pub name: String,

    /// Raw parameter text, normally a JSON object
    pub parameters: String,
}

impl ToolCall {
    pub fn new(name: impl Into<String>, parameters: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: parameters.into(),
        }
    }

    /// Dedup key: a given (name, parameters) pair runs at most once per turn.
    pub fn key(&self) -> (String, String) {
        (self.name.clone(), self.parameters.clone())
    }
}

/// Request-scoped state handed to every tool execution.
///
/// Passed explicitly down the call chain; never stored in a global.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionContext {
    base_dir: Option<PathBuf>,
}

impl ExecutionContext {
    /// No base directory: paths resolve against the process working directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative paths under `base_dir`. Blank input means "no base".
    pub fn with_base_dir(base_dir: impl AsRef<Path>) -> Self {
        let base = base_dir.as_ref();
        if base.as_os_str().is_empty() || base.to_string_lossy().trim().is_empty() {
            return Self::new();
        }
        Self {
            base_dir: Some(base.to_path_buf()),
        }
    }

    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    /// Resolve a tool-supplied path.
    ///
    /// Relative paths are joined onto the base directory when one is set;
    /// the result is made absolute against the working directory either way.
    pub fn resolve(&self, path: &str) -> PathBuf {
        let joined = match &self.base_dir {
            Some(base) => base.join(path),
            None => PathBuf::from(path),
        };
        if joined.is_absolute() {
            return joined;
        }
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(joined),
            Err(_) => joined,
        }
    }
}

/// Parsed tool parameters with a fallback for malformed input.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolParams {
    Json(serde_json::Value),
    /// The whole (trimmed) parameter blob, when it is not valid JSON
    Raw(String),
}

impl ToolParams {
    pub fn parse(parameters: &str) -> Self {
        let trimmed = parameters.trim();
        match serde_json::from_str::<serde_json::Value>(trimmed) {
            Ok(value) => Self::Json(value),
            Err(e) => {
                debug!(error = %e, "Tool parameters are not JSON, using raw text");
                Self::Raw(trimmed.to_string())
            }
        }
    }

    /// A field rendered as text, if present.
    pub fn field(&self, key: &str) -> Option<String> {
        match self {
            Self::Json(value) => value.get(key).map(|v| match v {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            }),
            Self::Raw(_) => None,
        }
    }

    /// A field, or the whole trimmed blob if the field is missing.
    pub fn field_or_raw(&self, key: &str) -> String {
        if let Some(value) = self.field(key) {
            return value;
        }
        match self {
            Self::Json(value) => value.to_string(),
            Self::Raw(raw) => raw.clone(),
        }
    }
}

/// The core Tool trait.
///
/// `execute` never fails across the boundary: any internal problem is
/// rendered into a result string starting with `Error:` so the loop can
/// feed it back to the model like any other result.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "read_file").
    fn name(&self) -> &str;

    /// Description embedded verbatim into the model-facing prompt.
    fn description(&self) -> &str;

    /// Execute the tool with the raw parameter text.
    async fn execute(&self, parameters: &str, ctx: &ExecutionContext) -> String;
}

/// An ordered registry of available tools.
///
/// Registration order is preserved so the rendered tool docs are stable.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Register a tool. Replaces any existing tool with the same name in place.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        if let Some(slot) = self.tools.iter_mut().find(|t| t.name() == tool.name()) {
            *slot = tool;
        } else {
            self.tools.push(tool);
        }
    }

    /// Builder-style registration.
    pub fn with(mut self, tool: Arc<dyn Tool>) -> Self {
        self.register(tool);
        self
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.iter().find(|t| t.name() == name).map(|t| t.as_ref())
    }

    /// `- name: description` lines for the system prompt.
    pub fn descriptions(&self) -> String {
        self.tools
            .iter()
            .map(|t| format!("- {}: {}", t.name(), t.description()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Execute a tool call. An unknown name yields an `Error:` result.
    pub async fn execute(&self, call: &ToolCall, ctx: &ExecutionContext) -> String {
        match self.get(&call.name) {
            Some(tool) => tool.execute(&call.parameters, ctx).await,
            None => ToolError::NotFound(call.name.clone()).to_result_string(),
        }
    }

    /// List all registered tool names, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}
