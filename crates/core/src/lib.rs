//! # Codewright Core
//!
//! Domain types, traits, and error definitions for the Codewright coding agent.
//! This crate has **no framework dependencies** — it defines the domain model
//! that all other crates implement against.
//!
//! Every subsystem boundary is a trait here (`Provider`, `Tool`);
//! implementations live in their respective crates, and tests swap in
//! scripted stand-ins.

pub mod agent;
pub mod error;
pub mod event;
pub mod message;
pub mod provider;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use agent::AgentType;
pub use error::{AgentError, Error, ProviderError, Result, ToolError};
pub use event::{DomainEvent, EventBus, RunOutcome};
pub use message::{Message, Role, RunId, Transcript, TranscriptEntry};
pub use provider::{ModelSettings, Provider, ProviderRequest, ProviderResponse, StreamChunk};
pub use tool::{ExecutionContext, Tool, ToolCall, ToolParams, ToolRegistry};
