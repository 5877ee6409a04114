//! The agent layer of Codewright.
//!
//! A request flows through three stages:
//!
//! 1. **Classify**: a single completion picks ANALYZE, CODE or BUGFIX
//! 2. **Dispatch**: the matching agent, or the collaboration pipeline for CODE
//! 3. **Loop**: stream the model, extract `TOOL:` calls as they appear,
//!    execute them, feed results back, until `finish_task` or the
//!    iteration cap
//!
//! Every run is observable as a stream of [`StreamEvent`]s.

pub mod classifier;
pub mod collaboration;
pub mod extractor;
pub mod loop_runner;
pub mod orchestrator;
pub mod profile;
pub mod stream_event;

#[cfg(test)]
mod test_helpers;

pub use classifier::{Classification, ClassificationAgent, Confidence};
pub use collaboration::{CollaborationPipeline, CollaborationResult};
pub use extractor::{ToolCallExtractor, extract_tool_calls};
pub use loop_runner::{AgentLoop, AgentRun, LoopLimits};
pub use orchestrator::{AgentRequest, AgentResponse, Orchestrator, extract_files_written};
pub use profile::AgentProfile;
pub use stream_event::StreamEvent;
