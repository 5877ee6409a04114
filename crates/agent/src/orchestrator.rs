//! The orchestrator — classify a request, dispatch it, summarize the result.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use codewright_config::{AgentConfig, AppConfig, FileSystemConfig};
use codewright_core::AgentType;
use codewright_core::error::{AgentError, Result};
use codewright_core::event::{DomainEvent, EventBus};
use codewright_core::provider::{ModelSettings, Provider};
use codewright_core::tool::ExecutionContext;
use codewright_tools::build_directory_context;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::classifier::{Classification, ClassificationAgent};
use crate::collaboration::CollaborationPipeline;
use crate::loop_runner::{AgentLoop, AgentRun, LoopLimits};
use crate::profile::AgentProfile;

const FILE_WRITTEN_MARKER: &str = "Success: File written to";

/// A task as submitted by a caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRequest {
    pub prompt: String,
    /// Project directory: summarized into the prompt and used as the sandbox root
    #[serde(default)]
    pub directory_path: Option<String>,
    /// Use the generate→analyze→refine pipeline for CODE requests
    #[serde(default)]
    pub use_collaboration: bool,
}

impl AgentRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    pub fn with_directory(mut self, path: impl Into<String>) -> Self {
        self.directory_path = Some(path.into());
        self
    }

    pub fn with_collaboration(mut self, enabled: bool) -> Self {
        self.use_collaboration = enabled;
        self
    }

    fn directory(&self) -> Option<&str> {
        self.directory_path
            .as_deref()
            .filter(|p| !p.trim().is_empty())
    }
}

/// Summary of a completed non-streaming request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentResponse {
    pub agent_type: AgentType,
    pub result: String,
    pub reasoning: String,
    pub files_written: Vec<String>,
    pub file_count: usize,
    pub classification: Classification,
}

/// Paths reported by `write_file` in a run log, in order, without repeats.
pub fn extract_files_written(result: &str) -> Vec<String> {
    let mut files: Vec<String> = Vec::new();
    for line in result.lines() {
        let Some(at) = line.find(FILE_WRITTEN_MARKER) else {
            continue;
        };
        let path = line[at + FILE_WRITTEN_MARKER.len()..].trim().to_string();
        if !path.is_empty() && !files.contains(&path) {
            files.push(path);
        }
    }
    files
}

/// Entry point for requests: classification, dispatch and reporting.
pub struct Orchestrator {
    provider: Arc<dyn Provider>,
    settings: ModelSettings,
    classifier: ClassificationAgent,
    agents: HashMap<AgentType, Arc<AgentProfile>>,
    limits: LoopLimits,
    max_prompt_length: usize,
    filesystem: FileSystemConfig,
    chunk_events: bool,
    event_bus: Option<Arc<EventBus>>,
}

impl Orchestrator {
    /// Build an orchestrator with the built-in agent profiles.
    pub fn new(
        provider: Arc<dyn Provider>,
        settings: ModelSettings,
        agent: &AgentConfig,
        filesystem: FileSystemConfig,
    ) -> Self {
        let agents = AgentProfile::builtin_table(filesystem.max_file_size);
        info!(agents = agents.len(), "Orchestrator initialized");
        Self {
            classifier: ClassificationAgent::new(provider.clone(), settings.clone()),
            provider,
            settings,
            agents,
            limits: LoopLimits::from(agent),
            max_prompt_length: agent.max_prompt_length,
            filesystem,
            chunk_events: false,
            event_bus: None,
        }
    }

    /// Build from application config.
    pub fn from_config(provider: Arc<dyn Provider>, config: &AppConfig) -> Self {
        let settings = ModelSettings::new(&config.default_model)
            .with_temperature(config.default_temperature)
            .with_max_tokens(config.default_max_tokens);
        Self::new(provider, settings, &config.agent, config.filesystem.clone())
    }

    /// Replace the agent table.
    pub fn with_agents(mut self, agents: HashMap<AgentType, Arc<AgentProfile>>) -> Self {
        self.agents = agents;
        self
    }

    /// Emit `AiThinking` deltas on streamed runs.
    pub fn with_chunk_events(mut self, enabled: bool) -> Self {
        self.chunk_events = enabled;
        self
    }

    pub fn with_event_bus(mut self, event_bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    fn validate(&self, request: &AgentRequest) -> Result<()> {
        if request.prompt.trim().is_empty() {
            return Err(AgentError::InvalidRequest("Prompt must not be empty".into()).into());
        }
        let length = request.prompt.chars().count();
        if length > self.max_prompt_length {
            return Err(AgentError::InvalidRequest(format!(
                "Prompt is {length} characters, the maximum is {}",
                self.max_prompt_length
            ))
            .into());
        }
        Ok(())
    }

    fn agent_loop(&self, agent_type: AgentType) -> Result<AgentLoop> {
        let Some(profile) = self.agents.get(&agent_type) else {
            error!(%agent_type, "No agent registered");
            return Err(AgentError::NotRegistered(agent_type).into());
        };
        let mut agent = AgentLoop::new(self.provider.clone(), self.settings.clone(), profile.clone())
            .with_limits(self.limits)
            .with_chunk_events(self.chunk_events);
        if let Some(bus) = &self.event_bus {
            agent = agent.with_event_bus(bus.clone());
        }
        Ok(agent)
    }

    fn pipeline(&self) -> Result<CollaborationPipeline> {
        Ok(CollaborationPipeline::new(
            self.agent_loop(AgentType::Code)?,
            self.agent_loop(AgentType::Analyze)?,
        ))
    }

    /// Directory summary and sandbox for a request.
    fn workspace(&self, request: &AgentRequest) -> (String, ExecutionContext) {
        match request.directory() {
            Some(path) => {
                info!(path, "Building directory context");
                (
                    build_directory_context(path, &self.filesystem),
                    ExecutionContext::with_base_dir(path),
                )
            }
            None => (String::new(), ExecutionContext::new()),
        }
    }

    /// Classify a prompt without running anything.
    pub async fn classify(&self, prompt: &str) -> Result<Classification> {
        let classification = self.classifier.classify(prompt).await?;
        if let Some(bus) = &self.event_bus {
            bus.publish(DomainEvent::RequestClassified {
                agent: classification.agent_type,
                fallback: classification.is_fallback(),
                timestamp: Utc::now(),
            });
        }
        Ok(classification)
    }

    /// Run a request to completion and summarize it.
    pub async fn handle(&self, request: AgentRequest) -> Result<AgentResponse> {
        self.validate(&request)?;
        info!(collaboration = request.use_collaboration, "Processing request");

        let classification = self.classify(&request.prompt).await?;
        let agent_type = classification.agent_type;

        let (result, reasoning) = if request.use_collaboration && agent_type == AgentType::Code {
            let pipeline = self.pipeline()?;
            let (directory_context, ctx) = self.workspace(&request);
            let outcome = pipeline
                .execute(&request.prompt, &directory_context, ctx)
                .await;
            (
                outcome.combined,
                "Collaborative process: Code Generation → Analysis → Refinement".to_string(),
            )
        } else {
            let agent = self.agent_loop(agent_type)?;
            let (directory_context, ctx) = self.workspace(&request);
            let result = agent.execute(&request.prompt, &directory_context, ctx).await;
            (result, format!("Request classified as {agent_type} task"))
        };

        let files_written = extract_files_written(&result);
        Ok(AgentResponse {
            agent_type,
            file_count: files_written.len(),
            files_written,
            result,
            reasoning,
            classification,
        })
    }

    /// Start a request and return its live event stream.
    pub async fn handle_stream(&self, request: AgentRequest) -> Result<AgentRun> {
        self.validate(&request)?;
        let classification = self.classify(&request.prompt).await?;
        let agent_type = classification.agent_type;

        if request.use_collaboration && agent_type == AgentType::Code {
            let pipeline = self.pipeline()?;
            let (directory_context, ctx) = self.workspace(&request);
            return Ok(pipeline.run(&request.prompt, &directory_context, ctx));
        }

        let agent = self.agent_loop(agent_type)?;
        let (directory_context, ctx) = self.workspace(&request);
        Ok(agent.run(&request.prompt, &directory_context, ctx))
    }
}
