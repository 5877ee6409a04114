//! The streaming tool-call loop.
//!
//! One run drives a bounded cycle: stream a model turn over the whole
//! transcript, extract tool calls as text arrives, execute each new call,
//! feed raw results back into the transcript, and repeat until
//! `finish_task` runs, the stream fails, or the iteration cap is hit.
//!
//! The run executes on its own task and reports through an event channel.
//! Dropping the returned [`AgentRun`] cancels it.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use codewright_config::AgentConfig;
use codewright_core::AgentType;
use codewright_core::event::{DomainEvent, EventBus, RunOutcome};
use codewright_core::message::{RunId, Transcript, TranscriptEntry};
use codewright_core::provider::{ModelSettings, Provider, ProviderRequest};
use codewright_core::tool::{ExecutionContext, ToolCall};
use codewright_tools::{FINISH_TASK, extract_summary};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::extractor::ToolCallExtractor;
use crate::profile::AgentProfile;
use crate::stream_event::StreamEvent;

/// Display and logging limits applied to tool traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopLimits {
    pub max_iterations: u32,
    pub max_display_length: usize,
    pub max_log_length: usize,
}

impl Default for LoopLimits {
    fn default() -> Self {
        Self::from(&AgentConfig::default())
    }
}

impl From<&AgentConfig> for LoopLimits {
    fn from(config: &AgentConfig) -> Self {
        Self {
            max_iterations: config.max_iterations,
            max_display_length: config.max_display_length,
            max_log_length: config.max_log_length,
        }
    }
}

/// A running agent, seen from the consumer side.
///
/// Yields events until the run ends. Dropping it, or calling
/// [`cancel`](Self::cancel), stops the run: no further tool executes and the
/// model stream is released.
#[derive(Debug)]
pub struct AgentRun {
    agent_type: AgentType,
    events: mpsc::Receiver<StreamEvent>,
    cancel: CancellationToken,
}

impl AgentRun {
    pub(crate) fn new(
        agent_type: AgentType,
        events: mpsc::Receiver<StreamEvent>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            agent_type,
            events,
            cancel,
        }
    }

    /// The agent kind producing this run.
    pub fn agent_type(&self) -> AgentType {
        self.agent_type
    }

    /// Next event, or `None` once the run is over.
    pub async fn next(&mut self) -> Option<StreamEvent> {
        self.events.recv().await
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Drain the run into a vector.
    pub async fn collect(mut self) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.next().await {
            events.push(event);
        }
        events
    }
}

impl Drop for AgentRun {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// The consumer left or cancelled; stop without emitting anything else.
struct Detached;

/// The streaming tool-call agent loop for one agent profile.
#[derive(Clone)]
pub struct AgentLoop {
    provider: Arc<dyn Provider>,
    settings: ModelSettings,
    profile: Arc<AgentProfile>,
    limits: LoopLimits,
    chunk_events: bool,
    event_bus: Option<Arc<EventBus>>,
}

impl AgentLoop {
    pub fn new(
        provider: Arc<dyn Provider>,
        settings: ModelSettings,
        profile: Arc<AgentProfile>,
    ) -> Self {
        Self {
            provider,
            settings,
            profile,
            limits: LoopLimits::default(),
            chunk_events: false,
            event_bus: None,
        }
    }

    pub fn with_limits(mut self, limits: LoopLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Set the maximum number of model turns.
    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.limits.max_iterations = max;
        self
    }

    /// Also emit an `AiThinking` event for every text delta.
    pub fn with_chunk_events(mut self, enabled: bool) -> Self {
        self.chunk_events = enabled;
        self
    }

    /// Publish `ToolExecuted` and `RunFinished` domain events.
    pub fn with_event_bus(mut self, event_bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    pub fn agent_type(&self) -> AgentType {
        self.profile.agent_type
    }

    /// Start a run. Events arrive on the returned handle.
    pub fn run(
        &self,
        prompt: &str,
        directory_context: &str,
        ctx: ExecutionContext,
    ) -> AgentRun {
        self.run_with_token(prompt, directory_context, ctx, CancellationToken::new())
    }

    /// Start a run that also stops when `cancel` fires.
    pub fn run_with_token(
        &self,
        prompt: &str,
        directory_context: &str,
        ctx: ExecutionContext,
        cancel: CancellationToken,
    ) -> AgentRun {
        let (tx, rx) = mpsc::channel::<StreamEvent>(128);

        let driver = self.clone();
        let token = cancel.clone();
        let transcript = Transcript::seeded(
            &self.profile.system_prompt,
            &self.profile.tools.descriptions(),
            directory_context,
            prompt,
        );

        let span = info_span!("agent_run", run_id = %RunId::new(), agent = %self.agent_type());
        tokio::spawn(
            async move {
                driver.drive(transcript, ctx, tx, token).await;
            }
            .instrument(span),
        );

        AgentRun::new(self.agent_type(), rx, cancel)
    }

    /// Run to the end and return the plain-text run log.
    pub async fn execute(
        &self,
        prompt: &str,
        directory_context: &str,
        ctx: ExecutionContext,
    ) -> String {
        let mut run = self.run(prompt, directory_context, ctx);
        let mut result = String::new();
        while let Some(event) = run.next().await {
            event.append_to(&mut result);
        }
        result
    }

    async fn drive(
        &self,
        mut transcript: Transcript,
        ctx: ExecutionContext,
        tx: mpsc::Sender<StreamEvent>,
        cancel: CancellationToken,
    ) {
        let agent = self.agent_type();
        info!(%agent, base_dir = ?ctx.base_dir(), "Starting streaming tool-based execution");

        let mut iterations = 0;
        let outcome = self
            .iterate(&mut transcript, &ctx, &tx, &cancel, &mut iterations)
            .await
            .unwrap_or_else(|Detached| {
                info!(%agent, iterations, "Run cancelled by consumer");
                RunOutcome::Cancelled
            });

        if let Some(bus) = &self.event_bus {
            bus.publish(DomainEvent::RunFinished {
                agent,
                outcome,
                iterations,
                timestamp: Utc::now(),
            });
        }
    }

    async fn iterate(
        &self,
        transcript: &mut Transcript,
        ctx: &ExecutionContext,
        tx: &mpsc::Sender<StreamEvent>,
        cancel: &CancellationToken,
        iterations: &mut u32,
    ) -> Result<RunOutcome, Detached> {
        let agent = self.agent_type();
        let max_iterations = self.limits.max_iterations;

        for iteration in 1..=max_iterations {
            *iterations = iteration;
            emit(
                tx,
                cancel,
                StreamEvent::IterationStart {
                    iteration,
                    max_iterations,
                },
            )
            .await?;
            info!(%agent, iteration, max_iterations, "Iteration");

            let request = ProviderRequest::from_prompt(&self.settings, transcript.render(), true);
            let opened = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(Detached),
                opened = self.provider.stream(request) => opened,
            };
            let mut stream_rx = match opened {
                Ok(rx) => rx,
                Err(e) => return self.fail(tx, cancel, e.to_string()).await,
            };

            let mut extractor = ToolCallExtractor::new();
            let mut executed: HashSet<(String, String)> = HashSet::new();
            let mut saw_call = false;

            loop {
                let next = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(Detached),
                    next = stream_rx.recv() => next,
                };
                let chunk = match next {
                    None => break,
                    Some(Ok(chunk)) => chunk,
                    Some(Err(e)) => return self.fail(tx, cancel, e.to_string()).await,
                };

                if let Some(text) = chunk.content.as_deref() {
                    debug!(chunk = %truncate(text, 100), "AI chunk");
                    if self.chunk_events {
                        emit(
                            tx,
                            cancel,
                            StreamEvent::AiThinking {
                                content: text.to_string(),
                            },
                        )
                        .await?;
                    }

                    for call in extractor.push(text) {
                        saw_call = true;
                        if !executed.insert(call.key()) {
                            debug!(tool = %call.name, "Skipping duplicate tool call");
                            continue;
                        }
                        if cancel.is_cancelled() {
                            return Err(Detached);
                        }
                        if let Some(outcome) =
                            self.execute_call(&call, transcript, ctx, tx, cancel).await?
                        {
                            return Ok(outcome);
                        }
                    }
                }

                if chunk.done {
                    break;
                }
            }

            let full_response = extractor.into_buffer();
            debug!(response = %truncate(&full_response, self.limits.max_display_length), "AI response complete");
            emit(
                tx,
                cancel,
                StreamEvent::AiResponse {
                    content: full_response.clone(),
                },
            )
            .await?;
            transcript.push(TranscriptEntry::Assistant {
                text: full_response,
            });

            if !saw_call {
                warn!(%agent, iteration, "No tool calls found in response, prompting agent to use tools");
                transcript.push(TranscriptEntry::Correction);
            }
        }

        warn!(%agent, max_iterations, "Task did not complete within iteration limit");
        emit(
            tx,
            cancel,
            StreamEvent::Error {
                error: "Maximum iterations reached".into(),
                message: format!("Task incomplete: Maximum iterations ({max_iterations}) reached"),
            },
        )
        .await?;
        Ok(RunOutcome::MaxIterations)
    }

    /// Run one tool call. Returns the final outcome if the call ended the run.
    async fn execute_call(
        &self,
        call: &ToolCall,
        transcript: &mut Transcript,
        ctx: &ExecutionContext,
        tx: &mpsc::Sender<StreamEvent>,
        cancel: &CancellationToken,
    ) -> Result<Option<RunOutcome>, Detached> {
        let shown_params =
            redact_parameters(&call.name, &call.parameters, self.limits.max_display_length);
        debug!(
            tool = %call.name,
            parameters = %truncate(&shown_params, self.limits.max_log_length),
            "Executing tool"
        );
        emit(
            tx,
            cancel,
            StreamEvent::ToolCall {
                tool_name: call.name.clone(),
                parameters: shown_params,
            },
        )
        .await?;

        let start = Instant::now();
        let result = self.profile.tools.execute(call, ctx).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        if let Some(bus) = &self.event_bus {
            bus.publish(DomainEvent::ToolExecuted {
                tool_name: call.name.clone(),
                success: !result.starts_with("Error"),
                duration_ms,
                timestamp: Utc::now(),
            });
        }

        let display_text = display_result(&call.name, &result, self.limits.max_display_length);
        debug!(
            tool = %call.name,
            result = %truncate(&display_text, self.limits.max_log_length),
            duration_ms,
            "Tool result"
        );
        emit(
            tx,
            cancel,
            StreamEvent::ToolResult {
                tool_name: call.name.clone(),
                result: display_text,
            },
        )
        .await?;

        transcript.push(TranscriptEntry::ToolResult {
            tool: call.name.clone(),
            output: result.clone(),
        });

        if call.name != FINISH_TASK {
            return Ok(None);
        }

        let mut summary = extract_summary(&result);
        if !summary.ends_with('\n') {
            summary.push('\n');
        }
        info!(agent = %self.agent_type(), "Task complete");
        emit(tx, cancel, StreamEvent::TaskComplete { summary }).await?;
        Ok(Some(RunOutcome::Completed))
    }

    async fn fail(
        &self,
        tx: &mpsc::Sender<StreamEvent>,
        cancel: &CancellationToken,
        error: String,
    ) -> Result<RunOutcome, Detached> {
        error!(agent = %self.agent_type(), error = %error, "Error during AI streaming");
        emit(
            tx,
            cancel,
            StreamEvent::Error {
                message: format!("Error during AI processing: {error}"),
                error,
            },
        )
        .await?;
        Ok(RunOutcome::Failed)
    }
}

async fn emit(
    tx: &mpsc::Sender<StreamEvent>,
    cancel: &CancellationToken,
    event: StreamEvent,
) -> Result<(), Detached> {
    if cancel.is_cancelled() {
        return Err(Detached);
    }
    tx.send(event).await.map_err(|_| Detached)
}

/// Cut `text` to `max` characters, marking the cut with `"... "`.
pub fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}... ", &text[..cut]),
        None => text.to_string(),
    }
}

/// The form of a tool result shown on the event stream.
///
/// File contents never leave through events; the model still gets the raw
/// result through the transcript.
pub fn display_result(tool_name: &str, result: &str, max_display_length: usize) -> String {
    match tool_name {
        "read_file" if !result.starts_with("Error") => {
            "[File read successfully - content not displayed]".into()
        }
        "list_files" => truncate(result, max_display_length),
        _ => result.to_string(),
    }
}

/// The form of tool parameters shown on the event stream and in logs.
///
/// `write_file` content is replaced by a placeholder; everything else is
/// truncated.
pub fn redact_parameters(tool_name: &str, parameters: &str, max_display_length: usize) -> String {
    if tool_name == "write_file"
        && let Some(redacted) = redact_json_string_field(parameters, "content")
    {
        return redacted;
    }
    truncate(parameters, max_display_length)
}

/// Replace the string value of `"field"` with `"[CONTENT TRUNCATED]"`.
fn redact_json_string_field(json: &str, field: &str) -> Option<String> {
    let key = format!("\"{field}\"");
    let key_at = json.find(&key)?;
    let colon = key_at + key.len() + json[key_at + key.len()..].find(':')?;
    let value_start = colon + 1;
    let value_end = value_start + json_string_end(&json[value_start..])?;
    Some(format!(
        "{} \"[CONTENT TRUNCATED]\"{}",
        &json[..value_start],
        &json[value_end..]
    ))
}

/// Byte offset just past the first complete string literal in `text`.
fn json_string_end(text: &str) -> Option<usize> {
    let mut in_string = false;
    let mut escaped = false;
    for (i, b) in text.bytes().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        match b {
            b'\\' => escaped = true,
            b'"' if in_string => return Some(i + 1),
            b'"' => in_string = true,
            _ => {}
        }
    }
    None
}
