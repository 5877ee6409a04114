//! Collaboration pipeline — generate, analyze, refine.
//!
//! Three strictly sequential agent runs:
//! 1. the code agent produces an initial solution;
//! 2. the analysis agent reviews it (no directory context);
//! 3. the code agent refines it using the review.
//!
//! Events of all three runs are forwarded in order, separated by `Log`
//! progress events. A phase that ends in `Error` ends the pipeline.

use codewright_core::AgentType;
use codewright_core::tool::ExecutionContext;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::loop_runner::{AgentLoop, AgentRun};
use crate::stream_event::StreamEvent;

const LOG_PREFIX: &str = "CollaborationAgent: ";

/// Text output of each phase, plus the combined report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollaborationResult {
    pub initial: String,
    pub analysis: String,
    pub refined: String,
    pub combined: String,
}

impl CollaborationResult {
    fn finish(mut self) -> Self {
        let mut combined = format!("=== Initial Code ===\n{}", self.initial);
        if !self.analysis.is_empty() {
            combined.push_str(&format!("\n=== Analysis ===\n{}", self.analysis));
        }
        if !self.refined.is_empty() {
            combined.push_str(&format!("\n=== Refined Code ===\n{}", self.refined));
        }
        self.combined = combined;
        self
    }
}

fn analysis_prompt(user_prompt: &str, initial_output: &str) -> String {
    format!(
        "Analyze the code produced for the following request.\n\
         \n\
         Original request:\n\
         {user_prompt}\n\
         \n\
         Review it for:\n\
         - Code quality and best practices\n\
         - Security vulnerabilities\n\
         - Performance issues\n\
         - Potential bugs\n\
         - Design patterns and architecture\n\
         \n\
         Respect the constraints of the original request. Do not suggest changes that contradict it.\n\
         Provide specific, actionable feedback for improvements.\n\
         \n\
         Code generation output:\n\
         {initial_output}"
    )
}

fn refinement_prompt(user_prompt: &str, analysis: &str, initial_output: &str) -> String {
    format!(
        "Improve the code produced for the following request based on the analysis feedback.\n\
         \n\
         Original request:\n\
         {user_prompt}\n\
         \n\
         Apply every suggested improvement that is consistent with the original request. \
         Use write_file to update the files, then call finish_task.\n\
         \n\
         Analysis feedback:\n\
         {analysis}\n\
         \n\
         Initial output:\n\
         {initial_output}"
    )
}

/// How a forwarded phase ended.
enum PhaseEnd {
    Finished,
    Failed,
    /// Consumer gone or cancelled.
    Detached,
}

/// The generate→analyze→refine composition of agent runs.
#[derive(Clone)]
pub struct CollaborationPipeline {
    code: AgentLoop,
    analyze: AgentLoop,
}

impl CollaborationPipeline {
    /// `code` drives phases 1 and 3, `analyze` drives phase 2.
    pub fn new(code: AgentLoop, analyze: AgentLoop) -> Self {
        Self { code, analyze }
    }

    /// Start the pipeline. Events of every phase arrive on the returned handle.
    pub fn run(&self, prompt: &str, directory_context: &str, ctx: ExecutionContext) -> AgentRun {
        let (tx, rx) = mpsc::channel::<StreamEvent>(128);
        let cancel = CancellationToken::new();

        let pipeline = self.clone();
        let token = cancel.clone();
        let prompt = prompt.to_string();
        let directory_context = directory_context.to_string();
        tokio::spawn(async move {
            pipeline
                .drive(&prompt, &directory_context, ctx, tx, token)
                .await;
        });

        AgentRun::new(AgentType::Code, rx, cancel)
    }

    /// Run all phases to the end and return their text.
    pub async fn execute(
        &self,
        prompt: &str,
        directory_context: &str,
        ctx: ExecutionContext,
    ) -> CollaborationResult {
        let (tx, mut rx) = mpsc::channel::<StreamEvent>(128);
        let drain = async move { while rx.recv().await.is_some() {} };
        let (result, ()) = tokio::join!(
            self.drive(prompt, directory_context, ctx, tx, CancellationToken::new()),
            drain
        );
        result
    }

    async fn drive(
        &self,
        prompt: &str,
        directory_context: &str,
        ctx: ExecutionContext,
        tx: mpsc::Sender<StreamEvent>,
        cancel: CancellationToken,
    ) -> CollaborationResult {
        info!("Starting collaborative code generation");
        let mut result = CollaborationResult::default();

        if !log(&tx, "Step 1/3: Generating initial code").await {
            return result.finish();
        }
        let run = self
            .code
            .run_with_token(prompt, directory_context, ctx.clone(), cancel.child_token());
        if !continue_after(forward(run, &tx, &mut result.initial).await) {
            return result.finish();
        }

        if !log(&tx, "Step 2/3: Analyzing generated code").await {
            return result.finish();
        }
        let run = self.analyze.run_with_token(
            &analysis_prompt(prompt, &result.initial),
            "",
            ctx.clone(),
            cancel.child_token(),
        );
        if !continue_after(forward(run, &tx, &mut result.analysis).await) {
            return result.finish();
        }

        if !log(&tx, "Step 3/3: Refining code based on analysis").await {
            return result.finish();
        }
        let run = self.code.run_with_token(
            &refinement_prompt(prompt, &result.analysis, &result.initial),
            directory_context,
            ctx,
            cancel.child_token(),
        );
        if !continue_after(forward(run, &tx, &mut result.refined).await) {
            return result.finish();
        }

        log(&tx, "Collaboration complete").await;
        info!("Collaboration complete");
        result.finish()
    }
}

fn continue_after(end: PhaseEnd) -> bool {
    match end {
        PhaseEnd::Finished => true,
        PhaseEnd::Failed => {
            warn!("Collaboration phase failed, stopping pipeline");
            false
        }
        PhaseEnd::Detached => false,
    }
}

async fn log(tx: &mpsc::Sender<StreamEvent>, step: &str) -> bool {
    tx.send(StreamEvent::Log {
        message: format!("{LOG_PREFIX}{step}"),
    })
    .await
    .is_ok()
}

/// Forward a phase's events, recording its text output.
async fn forward(
    mut run: AgentRun,
    tx: &mpsc::Sender<StreamEvent>,
    output: &mut String,
) -> PhaseEnd {
    let mut end = PhaseEnd::Detached;
    while let Some(event) = run.next().await {
        event.append_to(output);
        match &event {
            StreamEvent::TaskComplete { .. } => end = PhaseEnd::Finished,
            StreamEvent::Error { .. } => end = PhaseEnd::Failed,
            _ => {}
        }
        if tx.send(event).await.is_err() {
            return PhaseEnd::Detached;
        }
    }
    end
}
