//! `codewright run` — classify a request and run it to the end.

use std::io::Write;
use std::sync::Arc;

use codewright_agent::{AgentRequest, AgentResponse, Orchestrator, StreamEvent};
use codewright_core::event::{DomainEvent, EventBus};
use tokio::sync::broadcast;
use tracing::debug;

use super::{CliResult, default_provider, load_config};

pub struct RunOptions {
    pub directory: Option<String>,
    pub collaborate: bool,
    pub stream: bool,
    pub json: bool,
    pub verbose: bool,
}

pub async fn run(prompt: String, options: RunOptions) -> CliResult {
    let config = load_config()?;
    let live = options.stream && options.verbose;
    let event_bus = Arc::new(EventBus::default());
    tokio::spawn(log_domain_events(event_bus.subscribe()));
    let orchestrator = Orchestrator::from_config(default_provider(&config)?, &config)
        .with_chunk_events(live)
        .with_event_bus(event_bus);

    let mut request = AgentRequest::new(prompt).with_collaboration(options.collaborate);
    if let Some(dir) = options.directory {
        request = request.with_directory(dir);
    }

    if options.stream {
        stream(&orchestrator, request, options.json, live).await
    } else {
        eprint!("  Working...");
        let response = orchestrator.handle(request).await;
        eprint!("\r             \r");
        let response = response?;
        if options.json {
            println!("{}", serde_json::to_string_pretty(&response)?);
        } else {
            print_response(&response);
        }
        Ok(())
    }
}

async fn stream(
    orchestrator: &Orchestrator,
    request: AgentRequest,
    json: bool,
    live: bool,
) -> CliResult {
    let mut run = orchestrator.handle_stream(request).await?;
    if !json {
        println!("Agent: {}\n", run.agent_type());
    }

    let mut failed = false;
    loop {
        let next = tokio::select! {
            event = run.next() => Some(event),
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(event) = next else {
            run.cancel();
            eprintln!("\nCancelled.");
            break;
        };
        let Some(event) = event else { break };
        failed |= matches!(event, StreamEvent::Error { .. });
        if json {
            println!("{}", serde_json::to_string(&event)?);
        } else {
            print_event(&event, live)?;
        }
    }

    if failed {
        return Err("Run ended with an error".into());
    }
    Ok(())
}

/// Text rendering of one event. With `live`, model text was already printed
/// from its deltas.
fn print_event(event: &StreamEvent, live: bool) -> CliResult {
    let mut out = std::io::stdout();
    match event {
        StreamEvent::AiThinking { content } => {
            write!(out, "{content}")?;
            out.flush()?;
        }
        StreamEvent::AiResponse { .. } if live => println!(),
        StreamEvent::AiResponse { content } => println!("{content}"),
        StreamEvent::ToolCall {
            tool_name,
            parameters,
        } => println!("→ {tool_name} {parameters}"),
        StreamEvent::ToolResult { result, .. } => println!("  {}", result.replace('\n', "\n  ")),
        StreamEvent::Error { error, message } => println!("✗ {error}: {message}"),
        other => println!("[{}] {}", other.event_type(), other.message()),
    }
    Ok(())
}

async fn log_domain_events(mut rx: broadcast::Receiver<Arc<DomainEvent>>) {
    loop {
        match rx.recv().await {
            Ok(event) => debug!(?event, "Domain event"),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                debug!(skipped, "Domain event log lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

fn print_response(response: &AgentResponse) {
    println!("Agent:     {}", response.agent_type);
    if response.classification.is_fallback() {
        println!("           (classification fell back to the default)");
    }
    println!("Reasoning: {}", response.reasoning);
    println!("Files:     {}", response.file_count);
    for file in &response.files_written {
        println!("  - {file}");
    }
    println!();
    println!("{}", response.result);
}
