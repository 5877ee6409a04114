//! `codewright classify` — show which agent would take a request.

use codewright_agent::{Confidence, Orchestrator};

use super::{CliResult, default_provider, load_config};

pub async fn run(prompt: String) -> CliResult {
    let config = load_config()?;
    let orchestrator = Orchestrator::from_config(default_provider(&config)?, &config);

    let classification = orchestrator.classify(&prompt).await?;
    match &classification.confidence {
        Confidence::Confident => println!("{}", classification.agent_type),
        Confidence::Fallback { raw } => {
            println!("{} (fallback, model replied: {raw:?})", classification.agent_type)
        }
    }
    Ok(())
}
