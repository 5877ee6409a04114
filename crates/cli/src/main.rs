//! Codewright CLI — the main entry point.
//!
//! Commands:
//! - `run`       — Classify a request and run the matching agent
//! - `classify`  — Show which agent would handle a request
//! - `init`      — Write a default config file

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "codewright",
    about = "Codewright — streaming tool-calling coding agents",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a request through the orchestrator
    Run {
        /// What to do
        prompt: String,

        /// Project directory: summarized for the agent and used as the sandbox root
        #[arg(short, long)]
        dir: Option<String>,

        /// Generate, analyze, then refine (CODE requests only)
        #[arg(short, long)]
        collaborate: bool,

        /// Print events as they arrive
        #[arg(short, long)]
        stream: bool,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Classify a request without running it
    Classify {
        prompt: String,
    },

    /// Write a default config file if none exists
    Init,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries results
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run {
            prompt,
            dir,
            collaborate,
            stream,
            json,
        } => {
            let options = commands::run::RunOptions {
                directory: dir,
                collaborate,
                stream,
                json,
                verbose: cli.verbose,
            };
            commands::run::run(prompt, options).await?
        }
        Commands::Classify { prompt } => commands::classify::run(prompt).await?,
        Commands::Init => commands::init::run()?,
    }

    Ok(())
}
