//! crewgate command-line binary.
//!
//! Assembles the event-planning crew from configuration and runs one CLI
//! command against it.
//!
//! # Environment Variables
//!
//! - `CREWGATE_CONFIG`: crew config file (default: built-in event-planning crew)
//! - `CREWGATE_PROMPTS`: JSON prompt book for agents that use `prompt_key`
//! - `RUST_LOG`: Tracing filter (default: "info,crewgate=debug")
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin crewgate -- tools
//! cargo run --bin crewgate -- invoke fundraising_coordinator fundraising.calculate_budget \
//!     '{"venue_cost": 2000, "catering_cost": 1500}'
//! ```

use std::io;

use anyhow::Context;
use crewgate::cli::{self, Invocation};
use crewgate::config::{CrewConfig, CONFIG_ENV, PROMPTS_ENV};
use crewgate::core::providers::human_input::TimeoutInputGate;
use crewgate::crew::Crew;
use crewgate::utilities::printer::Printer;
use crewgate::utilities::prompts::PromptBook;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Diagnostics go to stderr so command output stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,crewgate=debug".into()),
        )
        .with_writer(io::stderr)
        .init();

    let invocation = Invocation::parse(std::env::args().skip(1))?;
    let mut stdout = io::stdout();
    if !invocation.needs_crew() {
        return cli::run_static(&invocation, &mut stdout);
    }

    let config = match std::env::var(CONFIG_ENV) {
        Ok(path) => CrewConfig::from_file(&path)
            .with_context(|| format!("loading {} from {}", CONFIG_ENV, path))?,
        Err(_) => {
            tracing::info!("{} not set, using the built-in crew", CONFIG_ENV);
            CrewConfig::default_crew()?
        }
    };
    let prompts = match std::env::var(PROMPTS_ENV) {
        Ok(path) => Some(PromptBook::from_file(&path)?),
        Err(_) => None,
    };

    let crew = Crew::assemble(config, prompts.as_ref(), TimeoutInputGate::console())?;
    cli::run(&crew, &invocation, Printer::new(), &mut stdout).await
}
