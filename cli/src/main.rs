//! CLI entrypoint for roundtable
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Result, bail};
use clap::Parser;
use roundtable_application::{FacilitatorGateway, NoRoundLogger, RoundController, RoundLogger};
use roundtable_domain::SessionSnapshot;
use roundtable_infrastructure::{
    ConfigLoader, FailoverFacilitator, FileDocumentStore, FileFacilitatorConfig, FileSessionStore,
    JsonlRoundLogger, OpenAiFacilitator, StubFacilitator,
};
use roundtable_presentation::{
    Cli, Command, ConsoleFormatter, ConsoleRepl, OutputFormat, PhaseSpinner,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!("Starting roundtable");

    // Load configuration
    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())?
    };

    if let Some(data_dir) = &cli.data_dir {
        config.storage.data_dir = data_dir.clone();
    }
    if cli.offline {
        config.facilitator.offline = true;
    }

    // === Dependency Injection ===
    let data_dir = &config.storage.data_dir;
    let sessions = Arc::new(FileSessionStore::new(data_dir));
    let documents = Arc::new(FileDocumentStore::new(data_dir));

    let logger: Arc<dyn RoundLogger> = match JsonlRoundLogger::new(data_dir.join("rounds.jsonl")) {
        Some(round_log) => Arc::new(round_log),
        None => Arc::new(NoRoundLogger),
    };

    let facilitator = build_facilitator(&config.facilitator, Arc::clone(&logger));

    let controller = Arc::new(RoundController::new(
        sessions,
        documents,
        facilitator,
        Arc::clone(&logger),
    ));

    // Pick up whatever phase a previous run left unfinished
    controller.resume().await?;

    match &cli.command {
        Command::Start {
            description,
            emails,
        } => {
            controller.start_session(description, emails).await?;
            wait_for_phases(
                &controller,
                cli.quiet,
                "The facilitator is drafting the first question...",
            )
            .await;
            print_snapshot(&controller.snapshot().await?, cli.output);
        }

        Command::Answer { email, text } => {
            // A phase resumed from a previous run may still be publishing
            // the question this answer is for
            wait_for_phases(&controller, cli.quiet, "Waiting for the facilitator...").await;

            let receipt = controller.submit_answer(email, text).await?;
            if receipt.duplicate {
                println!("{} already answered this round; the stored answer is kept.\n", email);
            }
            if receipt.round_completed {
                wait_for_phases(
                    &controller,
                    cli.quiet,
                    "Merging answers into the next version...",
                )
                .await;
            }
            print_snapshot(&controller.snapshot().await?, cli.output);
        }

        Command::Status => {
            wait_for_phases(&controller, cli.quiet, "Waiting for the facilitator...").await;
            print_snapshot(&controller.snapshot().await?, cli.output);
        }

        Command::Document => {
            wait_for_phases(&controller, cli.quiet, "Waiting for the facilitator...").await;
            println!(
                "{}",
                ConsoleFormatter::format_document(&controller.snapshot().await?)
            );
        }

        Command::History => {
            wait_for_phases(&controller, cli.quiet, "Waiting for the facilitator...").await;
            let snapshot = controller.snapshot().await?;
            match cli.output {
                OutputFormat::Json => println!("{}", ConsoleFormatter::format_json(&snapshot)),
                _ => println!("{}", ConsoleFormatter::format_history(&snapshot)),
            }
        }

        Command::Reset { yes } => {
            if !*yes {
                bail!("reset deletes the session and every document version; pass --yes to confirm");
            }
            controller.reset().await?;
            println!("Session and all document versions deleted.");
        }

        Command::Console => {
            let repl = ConsoleRepl::new(Arc::clone(&controller)).with_quiet(cli.quiet);
            repl.run().await?;
        }
    }

    Ok(())
}

/// Pick the facilitator gateway for this run.
///
/// Offline mode and a missing API key both land on the deterministic stub;
/// otherwise the OpenAI adapter runs behind the failover decorator so a
/// slow or failing gateway degrades to stub output instead of stalling
/// the loop.
fn build_facilitator(
    config: &FileFacilitatorConfig,
    logger: Arc<dyn RoundLogger>,
) -> Arc<dyn FacilitatorGateway> {
    if config.offline {
        info!("Running on the offline stub facilitator");
        return Arc::new(StubFacilitator);
    }
    match config.api_key() {
        Some(api_key) => {
            info!(model = %config.model, "Facilitator gateway: OpenAI");
            Arc::new(FailoverFacilitator::new(
                OpenAiFacilitator::new(api_key, config.model.clone()),
                config.timeout(),
                logger,
            ))
        }
        None => {
            warn!(
                "{} is not set, running on the offline stub facilitator",
                config.api_key_env
            );
            Arc::new(StubFacilitator)
        }
    }
}

/// Wait for background question generation or consolidation to finish,
/// with a spinner unless --quiet.
async fn wait_for_phases(controller: &RoundController, quiet: bool, message: &str) {
    if quiet {
        controller.settle().await;
        return;
    }
    let spinner = PhaseSpinner::start(message);
    controller.settle().await;
    spinner.finish_and_clear();
}

fn print_snapshot(snapshot: &SessionSnapshot, output: OutputFormat) {
    let rendered = match output {
        OutputFormat::Full => ConsoleFormatter::format(snapshot),
        OutputFormat::Document => ConsoleFormatter::format_document(snapshot),
        OutputFormat::Json => ConsoleFormatter::format_json(snapshot),
    };
    println!("{}", rendered);
}
