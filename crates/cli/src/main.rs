mod cli;
mod paths;
mod pipeline;
mod terminal;

use anyhow::{bail, Context, Result};
use clap::Parser;
use redline_core::config::load_dotenv;
use redline_core::Config;
use tracing::{error, info, warn};

use crate::cli::CliArgs;
use crate::paths::{interactive_provider, FixedPathProvider, PathProvider};
use crate::pipeline::{Outcome, Pipeline};
use crate::terminal::Terminal;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    load_dotenv();
    let args = CliArgs::parse();
    let mut config = Config::from_env();
    args.apply(&mut config);
    config.log_summary();

    let terminal = if args.quiet { Terminal::quiet() } else { Terminal::new() };
    for key in config.missing_settings() {
        warn!(key, "Required setting is missing");
        terminal.print_warning(&format!("{key} is not set; the stage that needs it will fail"))?;
    }
    if args.is_headless() {
        let paths = FixedPathProvider::new(args.input.clone(), args.output.clone());
        return run_once(&config, terminal, &paths).await;
    }

    terminal.print_banner()?;
    let paths = interactive_provider(terminal, args.console);
    loop {
        match process_one(&config, terminal, paths.as_ref()).await {
            Ok(true) => terminal.print_success("\nContract processing completed successfully!")?,
            Ok(false) => terminal.print_info("\nContract processing was not completed successfully.")?,
            Err(e) => {
                error!("{e:#}");
                terminal.print_error(&format!("{e:#}"))?;
                terminal.print_info("\nContract processing was not completed successfully.")?;
            }
        }

        if !terminal.prompt_yes_no("Do you want to process another contract?")? {
            break;
        }
    }
    terminal.print_info("\nThank you for using the Contract Revision Tool. Goodbye!")?;
    Ok(())
}

/// Process one contract. `Ok(false)` means the user picked nothing.
async fn process_one(config: &Config, terminal: Terminal, paths: &dyn PathProvider) -> Result<bool> {
    let pipeline = Pipeline::from_config(config, terminal).context("failed to set up the pipeline")?;
    let outcome = pipeline.process(paths).await.map_err(|e| {
        warn!(kind = e.kind(), "Pipeline run failed");
        e
    })?;
    if let Outcome::Saved(summary) = &outcome {
        info!(
            input = %summary.input.display(),
            output = %summary.output.display(),
            chunks = summary.chunks,
            embedded = summary.embedded,
            entries = summary.entries,
            "Contract revised"
        );
    }
    Ok(matches!(outcome, Outcome::Saved(_)))
}

/// Headless mode: a single run with paths from the command line.
async fn run_once(config: &Config, terminal: Terminal, paths: &FixedPathProvider) -> Result<()> {
    if !process_one(config, terminal, paths).await? {
        bail!("contract processing was not completed");
    }
    Ok(())
}
