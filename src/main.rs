mod batch_executor;
mod batcher;
mod config;
mod engine;
mod request;
mod results;

use std::fs;
use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use tracing::metadata::LevelFilter;
use tracing::{info, instrument};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{Resolution, ResolveError, RunConfig, SETTINGS_FILE};
use crate::engine::{Engine, LocalEngine};
use crate::results::ResultBatch;

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let resolution =
        config::aggregate_configuration(Path::new(SETTINGS_FILE), std::env::args_os());
    match resolution {
        Ok(Resolution::TemplateWritten(path)) => {
            println!("Sample configuration written to: {}", path.display());
            ExitCode::SUCCESS
        }
        Ok(Resolution::Run(config)) => match run(config).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                eprintln!("{:#}", err);
                ExitCode::FAILURE
            }
        },
        // clap prints the message and picks the status, 0 for --help and --version
        Err(ResolveError::Args(err)) => err.exit(),
        Err(ResolveError::MissingUrl { usage }) => {
            println!("No URL provided");
            println!("{}", usage);
            ExitCode::FAILURE
        }
        Err(err @ ResolveError::Template { .. }) => {
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}

#[instrument(skip_all, fields(url = %config.url))]
async fn run(config: RunConfig) -> anyhow::Result<()> {
    info!(?config, "configuration resolved");
    let output = config.output.clone();

    let mut run = LocalEngine::default().start(config).await?;
    let mut outcome = Ok(());
    while let Some(batch) = run.results.recv().await {
        outcome = emit(&batch, output.as_deref());
        if outcome.is_err() {
            break;
        }
    }
    (run.teardown)();

    info!("Done!");
    outcome
}

/// Prints a batch as one JSON line, or replaces the output file with it.
fn emit(batch: &ResultBatch, output: Option<&Path>) -> anyhow::Result<()> {
    let message = serde_json::to_string(batch).context("error serializing results")?;
    match output {
        Some(path) => fs::write(path, message)
            .with_context(|| format!("error writing results to {}", path.display())),
        None => {
            println!("{}", message);
            Ok(())
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();
    let log = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_filter(filter)
        .boxed();

    tracing_subscriber::registry().with(log).init();
}
