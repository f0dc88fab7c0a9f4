mod cli;
mod config;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use pixmark_core::Pipeline;
use pixmark_fetch::Fetcher;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cli::Cli;
use config::AppConfig;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(path) => {
            info!(path = %path.display(), "image processed and saved");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("image processing failed: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<PathBuf> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.apply_cli(cli);
    info!(
        url = %config.url,
        filter = %config.filter_type,
        output = %config.output.display(),
        "starting"
    );

    let fetcher = Fetcher::new(&config.fetch_options())?;
    let raw = fetcher.fetch(&config.url)?;

    let t0 = std::time::Instant::now();
    let img = Pipeline::new().process(&raw, &config.process_params())?;
    info!(
        elapsed_ms = t0.elapsed().as_millis(),
        w = img.width(),
        h = img.height(),
        "image processed"
    );

    Ok(pixmark_output::save(&img, &config.output)?)
}
