mod cli;
mod config;
mod output;

use std::process;

use clap::{Parser, error::ErrorKind};
use pinvid::{DownloadResult, JobId, PinDownloader};
use tracing::{Level, debug, error};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use crate::{cli::Args, output::OutputManager};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            let details = e.kind().as_str().unwrap_or("invalid arguments");
            println!("{}", OutputManager::new(false).usage(details));
            process::exit(1);
        }
    };

    init_logging(args.verbose, args.quiet);
    let output = OutputManager::new(args.pretty);

    match run(&args).await {
        Ok(result) => println!("{}", output.success(&result)),
        Err(message) => {
            println!("{}", output.failure(&message));
            process::exit(1);
        }
    }
}

/// Run one download; `Err` carries the message for the failure document.
async fn run(args: &Args) -> Result<DownloadResult, String> {
    let config = config::load(args.config.as_deref()).map_err(|e| {
        error!("Configuration error: {e:#}");
        format!("{e:#}")
    })?;
    let config = config::apply_args(config, args);
    debug!(?config, "effective configuration");

    let downloader = PinDownloader::from_config(&config).map_err(|e| {
        error!("Failed to build HTTP client: {e}");
        e.to_string()
    })?;

    let job = JobId::generate();
    downloader
        .download(&args.url, &args.output_dir, &job)
        .await
        .map_err(|e| {
            error!(stage = %e.stage, "{e}");
            e.to_string()
        })
}

fn init_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(verbose),
        )
        .init();
}
