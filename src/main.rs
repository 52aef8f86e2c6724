//! ffstage - run ffmpeg command lines against S3 inputs and outputs
//!
//! Remote references in the command are presigned or redirected into a
//! per-job staging directory; after ffmpeg exits the staged output is moved
//! or uploaded to where the command asked for it.

use anyhow::Result;
use clap::Parser;
use std::path::Path;
use tracing::{info, Level};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use ffstage::cli::{command_string, Args, Commands};
use ffstage::config::Config;
use ffstage::workflow::{Job, Workflow};

const DEFAULT_CONFIG_FILE: &str = "ffstage.toml";

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            if Path::new(DEFAULT_CONFIG_FILE).exists() {
                Config::from_file(DEFAULT_CONFIG_FILE)?
            } else {
                Config::default()
            }
        }
    };

    setup_logging(args.verbose, config.logging.directory.as_deref())?;

    match args.command {
        Commands::Run { command, staging_dir, ffmpeg, endpoint_url, json } => {
            let config = config.with_endpoint_url(endpoint_url);
            let workflow = Workflow::new(config);

            let job = Job::new(command_string(&command))
                .with_staging_root(staging_dir)
                .with_executable(ffmpeg);
            let report = workflow.run(&job).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("Job:         {}", report.job_id);
                println!("Staging:     {}", report.staging_dir.display());
                println!("Command:     {}", report.rewritten_command);
                println!("Destination: {}", report.destination);
                println!(
                    "Elapsed:     {:.1}s",
                    (report.finished_at - report.started_at).num_milliseconds() as f64 / 1000.0
                );
            }
        }
        Commands::Rewrite { command, staging_dir, endpoint_url, json } => {
            let config = config.with_endpoint_url(endpoint_url);
            let workflow = Workflow::new(config);

            let job = Job::new(command_string(&command)).with_staging_root(staging_dir);
            let prepared = workflow.dry_run(&job).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&prepared.rewritten)?);
            } else {
                println!("{}", prepared.rewritten.command_string);
            }
        }
        Commands::InitConfig { path } => {
            write_default_config(&path)?;
        }
    }

    Ok(())
}

fn write_default_config(path: &Path) -> Result<()> {
    if path.exists() {
        anyhow::bail!("{} already exists", path.display());
    }
    Config::default().save_to_file(path)?;
    info!("Wrote default configuration to {}", path.display());
    Ok(())
}

/// Setup logging to the console and, when configured, a daily-rotated file
fn setup_logging(verbose: bool, log_dir: Option<&Path>) -> Result<()> {
    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_file(verbose)
        .with_line_number(verbose);

    let file_layer = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let file_appender = rolling::daily(dir, "ffstage.log");
            let (non_blocking_file, guard) = non_blocking(file_appender);
            // Keep the guard alive for the duration of the program
            std::mem::forget(guard);

            Some(
                fmt::layer()
                    .with_writer(non_blocking_file)
                    .with_target(false)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_ansi(false)
                    .boxed(),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}
