//! Subnorm - Readable Subtitle Line Normalization
//!
//! This is the main entry point for the subnorm application, which splits long
//! subtitle captions into readable lines and retimes them by reading speed.

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tracing_appender::{non_blocking, rolling};

use subnorm::cli::{Args, Commands};
use subnorm::config::Config;
use subnorm::normalize::symbol_count;
use subnorm::workflow::Workflow;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Setup logging to both console and file
    setup_logging(args.verbose)?;

    // Load configuration
    let mut config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            // Try to load config.toml from current directory first
            if std::path::Path::new("config.toml").exists() {
                info!("Found config.toml in current directory, loading...");
                Config::from_file("config.toml")?
            } else {
                Config::default()
            }
        }
    };

    if let Some(symbols) = args.command.symbols() {
        config.normalize.max_symbols = symbols;
    }

    match args.command {
        Commands::Normalize { input, output, json, .. } => {
            let workflow = Workflow::new(config)?;
            let report = workflow.process_file(&input, output.as_ref()).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!(
                    "{} dialogue events read, {} written ({} split, {} malformed lines, {} degenerate, {} without text)",
                    report.events_read,
                    report.events_written,
                    report.events_split,
                    report.malformed_lines,
                    report.degenerate_events,
                    report.zero_symbol_events
                );
            }
        }
        Commands::Batch { input_dir, output_dir, .. } => {
            let workflow = Workflow::new(config)?;
            let summary = workflow.process_directory(&input_dir, output_dir.as_ref()).await?;

            println!(
                "{} files processed, {} failed, {} dialogue events read, {} written",
                summary.files_processed,
                summary.files_failed,
                summary.report.events_read,
                summary.report.events_written
            );
        }
        Commands::Preview { text, .. } => {
            let workflow = Workflow::new(config)?;
            let limit = workflow.config().normalize.max_symbols;

            println!("Limit: {} symbols", limit);
            println!("{}", "-".repeat(60));
            for (index, chunk) in workflow.preview(&text).iter().enumerate() {
                for line in chunk.split(subnorm::normalize::LINE_BREAK) {
                    println!("{:>3} [{:>3}] {}", index + 1, symbol_count(line), line);
                }
            }
        }
        Commands::InitConfig { output } => {
            config.save_to_file(&output)?;
            println!("Configuration written to {}", output.display());
        }
    }

    Ok(())
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<()> {
    // Create log directory
    let log_dir = std::env::current_dir()?.join(".subnorm").join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "subnorm.log");
    let (non_blocking_file, _guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(_guard);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    // Console output goes to stderr so reports on stdout stay clean
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_file(verbose)
        .with_line_number(verbose);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false); // No ANSI colors in file

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Logging initialized - console: {}, file: {}",
          log_level, log_dir.join("subnorm.log").display());

    Ok(())
}
