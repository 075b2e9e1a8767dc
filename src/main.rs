//! Pagesmith - edit live web pages with natural-language requests.
//!
//! Main entry point for the Pagesmith CLI.

mod cli;
mod cmd_config;
mod cmd_run;

use std::path::PathBuf;

use clap::Parser;
use tracing::debug;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use pagesmith_config::ConfigStore;

use cli::{Cli, Commands};

/// Get the .pagesmith directory path.
fn pagesmith_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".pagesmith"))
        .unwrap_or_else(|| PathBuf::from(".pagesmith"))
}

/// Initialize tracing with console and file output.
///
/// Log files are written to ~/.pagesmith/logs/ with daily rotation.
fn init_tracing() -> Result<(), Box<dyn std::error::Error>> {
    let log_dir = pagesmith_dir().join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("pagesmith")
        .filename_suffix("log")
        .max_log_files(14)
        .build(&log_dir)?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // The worker flushes until the guard drops.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        // Console output goes to stderr so stdout stays clean for results
        .with(
            fmt::layer()
                .with_target(true)
                .with_ansi(true)
                .with_writer(std::io::stderr),
        )
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing()?;

    let cli = Cli::parse();
    let store = match cli.config.as_deref() {
        Some(path) => ConfigStore::from_path_str(path),
        None => ConfigStore::default(),
    };
    debug!("Using config store {}", store.path().display());

    let target = cmd_run::Target {
        cdp: cli.cdp,
        tab: cli.tab,
    };
    match cli.command {
        Commands::Run { prompt, json } => {
            cmd_run::run_prompt(&target, store, &prompt.join(" "), json).await
        }
        Commands::Action { action, json } => {
            cmd_run::run_action(&target, store, action, json).await
        }
        Commands::TestConnection => cmd_run::test_connection(&target, store).await,
        Commands::Message { json } => cmd_run::send_message(&target, store, &json).await,
        Commands::Config { action } => cmd_config::handle_config_command(action, &store),
    }
}
