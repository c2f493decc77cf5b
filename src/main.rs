//! PageFill - generated text for the fields of a browser tab.
//!
//! Main entry point for the PageFill CLI.

mod cli;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use pagefill_bridge_cdp::{FileCredentialStore, HostBridge};
use pagefill_config::{Config, ConfigLoader, LoggingConfig, default_config_path};
use pagefill_protocols::{CredentialStore, HostNotification, HostRequest, HostResponse};
use pagefill_provider_gemini::ModelClient;

use crate::cli::{Cli, Commands, KeyAction};

fn init_tracing(logging: &LoggingConfig) -> anyhow::Result<()> {
    let log_dir = logging.resolved_dir();
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("creating log directory {}", log_dir.display()))?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("pagefill")
        .filename_suffix("log")
        .max_log_files(14)
        .build(&log_dir)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Keeps the file writer flushing until exit.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    tracing_subscriber::registry()
        .with(env_filter)
        // Console output stays on stderr; stdout carries alerts.
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
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.unwrap_or_else(default_config_path);
    let config = ConfigLoader::load_or_default(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;

    init_tracing(&config.logging)?;
    info!("PageFill v{}", env!("CARGO_PKG_VERSION"));

    let store = Arc::new(FileCredentialStore::new(config.storage.resolved_path()));

    match cli.command {
        Commands::Info => run_info(&config, store).await,
        Commands::Fill { api_key } => run_fill(&config, store, api_key.unwrap_or_default()).await,
        Commands::Key { action } => run_key(store, action).await,
    }
}

async fn attach(config: &Config, store: Arc<FileCredentialStore>) -> anyhow::Result<HostBridge> {
    let generator = Arc::new(ModelClient::from_config(&config.gemini));
    let bridge = HostBridge::attach(&config.browser, generator, store)
        .await
        .with_context(|| format!("attaching to browser at {}", config.browser.endpoint))?;
    Ok(bridge)
}

/// Print alerts until the bridge and its relay are gone.
fn print_alerts(
    mut alerts: broadcast::Receiver<HostNotification>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match alerts.recv().await {
                Ok(HostNotification::ShowAlert { message }) => println!("{}", message),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("Skipped {} alerts", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

async fn run_info(config: &Config, store: Arc<FileCredentialStore>) -> anyhow::Result<()> {
    let bridge = attach(config, store).await?;
    let printer = print_alerts(bridge.subscribe());

    let result = bridge
        .handle(HostRequest::GetPageInfo, &CancellationToken::new())
        .await;
    drop(bridge);
    printer.await?;

    if let HostResponse::PageInfo(info) = result? {
        println!("Page: {}", info.page_context.page_title);
    }
    Ok(())
}

async fn run_fill(
    config: &Config,
    store: Arc<FileCredentialStore>,
    api_key: String,
) -> anyhow::Result<()> {
    let bridge = attach(config, store).await?;
    let printer = print_alerts(bridge.subscribe());

    let cancel = CancellationToken::new();
    let on_interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, stopping after the current field");
                cancel.cancel();
            }
        })
    };

    let result = bridge
        .handle(HostRequest::Autofill { api_key }, &cancel)
        .await;
    on_interrupt.abort();
    drop(bridge);
    printer.await?;

    result?;
    Ok(())
}

async fn run_key(store: Arc<FileCredentialStore>, action: KeyAction) -> anyhow::Result<()> {
    match action {
        KeyAction::Set { key } => {
            store.save_credential(&key).await?;
            println!("API key saved successfully!");
            info!("Stored API key in {}", store.path().display());
        }
        KeyAction::Show => match store.credential().await? {
            Some(key) => println!("API key: {}", mask(&key)),
            None => println!("No API key stored. Set one with `pagefill key set <KEY>`."),
        },
    }
    Ok(())
}

/// Keep the last four characters of a secret.
fn mask(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    let visible = chars.len().saturating_sub(4);
    chars
        .iter()
        .enumerate()
        .map(|(i, c)| if i < visible { '*' } else { *c })
        .collect()
}
