//! VIX regime scanner.
//!
//! # Usage
//!
//! ```bash
//! # Telegram credentials
//! export TELEGRAM_TOKEN=your-bot-token
//! export TELEGRAM_CHAT_ID=your-chat-id
//!
//! # Scan forever
//! vix-scanner run --config config/scanner.toml
//!
//! # Smoke check: one tick, messages to the log, history left untouched
//! vix-scanner once --dry-run
//!
//! # Print the weekly dashboard from saved history
//! vix-scanner dashboard
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};

use vix_scanner::alerts::Alert;
use vix_scanner::notify::{LogNotifier, Notifier, TelegramNotifier};
use vix_scanner::scanner::{restore_history, Scanner, ScannerConfig};
use vix_scanner::{JsonHistoryStore, YahooSource};

#[derive(Parser)]
#[command(name = "vix-scanner")]
#[command(about = "VIX mean-reversion regime scanner with Telegram alerts")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll and alert until killed
    Run {
        /// Log messages instead of sending them to Telegram
        #[arg(long)]
        dry_run: bool,
    },

    /// Run a single tick without saving history, then exit
    Once {
        /// Log messages instead of sending them to Telegram
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the weekly dashboard from saved history
    Dashboard,
}

fn telegram_from_env() -> Result<TelegramNotifier> {
    let token = std::env::var("TELEGRAM_TOKEN")
        .context("TELEGRAM_TOKEN environment variable not set")?;
    let chat_id = std::env::var("TELEGRAM_CHAT_ID")
        .context("TELEGRAM_CHAT_ID environment variable not set")?;
    Ok(TelegramNotifier::new(token, chat_id))
}

async fn scan<N: Notifier>(config: ScannerConfig, notifier: N, forever: bool) -> Result<()> {
    let source = YahooSource::new(config.symbols.clone());
    let store = JsonHistoryStore::new(config.history_file.clone());
    let mut scanner = Scanner::new(config, source, notifier, store, Utc::now());

    if forever {
        scanner.run().await;
    } else {
        let mut scanner = scanner.without_persistence();
        scanner.tick(Utc::now()).await?;
    }
    Ok(())
}

async fn cmd_scan(config: ScannerConfig, dry_run: bool, forever: bool) -> Result<()> {
    if dry_run {
        scan(config, LogNotifier, forever).await
    } else {
        scan(config, telegram_from_env()?, forever).await
    }
}

fn cmd_dashboard(config: &ScannerConfig) -> Result<()> {
    let store = JsonHistoryStore::new(config.history_file.clone());
    let history = restore_history(&store, config);

    let summary = history.weekly.summary();
    let regime = history.weekly.records().last().map(|r| r.regime);
    match (summary, regime) {
        (Some(summary), Some(regime)) => {
            println!("{}", Alert::Dashboard { summary, regime }.render());
        }
        _ => {
            println!(
                "Not enough readings for a dashboard ({} stored in {})",
                history.weekly.len(),
                store.path().display()
            );
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("vix_scanner=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = ScannerConfig::load_or_default(cli.config.as_deref())
        .context("Failed to load configuration")?;

    match cli.command {
        Commands::Run { dry_run } => cmd_scan(config, dry_run, true).await?,
        Commands::Once { dry_run } => cmd_scan(config, dry_run, false).await?,
        Commands::Dashboard => cmd_dashboard(&config)?,
    }

    Ok(())
}
