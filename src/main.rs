//! Context Prefetch - priority-driven context cache and prefetch scheduler
//!
//! Command-line front end: discovers the working set of a project
//! directory, loads it through the persistent cache and manages the
//! loading configuration.

use anyhow::Result;
use clap::{Parser, Subcommand};
use context_prefetch::{
    loader::LoadingProgress,
    session::{FileSessionProvider, SessionProvider, StaticSessionProvider},
    storage::FileStore,
    ConfigUpdate, ContextManager, UpdateOutcome,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "context-prefetch")]
#[command(author = "A3S Lab Team")]
#[command(version)]
#[command(about = "Priority-driven context cache and prefetch scheduler")]
struct Cli {
    /// Directory holding the persisted cache and config
    #[arg(long, env = "CONTEXT_PREFETCH_DATA")]
    data_dir: Option<PathBuf>,

    /// Project directory to enumerate and load
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// JSON session snapshot file
    #[arg(long)]
    session: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the prioritized working set
    Discover,

    /// Load the working set through the cache (Ctrl+C cancels between batches)
    Load {
        /// Print every progress snapshot
        #[arg(long)]
        progress: bool,
    },

    /// Show cache statistics
    Stats,

    /// Show a summary of config, cache and recent entries
    Report,

    /// Drop all cached entries
    Invalidate,

    /// Show or change the loading configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show the current configuration
    Show,

    /// Update configuration fields
    Set {
        #[arg(long)]
        max_concurrent_loads: Option<usize>,
        #[arg(long)]
        priority_timeout_ms: Option<u64>,
        #[arg(long)]
        max_memory_mb: Option<u64>,
        #[arg(long)]
        cache_expiry_hours: Option<u64>,
        #[arg(long)]
        progressive_loading: Option<bool>,
        #[arg(long)]
        smart_filtering: Option<bool>,
        #[arg(long)]
        phase_aware_loading: Option<bool>,
    },

    /// Restore the default configuration
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("context_prefetch={}", log_level).into());
    let registry = tracing_subscriber::registry().with(filter);
    if cli.log_json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    let data_dir = cli.data_dir.clone().unwrap_or_else(FileStore::default_dir);
    let store = Arc::new(FileStore::new(data_dir).await?);
    let session: Arc<dyn SessionProvider> = match &cli.session {
        Some(path) => Arc::new(FileSessionProvider::new(path)),
        None => Arc::new(StaticSessionProvider::none()),
    };

    let manager = ContextManager::builder()
        .store(store)
        .session_provider(session)
        .root(&cli.root)
        .build()
        .await;

    match cli.command {
        Commands::Discover => discover(&manager).await,
        Commands::Load { progress } => load(&manager, progress).await,
        Commands::Stats => {
            let stats = manager.cache_stats().await;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Commands::Report => println!("{}", manager.generate_report().await),
        Commands::Invalidate => {
            if manager.invalidate_cache().await {
                println!("Cache cleared");
            } else {
                println!("Cache cleared in memory, but could not be saved");
            }
        }
        Commands::Config { action } => run_config(&manager, action).await?,
    }

    Ok(())
}

async fn discover(manager: &ContextManager) {
    let working_set = manager.discover().await;
    if working_set.is_empty() {
        println!("No resources selected");
        return;
    }
    for scored in &working_set {
        println!(
            "{:<8} {:>6}  {}",
            scored.tier(),
            scored.score,
            scored.descriptor.path
        );
    }
    println!();
    println!("{} resources in working set", working_set.len());
}

async fn load(manager: &ContextManager, verbose_progress: bool) {
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Cancelling after the current batch...");
            on_signal.cancel();
        }
    });

    let sink = move |p: &LoadingProgress| {
        if verbose_progress {
            println!(
                "[{:>5.1}%] {}/{} loaded, {} failed, {} from cache{}",
                p.progress_pct,
                p.loaded,
                p.total,
                p.failed,
                p.cache_hits,
                p.current_path
                    .as_deref()
                    .map(|path| format!(" ({})", path))
                    .unwrap_or_default()
            );
        }
    };

    let summary = manager.load_optimized_context(&sink, cancel).await;
    let progress = &summary.progress;

    println!(
        "{} {}/{} resources: {} loaded, {} failed, {} from cache in {}ms",
        if summary.cancelled { "Cancelled after" } else { "Finished" },
        progress.settled(),
        progress.total,
        progress.loaded,
        progress.failed,
        progress.cache_hits,
        progress.elapsed_ms
    );
    for failure in &summary.failures {
        println!("  ✗ {}: {}", failure.path, failure.message);
    }
}

async fn run_config(manager: &ContextManager, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let toml = toml::to_string_pretty(&manager.config().await)?;
            println!("{}", toml);
        }
        ConfigAction::Set {
            max_concurrent_loads,
            priority_timeout_ms,
            max_memory_mb,
            cache_expiry_hours,
            progressive_loading,
            smart_filtering,
            phase_aware_loading,
        } => {
            let update = ConfigUpdate {
                max_concurrent_loads,
                priority_timeout_ms,
                max_memory_mb,
                cache_expiry_hours,
                progressive_loading,
                smart_filtering,
                phase_aware_loading,
            };
            if update.is_empty() {
                println!("Nothing to update");
                return Ok(());
            }
            print_outcome(&manager.update_config(&update).await);
        }
        ConfigAction::Reset => {
            if manager.reset_config().await {
                println!("Configuration reset to defaults");
            } else {
                println!("Configuration reset in memory, but could not be saved");
            }
        }
    }
    Ok(())
}

fn print_outcome(outcome: &UpdateOutcome) {
    for field in &outcome.applied {
        println!("  ✓ {}", field);
    }
    for rejected in &outcome.rejected {
        println!("  ✗ {}: {}", rejected.field, rejected.reason);
    }
    if !outcome.applied.is_empty() && !outcome.persisted {
        println!("Warning: configuration could not be saved");
    }
}
