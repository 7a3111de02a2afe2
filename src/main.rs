//! # NameWatch CLI
//!
//! Watches usernames for release and alerts through the grace period.
//!
//! Usage:
//!   namewatch run                      # Poll forever
//!   namewatch run --once               # One cycle, then exit
//!   namewatch check alice bob          # Probe names once
//!   namewatch status                   # Show tracked names and stages
//!   namewatch config show              # Show effective configuration

use anyhow::Result;
use clap::{Parser, Subcommand};
use namewatch_core::clock::{Clock, SystemClock};
use namewatch_core::config::NameWatchConfig;
use namewatch_core::traits::AvailabilityProbe;
use namewatch_scheduler::{GraceThresholds, PollingScheduler, StateStore};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "namewatch",
    version,
    about = "NameWatch: username release watcher",
    long_about = "Polls watched usernames, records when each becomes available,\nand alerts through the grace period until it is free to claim."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the polling loop
    Run {
        /// Run a single cycle and exit (same as BUILD=1)
        #[arg(long)]
        once: bool,
    },

    /// Probe usernames once and print the result
    Check {
        /// Usernames to check
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Show tracked usernames with their stage and time left
    Status,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show effective configuration (file + environment)
    Show,
    /// Write a default config file
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "namewatch=debug,namewatch_core=debug,namewatch_scheduler=debug,namewatch_providers=debug,namewatch_channels=debug"
    } else {
        "namewatch=info,namewatch_core=info,namewatch_scheduler=info,namewatch_providers=info,namewatch_channels=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .init();

    // Load config
    let mut config = if let Some(path) = &cli.config {
        NameWatchConfig::load_from(std::path::Path::new(path))?
    } else {
        NameWatchConfig::load()?
    };

    match cli.command {
        Commands::Run { once } => {
            if once {
                config.watch.build_mode = true;
            }

            let probe = Arc::new(namewatch_providers::MojangProbe::new(&config.probe)?);
            let sink: Arc<dyn namewatch_core::traits::NotificationSink> =
                Arc::from(namewatch_channels::sink_from_config(&config.notify)?);

            let mut scheduler = PollingScheduler::new(&config, probe, sink)?;
            scheduler.run().await;
        }

        Commands::Check { names } => {
            let probe = namewatch_providers::MojangProbe::new(&config.probe)?;
            for name in names {
                match probe.check(&name).await {
                    Ok(availability) => println!("{name}: {availability}"),
                    Err(e) => println!("{name}: unknown ({e})"),
                }
            }
        }

        Commands::Status => {
            let store = StateStore::new(config.state_path());
            let state = store.load();
            let thresholds = GraceThresholds::from_config(&config.grace)?;
            let now = SystemClock.now();

            println!("State file: {}", store.path().display());
            if state.is_empty() {
                println!("  (no usernames tracked)");
            }
            for entry in namewatch_scheduler::status::entries(&state, &thresholds, now) {
                let since = chrono::DateTime::from_timestamp(entry.first_seen, 0)
                    .map(|d| d.format("%Y-%m-%d %H:%M UTC").to_string())
                    .unwrap_or_else(|| entry.first_seen.to_string());
                match entry.time_left {
                    Some(left) => println!("  {:<16} {:<12} since {since} ({left})", entry.name, entry.stage),
                    None => println!("  {:<16} {:<12} since {since}", entry.name, entry.stage),
                }
            }
        }

        Commands::Config { action } => {
            match action {
                ConfigAction::Show => {
                    let content = toml::to_string_pretty(&config)?;
                    println!("{content}");
                }
                ConfigAction::Init => {
                    let path = NameWatchConfig::default_path();
                    if path.exists() {
                        println!("Config already exists: {}", path.display());
                    } else {
                        NameWatchConfig::default().save_to(&path)?;
                        println!("Config saved to: {}", path.display());
                    }
                }
            }
        }
    }

    Ok(())
}
