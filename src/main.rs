use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::{path::PathBuf, time::Instant};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use megasena_ingest::{
    format_storage_size, ingest_file, AppConfig, DatasetStore, JsonFileStore, Progress,
};

/// Mega-Sena results ingestion and local dataset store.
#[derive(Parser, Debug)]
#[command(version)]
struct Cli {
    /// YAML config file (falls back to $MEGASENA_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Store directory, overriding config and environment
    #[arg(long, global = true)]
    store_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ingest a results workbook and replace the stored dataset
    Ingest {
        file: PathBuf,
        /// Print every skipped row instead of a count
        #[arg(long)]
        show_skips: bool,
    },
    /// Show metadata and storage size of the stored dataset
    Info,
    /// Print the most recent draw
    Latest,
    /// Print draws as JSON lines, oldest first
    Draws {
        /// Only the last N draws (0 = all)
        #[arg(long, default_value_t = 0)]
        last: usize,
    },
    /// Remove the stored dataset
    Delete,
    /// Price of one bet, and how many bets a budget covers
    Cost {
        #[arg(long)]
        numbers: u8,
        #[arg(long)]
        budget: Option<f64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1) logging
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    // 2) config
    let cli = Cli::parse();
    let mut cfg = AppConfig::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(dir) = cli.store_dir {
        cfg.store.dir = dir;
    }
    let mut store = JsonFileStore::new(&cfg.store.dir)?;

    // 3) dispatch
    match cli.command {
        Command::Ingest { file, show_skips } => {
            let started = Instant::now();
            let mut sink = |line: &str| eprintln!("» {line}");
            let ingestion = ingest_file(&file, &cfg.ingest, &mut Progress::new(&mut sink))
                .await
                .with_context(|| format!("ingesting {}", file.display()))?;
            store.put(&ingestion.dataset)?;

            let meta = ingestion.dataset.metadata();
            info!(elapsed = ?started.elapsed(), "done");
            println!(
                "{} draws (contests {}..={}), {} rows skipped",
                meta.total_draws,
                meta.first_contest_id,
                meta.last_contest_id,
                meta.skipped_row_count
            );
            if show_skips {
                for skip in &ingestion.skips {
                    println!("  row {}: {}", skip.row, skip.reason);
                }
            } else if !ingestion.skips.is_empty() {
                warn!(
                    "{} rows skipped, rerun with --show-skips to list them",
                    ingestion.skips.len()
                );
            }
        }
        Command::Info => match store.metadata()? {
            Some(meta) => {
                println!("{}", serde_json::to_string_pretty(&meta)?);
                println!("storage: {}", format_storage_size(store.size_bytes()?));
            }
            None => println!("no dataset stored in {}", cfg.store.dir.display()),
        },
        Command::Latest => {
            let dataset = store.get()?.context("no dataset stored")?;
            let latest = dataset.latest_draw().context("stored dataset is empty")?;
            println!("{}", serde_json::to_string_pretty(latest)?);
        }
        Command::Draws { last } => {
            let dataset = store.get()?.context("no dataset stored")?;
            for draw in dataset.last_n(last) {
                println!("{}", serde_json::to_string(draw)?);
            }
        }
        Command::Delete => {
            store.delete()?;
            println!("dataset removed from {}", cfg.store.dir.display());
        }
        Command::Cost { numbers, budget } => {
            let Some(price) = cfg.prices.price_for(numbers) else {
                let known: Vec<String> = cfg.prices.iter().map(|(n, _)| n.to_string()).collect();
                bail!(
                    "no price configured for bets of {numbers} numbers (priced: {})",
                    known.join(", ")
                );
            };
            println!("{numbers} numbers: R$ {price:.2} per bet");
            if let Some(budget) = budget {
                let bets = cfg.prices.affordable_bets(budget, numbers).unwrap_or(0);
                println!("R$ {budget:.2} covers {bets} bet(s)");
            }
        }
    }
    Ok(())
}
