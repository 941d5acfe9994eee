//! fp-registry — curated registry of network-censorship fingerprints.
//!
//! Merges blockpage, false-positive and DNS fingerprints published by
//! Censored Planet, OONI and Citizen Lab into `fingerprints_http.csv` and
//! `fingerprints_dns.csv`.
//!
//! ## Commands
//!
//! - `fp-registry update`   — Fetch every feed and merge it into the CSV files
//! - `fp-registry validate` — Check both CSV files; exits non-zero on the first bad row

mod canonical;
mod config;
mod error;
mod fetch;
mod models;
mod pipeline;
mod pyliteral;
mod registry;
mod sources;
mod store;
mod validate;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{FeedConfig, StoreConfig};
use crate::fetch::Fetcher;

#[derive(Parser)]
#[command(name = "fp-registry", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch all upstream feeds and merge them into the registry files
    Update {
        #[command(flatten)]
        store: StoreConfig,
        #[command(flatten)]
        feeds: FeedConfig,
    },
    /// Validate the registry files
    Validate {
        #[command(flatten)]
        store: StoreConfig,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise structured logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "fp_registry=info,warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match Cli::parse().command {
        Command::Update { store, feeds } => {
            let fetcher = Fetcher::new(feeds.timeout())?;
            let summary = pipeline::update(&store, &feeds, &fetcher).await?;
            tracing::info!(
                "Wrote {} HTTP and {} DNS fingerprints",
                summary.http_rows,
                summary.dns_rows
            );
        }
        Command::Validate { store } => {
            pipeline::validate(&store)?;
        }
    }
    Ok(())
}
