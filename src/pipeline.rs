// SPDX-License-Identifier: EUPL-1.2
// Copyright (c) 2026 Benjamin Küttner <benjamin.kuettner@icloud.com>
// Patent Pending — DE Gebrauchsmuster, filed 2026-02-23

//! The update and validate passes.

use crate::config::{FeedConfig, StoreConfig};
use crate::error::RegistryError;
use crate::fetch::Fetcher;
use crate::registry::{Registry, Upsert};
use crate::{store, validate};

/// Counters reported at the end of an update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateSummary {
    pub loaded: usize,
    pub added: usize,
    pub merged: usize,
    pub duplicates: Vec<String>,
    pub http_rows: usize,
    pub dns_rows: usize,
}

/// Load the registry, merge every feed into it in order, write it back.
///
/// Nothing is written unless every feed was fetched and adapted.
pub async fn update(
    store_config: &StoreConfig,
    feed_config: &FeedConfig,
    fetcher: &Fetcher,
) -> Result<UpdateSummary, RegistryError> {
    let mut registry = Registry::new(store::load(
        &store_config.http_csv,
        &store_config.dns_csv,
    )?);
    let mut summary = UpdateSummary {
        loaded: registry.len(),
        ..Default::default()
    };
    tracing::info!("Loaded {} existing fingerprints", summary.loaded);

    for feed in feed_config.feeds() {
        tracing::info!("Fetching {} fingerprints from {}", feed.label(), feed.url());
        let document = fetcher.fetch_text(feed.url()).await?;
        let candidates = feed.adapt(&document)?;
        tracing::info!("{}: {} candidate fingerprints", feed.label(), candidates.len());
        for candidate in candidates {
            match registry.upsert(candidate) {
                Upsert::Added => summary.added += 1,
                Upsert::Merged => summary.merged += 1,
            }
        }
    }

    summary.duplicates = registry.finalize();
    let (http_rows, dns_rows) =
        store::write(&registry, &store_config.http_csv, &store_config.dns_csv)?;
    summary.http_rows = http_rows;
    summary.dns_rows = dns_rows;

    tracing::info!(
        "Update complete: {} loaded, {} added, {} merged, {} duplicate names",
        summary.loaded,
        summary.added,
        summary.merged,
        summary.duplicates.len()
    );
    Ok(summary)
}

/// Validate the DNS file, then the HTTP file.
pub fn validate(store_config: &StoreConfig) -> Result<usize, RegistryError> {
    let mut total = 0;
    for path in [&store_config.dns_csv, &store_config.http_csv] {
        let rows = validate::validate_file(path)?;
        tracing::info!("{}: {} rows valid", path.display(), rows);
        total += rows;
    }
    tracing::info!("Validation successful");
    Ok(total)
}
