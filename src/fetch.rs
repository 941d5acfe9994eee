// SPDX-License-Identifier: EUPL-1.2
// Copyright (c) 2026 Benjamin Küttner <benjamin.kuettner@icloud.com>
// Patent Pending — DE Gebrauchsmuster, filed 2026-02-23

//! Upstream document retrieval.

use std::time::Duration;

use crate::error::RegistryError;

/// Plain GET client shared by every feed. No retries: a failed fetch aborts
/// the run and the operator re-runs it.
#[derive(Clone)]
pub struct Fetcher {
    http: reqwest::Client,
}

impl Fetcher {
    pub fn new(timeout: Duration) -> Result<Self, RegistryError> {
        let http = reqwest::Client::builder()
            .user_agent(format!("fp-registry/{}", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|source| RegistryError::Fetch {
                url: String::new(),
                source,
            })?;
        Ok(Self { http })
    }

    /// Fetch `url` as text. Any non-2xx status is an error.
    pub async fn fetch_text(&self, url: &str) -> Result<String, RegistryError> {
        let fetch_err = |source| RegistryError::Fetch {
            url: url.to_string(),
            source,
        };
        let resp = self.http.get(url).send().await.map_err(fetch_err)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(RegistryError::FetchStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let body = resp.text().await.map_err(fetch_err)?;
        tracing::debug!("Fetched {} bytes from {}", body.len(), url);
        Ok(body)
    }
}
