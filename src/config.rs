// SPDX-License-Identifier: EUPL-1.2
// Copyright (c) 2026 Benjamin Küttner <benjamin.kuettner@icloud.com>
// Patent Pending — DE Gebrauchsmuster, filed 2026-02-23

//! Run configuration. Every value can come from a flag or the environment.

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;

use crate::models::Scope;
use crate::sources::Feed;

pub const CP_BLOCKPAGE_URL: &str = "https://raw.githubusercontent.com/censoredplanet/censoredplanet-analysis/master/pipeline/metadata/data/blockpage_signatures.json";
pub const CP_FALSE_POSITIVE_URL: &str = "https://raw.githubusercontent.com/censoredplanet/censoredplanet-analysis/master/pipeline/metadata/data/false_positive_signatures.json";
pub const OONI_URL: &str =
    "https://raw.githubusercontent.com/ooni/pipeline/master/af/fastpath/fastpath/utils.py";
pub const CL_HTTP_URL: &str =
    "https://raw.githubusercontent.com/citizenlab/filtering-annotations/master/data/v1/http.csv";
pub const CL_DNS_URL: &str =
    "https://raw.githubusercontent.com/citizenlab/filtering-annotations/master/data/v1/dns.csv";

/// Locations of the two persisted files.
#[derive(Debug, Clone, Args)]
pub struct StoreConfig {
    /// Non-DNS fingerprints
    #[arg(long, env = "FP_HTTP_CSV", default_value = "fingerprints_http.csv")]
    pub http_csv: PathBuf,

    /// DNS fingerprints
    #[arg(long, env = "FP_DNS_CSV", default_value = "fingerprints_dns.csv")]
    pub dns_csv: PathBuf,
}

/// Upstream feed locations and fetch behaviour.
#[derive(Debug, Clone, Args)]
pub struct FeedConfig {
    #[arg(long, env = "FP_CP_FALSE_POSITIVE_URL", default_value = CP_FALSE_POSITIVE_URL)]
    pub cp_false_positive_url: String,

    #[arg(long, env = "FP_CP_BLOCKPAGE_URL", default_value = CP_BLOCKPAGE_URL)]
    pub cp_blockpage_url: String,

    #[arg(long, env = "FP_OONI_URL", default_value = OONI_URL)]
    pub ooni_url: String,

    #[arg(long, env = "FP_CL_HTTP_URL", default_value = CL_HTTP_URL)]
    pub cl_http_url: String,

    #[arg(long, env = "FP_CL_DNS_URL", default_value = CL_DNS_URL)]
    pub cl_dns_url: String,

    /// Per-request timeout in seconds
    #[arg(long, env = "FP_FETCH_TIMEOUT_SECS", default_value_t = 60)]
    pub fetch_timeout_secs: u64,
}

impl FeedConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Feeds in merge order. Later feeds only fill what earlier ones left
    /// empty, so this order decides which source wins a field.
    pub fn feeds(&self) -> Vec<Feed> {
        vec![
            Feed::CensoredPlanet {
                url: self.cp_false_positive_url.clone(),
                prefix: "cp.fp_",
                scope: Some(Scope::Fp),
            },
            Feed::CensoredPlanet {
                url: self.cp_blockpage_url.clone(),
                prefix: "cp.",
                scope: None,
            },
            Feed::Ooni {
                url: self.ooni_url.clone(),
            },
            Feed::CitizenLabHttp {
                url: self.cl_http_url.clone(),
            },
            Feed::CitizenLabDns {
                url: self.cl_dns_url.clone(),
            },
        ]
    }
}
