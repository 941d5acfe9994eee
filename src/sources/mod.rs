// SPDX-License-Identifier: EUPL-1.2
// Copyright (c) 2026 Benjamin Küttner <benjamin.kuettner@icloud.com>
// Patent Pending — DE Gebrauchsmuster, filed 2026-02-23

//! Feed adapters.
//!
//! Each adapter turns one fetched document into candidate fingerprints.
//! Adapters are pure: they never see the registry.

pub mod censored_planet;
pub mod citizenlab;
pub mod ooni;

use crate::error::RegistryError;
use crate::models::{Fingerprint, Scope};

/// One upstream feed, in the order the update pass consumes them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feed {
    CensoredPlanet {
        url: String,
        prefix: &'static str,
        scope: Option<Scope>,
    },
    Ooni {
        url: String,
    },
    CitizenLabHttp {
        url: String,
    },
    CitizenLabDns {
        url: String,
    },
}

impl Feed {
    pub fn url(&self) -> &str {
        match self {
            Feed::CensoredPlanet { url, .. }
            | Feed::Ooni { url }
            | Feed::CitizenLabHttp { url }
            | Feed::CitizenLabDns { url } => url,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Feed::CensoredPlanet { scope: Some(Scope::Fp), .. } => "censored planet false positives",
            Feed::CensoredPlanet { .. } => "censored planet blockpages",
            Feed::Ooni { .. } => "ooni",
            Feed::CitizenLabHttp { .. } => "citizenlab http",
            Feed::CitizenLabDns { .. } => "citizenlab dns",
        }
    }

    /// Run this feed's adapter over its fetched document.
    pub fn adapt(&self, document: &str) -> Result<Vec<Fingerprint>, RegistryError> {
        match self {
            Feed::CensoredPlanet { prefix, scope, .. } => {
                censored_planet::adapt(document, prefix, *scope)
            }
            Feed::Ooni { .. } => ooni::adapt(document),
            Feed::CitizenLabHttp { .. } => citizenlab::adapt_http(document),
            Feed::CitizenLabDns { .. } => citizenlab::adapt_dns(document),
        }
    }
}
