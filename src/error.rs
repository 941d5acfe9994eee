// SPDX-License-Identifier: EUPL-1.2
// Copyright (c) 2026 Benjamin Küttner <benjamin.kuettner@icloud.com>
// Patent Pending — DE Gebrauchsmuster, filed 2026-02-23

//! Error types for the fingerprint registry.

/// Every failure the update and validate passes can surface.
///
/// Duplicate names after a merge are not an error: they are
/// reported as warnings by [`crate::registry::Registry::finalize`].
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Fetch failed for {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Fetch of {url} returned HTTP {status}")]
    FetchStatus { url: String, status: u16 },

    #[error("Unsupported {feed} record at {position}: {reason}")]
    UnsupportedShape {
        feed: &'static str,
        position: String,
        reason: String,
    },

    #[error("{path}:{row} {message}")]
    InvalidRow {
        path: String,
        row: usize,
        message: String,
    },

    #[error("Invalid field value: {0}")]
    InvalidField(String),

    #[error("Invalid literal: {0}")]
    Literal(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl RegistryError {
    /// Attach a file position to a field-level error.
    pub fn at_row(self, path: &std::path::Path, row: usize) -> Self {
        match self {
            RegistryError::InvalidRow { .. } => self,
            other => RegistryError::InvalidRow {
                path: path.display().to_string(),
                row,
                message: other.to_string(),
            },
        }
    }

    pub fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        RegistryError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}
