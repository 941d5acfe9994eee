// SPDX-License-Identifier: EUPL-1.2
// Copyright (c) 2026 Benjamin Küttner <benjamin.kuettner@icloud.com>
// Patent Pending — DE Gebrauchsmuster, filed 2026-02-23

//! CSV persistence for the registry: `fingerprints_http.csv` and
//! `fingerprints_dns.csv`.

use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::RegistryError;
use crate::models::{push_unique, Fingerprint, Scope};
use crate::registry::Registry;

/// Column order shared by both files.
pub const HEADER: [&str; 11] = [
    "name",
    "location_found",
    "pattern_type",
    "pattern",
    "scope",
    "confidence_no_fp",
    "expected_countries",
    "source",
    "exp_url",
    "notes",
    "other_names",
];

/// One persisted row; multi-valued cells are comma-joined.
///
/// Field order is the column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerprintRow {
    pub name: String,
    pub location_found: String,
    pub pattern_type: String,
    pub pattern: String,
    pub scope: String,
    pub confidence_no_fp: String,
    pub expected_countries: String,
    pub source: String,
    pub exp_url: String,
    pub notes: String,
    pub other_names: String,
}

impl From<&Fingerprint> for FingerprintRow {
    fn from(fp: &Fingerprint) -> Self {
        Self {
            name: fp.name.clone(),
            location_found: fp.location_found.to_string(),
            pattern_type: fp.pattern_type.to_string(),
            pattern: fp.pattern.clone(),
            scope: fp.scope.map(|s| s.to_string()).unwrap_or_default(),
            confidence_no_fp: fp.confidence_no_fp.to_string(),
            expected_countries: join(&fp.expected_countries),
            source: join(&fp.source),
            exp_url: fp.exp_url.clone(),
            notes: fp.notes.clone(),
            other_names: join(&fp.other_names),
        }
    }
}

impl TryFrom<FingerprintRow> for Fingerprint {
    type Error = RegistryError;

    fn try_from(row: FingerprintRow) -> Result<Self, Self::Error> {
        let confidence_no_fp = row.confidence_no_fp.parse().map_err(|_| {
            RegistryError::InvalidField(format!(
                "Invalid confidence_no_fp '{}'",
                row.confidence_no_fp
            ))
        })?;
        let mut source = Vec::new();
        for tag in split(&row.source) {
            push_unique(&mut source, tag);
        }
        Ok(Fingerprint {
            name: row.name,
            location_found: row.location_found.parse()?,
            pattern_type: row.pattern_type.parse()?,
            pattern: row.pattern,
            scope: Scope::parse_optional(&row.scope)?,
            confidence_no_fp,
            expected_countries: split(&row.expected_countries).collect(),
            source,
            exp_url: row.exp_url,
            notes: row.notes,
            other_names: split(&row.other_names).collect(),
        })
    }
}

fn join<'a>(values: impl IntoIterator<Item = &'a String>) -> String {
    values
        .into_iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

/// Comma-split a cell; an empty cell has no values.
fn split(cell: &str) -> impl Iterator<Item = String> + '_ {
    cell.split(',')
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Load persisted state: HTTP rows first, then DNS rows, in file order.
pub fn load(http_path: &Path, dns_path: &Path) -> Result<Vec<Fingerprint>, RegistryError> {
    let mut records = read_file(http_path)?;
    records.extend(read_file(dns_path)?);
    Ok(records)
}

/// Read one persisted file. Row positions in errors are 1-based data rows.
pub fn read_file(path: &Path) -> Result<Vec<Fingerprint>, RegistryError> {
    let file = File::open(path).map_err(|e| RegistryError::io(path, e))?;
    let mut reader = csv::Reader::from_reader(file);
    let mut records = Vec::new();
    for (idx, row) in reader.deserialize::<FingerprintRow>().enumerate() {
        let row = row.map_err(|e| RegistryError::from(e).at_row(path, idx + 1))?;
        records.push(Fingerprint::try_from(row).map_err(|e| e.at_row(path, idx + 1))?);
    }
    tracing::debug!("Loaded {} fingerprints from {}", records.len(), path.display());
    Ok(records)
}

/// Write the registry back out, split by DNS vs. everything else.
///
/// Returns the number of rows written to each file.
pub fn write(
    registry: &Registry,
    http_path: &Path,
    dns_path: &Path,
) -> Result<(usize, usize), RegistryError> {
    let (http, dns): (Vec<&Fingerprint>, Vec<&Fingerprint>) = registry
        .records()
        .iter()
        .partition(|fp| !fp.location_found.is_dns());
    write_file(http_path, &http)?;
    write_file(dns_path, &dns)?;
    Ok((http.len(), dns.len()))
}

fn write_file(path: &Path, records: &[&Fingerprint]) -> Result<(), RegistryError> {
    let file = File::create(path).map_err(|e| RegistryError::io(path, e))?;
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .has_headers(false)
        .from_writer(file);
    // Written explicitly so an empty file still carries the header.
    writer.write_record(HEADER)?;
    for fp in records {
        writer.serialize(FingerprintRow::from(*fp))?;
    }
    writer.flush().map_err(|e| RegistryError::io(path, e))?;
    tracing::info!("Wrote {} fingerprints to {}", records.len(), path.display());
    Ok(())
}
