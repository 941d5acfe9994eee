// SPDX-License-Identifier: EUPL-1.2
// Copyright (c) 2026 Benjamin Küttner <benjamin.kuettner@icloud.com>
// Patent Pending — DE Gebrauchsmuster, filed 2026-02-23

//! Structural validation of the persisted CSV files.
//!
//! Runs as its own pass over the raw rows, independent of the loader, so a
//! hand-edited file is checked exactly as written. The first failure stops
//! the pass.

use std::collections::HashSet;
use std::fs::File;
use std::path::Path;

use crate::error::RegistryError;
use crate::models::{is_valid_country, Location, PatternType, Scope, CONFIDENCE_RANGE};
use crate::store::HEADER;

/// Validate one file, returning the number of data rows checked.
pub fn validate_file(path: &Path) -> Result<usize, RegistryError> {
    let file = File::open(path).map_err(|e| RegistryError::io(path, e))?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    let header = reader.headers()?.clone();
    if !header.iter().eq(HEADER) {
        return Err(RegistryError::InvalidRow {
            path: path.display().to_string(),
            row: 0,
            message: format!(
                "Unexpected header {:?}, expected {:?}",
                header.iter().collect::<Vec<_>>(),
                HEADER
            ),
        });
    }

    let mut names = HashSet::new();
    let mut checked = 0;
    for (idx, record) in reader.records().enumerate() {
        let row = idx + 1;
        let fail = |message: String| RegistryError::InvalidRow {
            path: path.display().to_string(),
            row,
            message,
        };
        let record = record.map_err(|e| fail(e.to_string()))?;
        if record.len() != header.len() {
            return Err(fail(format!(
                "Inconsistent row count: expected {} got {}",
                header.len(),
                record.len()
            )));
        }
        let cell = |column: &str| {
            HEADER
                .iter()
                .position(|c| *c == column)
                .and_then(|i| record.get(i))
                .unwrap_or_default()
        };

        validate_row(
            cell("scope"),
            cell("pattern"),
            cell("location_found"),
            cell("pattern_type"),
            cell("confidence_no_fp"),
            cell("expected_countries"),
        )
        .map_err(&fail)?;

        let name = cell("name").to_string();
        if !names.insert(name.clone()) {
            return Err(fail(format!("Duplicate fingerprint name {name}")));
        }
        checked += 1;
    }
    Ok(checked)
}

fn validate_row(
    scope: &str,
    pattern: &str,
    location: &str,
    pattern_type: &str,
    confidence: &str,
    expected_countries: &str,
) -> Result<(), String> {
    scope.parse::<Scope>().map_err(|_| format!("Invalid scope '{scope}'"))?;
    if pattern.is_empty() {
        return Err("Empty pattern".into());
    }
    location
        .parse::<Location>()
        .map_err(|_| format!("Invalid location '{location}'"))?;
    let pattern_type = pattern_type
        .parse::<PatternType>()
        .map_err(|_| format!("Invalid pattern_type '{pattern_type}'"))?;
    if pattern_type == PatternType::Regexp {
        regex::Regex::new(pattern).map_err(|e| format!("Invalid regexp: {e}"))?;
    }
    match confidence.parse::<u8>() {
        Ok(value) if CONFIDENCE_RANGE.contains(&value) => {}
        _ => return Err(format!("Invalid confidence_no_fp '{confidence}'")),
    }

    if expected_countries != expected_countries.trim() {
        return Err("Spaces or newlines around expected_countries".into());
    }
    if !expected_countries.is_empty() {
        for cc in expected_countries.split(',') {
            if cc.is_empty() {
                return Err(format!(
                    "Spurious commas in expected_countries {expected_countries:?}"
                ));
            }
            if !is_valid_country(cc) {
                return Err(format!("Unexpected CC '{cc}'"));
            }
        }
    }
    Ok(())
}
