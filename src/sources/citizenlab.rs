// SPDX-License-Identifier: EUPL-1.2
// Copyright (c) 2026 Benjamin Küttner <benjamin.kuettner@icloud.com>
// Patent Pending — DE Gebrauchsmuster, filed 2026-02-23

//! Citizen Lab filtering-annotations (`http.csv` and `dns.csv`).
//!
//! List-valued columns hold Python `repr()` lists, e.g. `['citizenlab']`.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::RegistryError;
use crate::models::{
    Fingerprint, Location, PatternType, Scope, CONFIDENCE_RANGE, DEFAULT_CONFIDENCE,
};
use crate::pyliteral;

/// Prefix for every Citizen Lab fingerprint name.
pub const NAME_PREFIX: &str = "cl.";

/// Columns shared by both annotation files.
#[derive(Debug)]
struct Annotation {
    name: String,
    confidence_no_fp: String,
    exp_url: String,
    source: String,
    scope: String,
    expected_countries: String,
    notes: String,
}

#[derive(Debug, Deserialize)]
struct HttpRow {
    name: String,
    location_found: String,
    pattern: String,
    #[serde(default)]
    confidence_no_fp: String,
    #[serde(default)]
    exp_url: String,
    #[serde(default)]
    source: String,
    #[serde(default)]
    scope: String,
    #[serde(default)]
    expected_countries: String,
    #[serde(default)]
    notes: String,
}

#[derive(Debug, Deserialize)]
struct DnsRow {
    name: String,
    response: String,
    #[serde(default)]
    confidence_no_fp: String,
    #[serde(default)]
    exp_url: String,
    #[serde(default)]
    source: String,
    #[serde(default)]
    scope: String,
    #[serde(default)]
    expected_countries: String,
    #[serde(default)]
    notes: String,
}

impl HttpRow {
    fn split(self) -> (String, String, Annotation) {
        let annotation = Annotation {
            name: self.name,
            confidence_no_fp: self.confidence_no_fp,
            exp_url: self.exp_url,
            source: self.source,
            scope: self.scope,
            expected_countries: self.expected_countries,
            notes: self.notes,
        };
        (self.location_found, self.pattern, annotation)
    }
}

impl DnsRow {
    fn split(self) -> (String, Annotation) {
        let annotation = Annotation {
            name: self.name,
            confidence_no_fp: self.confidence_no_fp,
            exp_url: self.exp_url,
            source: self.source,
            scope: self.scope,
            expected_countries: self.expected_countries,
            notes: self.notes,
        };
        (self.response, annotation)
    }
}

/// Adapt `http.csv`.
pub fn adapt_http(document: &str) -> Result<Vec<Fingerprint>, RegistryError> {
    read_rows::<HttpRow>(document, "citizenlab http")?
        .into_iter()
        .map(|(position, row)| {
            let (location_found, pattern, annotation) = row.split();
            let (location, pattern, pattern_type) = refine_header(&location_found, &pattern);
            let location = location.parse::<Location>().map_err(|e| {
                RegistryError::UnsupportedShape {
                    feed: "citizenlab http",
                    position: position.clone(),
                    reason: e.to_string(),
                }
            })?;
            annotated(annotation, pattern, pattern_type, location, "citizenlab http", position)
        })
        .collect()
}

/// Adapt `dns.csv`. Every row is a full match on the DNS answer.
pub fn adapt_dns(document: &str) -> Result<Vec<Fingerprint>, RegistryError> {
    read_rows::<DnsRow>(document, "citizenlab dns")?
        .into_iter()
        .map(|(position, row)| {
            let (response, annotation) = row.split();
            annotated(
                annotation,
                response,
                PatternType::Full,
                Location::Dns,
                "citizenlab dns",
                position,
            )
        })
        .collect()
}

/// Split a generic `header` annotation into the concrete header it names.
///
/// A generic location that names no known header is read as
/// `header.location`.
fn refine_header(location: &str, pattern: &str) -> (String, String, PatternType) {
    if location != "header" {
        return (location.to_string(), pattern.to_string(), PatternType::Contains);
    }
    for (header_prefix, header) in [("Server: ", "server"), ("Location: ", "location")] {
        if let Some(value) = pattern.strip_prefix(header_prefix) {
            return (format!("header.{header}"), value.to_string(), PatternType::Prefix);
        }
    }
    ("header.location".to_string(), pattern.to_string(), PatternType::Contains)
}

fn read_rows<T: DeserializeOwned>(
    document: &str,
    feed: &'static str,
) -> Result<Vec<(String, T)>, RegistryError> {
    let mut reader = csv::Reader::from_reader(document.as_bytes());
    reader
        .deserialize::<T>()
        .enumerate()
        .map(|(idx, row)| {
            let position = format!("row {}", idx + 1);
            row.map(|row| (position.clone(), row))
                .map_err(|e| RegistryError::UnsupportedShape {
                    feed,
                    position,
                    reason: e.to_string(),
                })
        })
        .collect()
}

fn annotated(
    annotation: Annotation,
    pattern: String,
    pattern_type: PatternType,
    location: Location,
    feed: &'static str,
    position: String,
) -> Result<Fingerprint, RegistryError> {
    if pattern.is_empty() {
        return Err(RegistryError::UnsupportedShape {
            feed,
            position,
            reason: "empty pattern".into(),
        });
    }

    let field = |what: &str, err: RegistryError| RegistryError::UnsupportedShape {
        feed,
        position: position.clone(),
        reason: format!("{what}: {err}"),
    };

    let confidence_no_fp = match annotation.confidence_no_fp.trim() {
        "" => DEFAULT_CONFIDENCE,
        raw => raw
            .parse::<u8>()
            .ok()
            .filter(|value| CONFIDENCE_RANGE.contains(value))
            .ok_or_else(|| {
                field(
                    "confidence_no_fp",
                    RegistryError::InvalidField(format!("'{raw}' is not an integer from 1 to 5")),
                )
            })?,
    };
    let scope = Scope::parse_optional(&annotation.scope).map_err(|e| field("scope", e))?;
    let mut source = pyliteral::parse_str_list(&annotation.source).map_err(|e| field("source", e))?;
    source.sort();
    source.dedup();
    let countries = pyliteral::parse_str_list(&annotation.expected_countries)
        .map_err(|e| field("expected_countries", e))?;

    let mut fp = Fingerprint::new(
        format!("{NAME_PREFIX}{}", annotation.name),
        pattern,
        pattern_type,
        location,
    )
    .with_scope(scope)
    .with_countries(countries);
    fp.source = source;
    fp.confidence_no_fp = confidence_no_fp;
    fp.exp_url = annotation.exp_url;
    fp.notes = annotation.notes;
    Ok(fp)
}
