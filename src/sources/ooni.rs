// SPDX-License-Identifier: EUPL-1.2
// Copyright (c) 2026 Benjamin Küttner <benjamin.kuettner@icloud.com>
// Patent Pending — DE Gebrauchsmuster, filed 2026-02-23

//! OONI fastpath fingerprints.
//!
//! The table is the `fingerprints = {...}` literal inside the fastpath
//! `utils.py` module, keyed by country code:
//!
//! ```text
//! fingerprints = {
//!     "IR": [
//!         {"body_match": "iframe src=\"http://10.10", "locality": "country"},
//!         {"header_name": "Server", "header_prefix": "Kerio Control", "locality": "local"},
//!         {"dns_full": "10.10.34.34", "locality": "country"},
//!     ],
//! }
//! ```

use serde::Deserialize;

use crate::error::RegistryError;
use crate::models::{Fingerprint, Location, PatternType, Scope};
use crate::pyliteral;

pub const SOURCE_TAG: &str = "ooni";

/// Name of the assignment holding the table in `utils.py`.
const TABLE_NAME: &str = "fingerprints";

/// OONI's blocking locality, from widest to narrowest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locality {
    Global,
    Country,
    Isp,
    Local,
}

impl Locality {
    pub fn scope(self) -> Scope {
        match self {
            Locality::Global => Scope::Vbw,
            Locality::Country => Scope::Nat,
            Locality::Isp => Scope::Isp,
            Locality::Local => Scope::Inst,
        }
    }
}

/// A descriptor as published, before its shape is checked.
#[derive(Debug, Deserialize)]
struct RawDescriptor {
    body_match: Option<String>,
    header_name: Option<String>,
    header_prefix: Option<String>,
    header_full: Option<String>,
    dns_full: Option<String>,
    locality: Locality,
}

/// The supported descriptor shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Matcher {
    Body { pattern: String },
    HeaderPrefix { header: String, pattern: String },
    HeaderFull { header: String, pattern: String },
    Dns { pattern: String },
}

impl Matcher {
    pub fn pattern(&self) -> &str {
        match self {
            Matcher::Body { pattern }
            | Matcher::HeaderPrefix { pattern, .. }
            | Matcher::HeaderFull { pattern, .. }
            | Matcher::Dns { pattern } => pattern,
        }
    }

    fn into_parts(self) -> (Location, PatternType, String) {
        match self {
            Matcher::Body { pattern } => (Location::Body, PatternType::Contains, pattern),
            Matcher::HeaderPrefix { header, pattern } => (
                Location::header(header.to_lowercase()),
                PatternType::Prefix,
                pattern,
            ),
            Matcher::HeaderFull { header, pattern } => (
                Location::header(header.to_lowercase()),
                PatternType::Full,
                pattern,
            ),
            Matcher::Dns { pattern } => (Location::Dns, PatternType::Full, pattern),
        }
    }
}

/// A checked descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    pub matcher: Matcher,
    pub locality: Locality,
}

impl TryFrom<RawDescriptor> for Descriptor {
    type Error = String;

    fn try_from(raw: RawDescriptor) -> Result<Self, Self::Error> {
        let matcher = if let Some(pattern) = raw.body_match {
            Matcher::Body { pattern }
        } else if let Some(header) = raw.header_name {
            match (raw.header_prefix, raw.header_full) {
                (Some(pattern), _) => Matcher::HeaderPrefix { header, pattern },
                (None, Some(pattern)) => Matcher::HeaderFull { header, pattern },
                (None, None) => {
                    return Err(format!(
                        "header '{header}' has neither header_prefix nor header_full"
                    ))
                }
            }
        } else if let Some(pattern) = raw.dns_full {
            Matcher::Dns { pattern }
        } else {
            return Err("none of body_match, header_name, dns_full present".into());
        };
        if matcher.pattern().is_empty() {
            return Err("empty pattern".into());
        }
        Ok(Descriptor {
            matcher,
            locality: raw.locality,
        })
    }
}

/// Adapt the `utils.py` module text.
pub fn adapt(document: &str) -> Result<Vec<Fingerprint>, RegistryError> {
    let table = pyliteral::extract_assignment(document, TABLE_NAME)?;
    adapt_table(table)
}

/// Adapt an already-parsed country table, in the table's own key order.
pub fn adapt_table(table: serde_json::Value) -> Result<Vec<Fingerprint>, RegistryError> {
    let serde_json::Value::Object(countries) = table else {
        return Err(RegistryError::UnsupportedShape {
            feed: "ooni",
            position: TABLE_NAME.into(),
            reason: "expected a dict keyed by country code".into(),
        });
    };

    let mut out = Vec::new();
    for (cc, descriptors) in countries {
        let descriptors: Vec<serde_json::Value> =
            serde_json::from_value(descriptors).map_err(|e| RegistryError::UnsupportedShape {
                feed: "ooni",
                position: cc.clone(),
                reason: e.to_string(),
            })?;
        for (idx, descriptor) in descriptors.into_iter().enumerate() {
            let name = format!("ooni.{}_{idx}", cc.to_lowercase());
            let unsupported = |reason: String| RegistryError::UnsupportedShape {
                feed: "ooni",
                position: name.clone(),
                reason,
            };
            let raw: RawDescriptor =
                serde_json::from_value(descriptor).map_err(|e| unsupported(e.to_string()))?;
            let Descriptor { matcher, locality } =
                Descriptor::try_from(raw).map_err(unsupported)?;
            let (location, pattern_type, pattern) = matcher.into_parts();

            out.push(
                Fingerprint::new(name, pattern, pattern_type, location)
                    .with_source(SOURCE_TAG)
                    .with_scope(Some(locality.scope()))
                    .with_countries([cc.clone()]),
            );
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const UTILS_PY: &str = r#"
import re

# Fingerprints used by the fastpath
fingerprints = {
    "IR": [
        {"body_match": "iframe src=\"http://10.10", "locality": "country"},
        {"header_name": "Server", "header_prefix": "Kerio Control", "locality": "local"},
    ],
    "IT": [
        {"dns_full": "195.120.177.186", "locality": "country"},
        {
            "header_name": "X-Blocked",
            "header_full": "yes",
            "locality": "isp",
        },
    ],
}

def unrelated():
    return {"x": 1}
"#;

    #[test]
    fn adapts_every_descriptor_shape() {
        let fps = adapt(UTILS_PY).unwrap();
        assert_eq!(fps.len(), 4);

        assert_eq!(fps[0].name, "ooni.ir_0");
        assert_eq!(fps[0].location_found, Location::Body);
        assert_eq!(fps[0].pattern_type, PatternType::Contains);
        assert_eq!(fps[0].pattern, "iframe src=\"http://10.10");
        assert_eq!(fps[0].scope, Some(Scope::Nat));
        assert!(fps[0].expected_countries.contains("IR"));

        assert_eq!(fps[1].name, "ooni.ir_1");
        assert_eq!(fps[1].location_found, Location::header("server"));
        assert_eq!(fps[1].pattern_type, PatternType::Prefix);
        assert_eq!(fps[1].scope, Some(Scope::Inst));

        assert_eq!(fps[2].name, "ooni.it_0");
        assert_eq!(fps[2].location_found, Location::Dns);
        assert_eq!(fps[2].pattern_type, PatternType::Full);

        assert_eq!(fps[3].location_found, Location::header("x-blocked"));
        assert_eq!(fps[3].pattern_type, PatternType::Full);
        assert_eq!(fps[3].scope, Some(Scope::Isp));
        assert_eq!(fps[3].source, vec![SOURCE_TAG.to_string()]);
    }

    #[test]
    fn locality_table_is_exhaustive() {
        assert_eq!(Locality::Global.scope(), Scope::Vbw);
        assert_eq!(Locality::Country.scope(), Scope::Nat);
        assert_eq!(Locality::Isp.scope(), Scope::Isp);
        assert_eq!(Locality::Local.scope(), Scope::Inst);
    }

    #[test]
    fn header_without_position_is_fatal() {
        let table = json!({"RU": [{"header_name": "Server", "locality": "isp"}]});
        let err = adapt_table(table).unwrap_err();
        assert!(matches!(err, RegistryError::UnsupportedShape { ref position, .. } if position == "ooni.ru_0"));
    }

    #[test]
    fn descriptor_without_known_key_is_fatal() {
        let table = json!({"RU": [{"body_match": "ok", "locality": "isp"}, {"locality": "isp"}]});
        let err = adapt_table(table).unwrap_err();
        assert!(err.to_string().contains("ooni.ru_1"), "{err}");
    }

    #[test]
    fn empty_pattern_is_fatal() {
        let table = json!({"IT": [{"dns_full": "", "locality": "country"}]});
        let err = adapt_table(table).unwrap_err();
        assert!(err.to_string().contains("ooni.it_0"), "{err}");

        let table = json!({"RU": [{"body_match": "", "locality": "isp"}]});
        assert!(adapt_table(table).is_err());
    }

    #[test]
    fn unknown_locality_is_fatal() {
        let table = json!({"RU": [{"body_match": "ok", "locality": "planet"}]});
        assert!(adapt_table(table).is_err());
    }

    #[test]
    fn missing_table_is_an_error() {
        assert!(adapt("x = 1\n").is_err());
    }
}
