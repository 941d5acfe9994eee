// SPDX-License-Identifier: EUPL-1.2
// Copyright (c) 2026 Benjamin Küttner <benjamin.kuettner@icloud.com>
// Patent Pending — DE Gebrauchsmuster, filed 2026-02-23

//! Domain models for the fingerprint registry.

use std::collections::BTreeSet;
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use crate::error::RegistryError;

/// Confidence assigned when a feed does not carry one.
pub const DEFAULT_CONFIDENCE: u8 = 5;

/// Accepted `confidence_no_fp` values.
pub const CONFIDENCE_RANGE: RangeInclusive<u8> = 1..=5;

/// Wildcard accepted in `expected_countries` alongside real country codes.
pub const ANY_COUNTRY: &str = "ZZ";

/// ISO-3166 alpha-2 codes accepted in `expected_countries`. Sorted.
pub const COUNTRY_CODES: &[&str] = &[
    "AD", "AE", "AF", "AG", "AI", "AL", "AM", "AO", "AQ", "AR", "AS", "AT",
    "AU", "AW", "AX", "AZ", "BA", "BB", "BD", "BE", "BF", "BG", "BH", "BI",
    "BJ", "BL", "BM", "BN", "BO", "BQ", "BR", "BS", "BT", "BV", "BW", "BY",
    "BZ", "CA", "CC", "CD", "CF", "CG", "CH", "CI", "CK", "CL", "CM", "CN",
    "CO", "CR", "CU", "CV", "CW", "CX", "CY", "CZ", "DE", "DJ", "DK", "DM",
    "DO", "DZ", "EC", "EE", "EG", "EH", "ER", "ES", "ET", "FI", "FJ", "FK",
    "FM", "FO", "FR", "GA", "GB", "GD", "GE", "GF", "GG", "GH", "GI", "GL",
    "GM", "GN", "GP", "GQ", "GR", "GS", "GT", "GU", "GW", "GY", "HK", "HM",
    "HN", "HR", "HT", "HU", "ID", "IE", "IL", "IM", "IN", "IO", "IQ", "IR",
    "IS", "IT", "JE", "JM", "JO", "JP", "KE", "KG", "KH", "KI", "KM", "KN",
    "KP", "KR", "KW", "KY", "KZ", "LA", "LB", "LC", "LI", "LK", "LR", "LS",
    "LT", "LU", "LV", "LY", "MA", "MC", "MD", "ME", "MF", "MG", "MH", "MK",
    "ML", "MM", "MN", "MO", "MP", "MQ", "MR", "MS", "MT", "MU", "MV", "MW",
    "MX", "MY", "MZ", "NA", "NC", "NE", "NF", "NG", "NI", "NL", "NO", "NP",
    "NR", "NU", "NZ", "OM", "PA", "PE", "PF", "PG", "PH", "PK", "PL", "PM",
    "PN", "PR", "PS", "PT", "PW", "PY", "QA", "RE", "RO", "RS", "RU", "RW",
    "SA", "SB", "SC", "SD", "SE", "SG", "SH", "SI", "SJ", "SK", "SL", "SM",
    "SN", "SO", "SR", "SS", "ST", "SV", "SX", "SY", "SZ", "TC", "TD", "TF",
    "TG", "TH", "TJ", "TK", "TL", "TM", "TN", "TO", "TR", "TT", "TV", "TW",
    "TZ", "UA", "UG", "UM", "US", "UY", "UZ", "VA", "VC", "VE", "VG", "VI",
    "VN", "VU", "WF", "WS", "YE", "YT", "ZA", "ZM", "ZW",
];

/// `true` for a known alpha-2 code or the `ZZ` wildcard.
pub fn is_valid_country(cc: &str) -> bool {
    cc == ANY_COUNTRY || COUNTRY_CODES.binary_search(&cc).is_ok()
}

/// How a pattern is matched against the observed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternType {
    Full,
    Prefix,
    Contains,
    Regexp,
}

impl PatternType {
    pub const ALL: [PatternType; 4] = [
        PatternType::Full,
        PatternType::Prefix,
        PatternType::Contains,
        PatternType::Regexp,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PatternType::Full => "full",
            PatternType::Prefix => "prefix",
            PatternType::Contains => "contains",
            PatternType::Regexp => "regexp",
        }
    }
}

impl fmt::Display for PatternType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PatternType {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PatternType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| RegistryError::InvalidField(format!("Invalid pattern_type '{s}'")))
    }
}

/// Where in the observed response a pattern is searched.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Location {
    Body,
    Dns,
    /// `header.<name>`; the name is stored without the `header.` prefix.
    Header(String),
}

impl Location {
    pub fn header(name: impl Into<String>) -> Self {
        Location::Header(name.into())
    }

    pub fn is_dns(&self) -> bool {
        matches!(self, Location::Dns)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Body => f.write_str("body"),
            Location::Dns => f.write_str("dns"),
            Location::Header(name) => write!(f, "header.{name}"),
        }
    }
}

impl FromStr for Location {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "body" => Ok(Location::Body),
            "dns" => Ok(Location::Dns),
            _ => match s.strip_prefix("header.") {
                Some(name) if !name.is_empty() => Ok(Location::Header(name.to_string())),
                _ => Err(RegistryError::InvalidField(format!("Invalid location '{s}'"))),
            },
        }
    }
}

/// Blocking locality or purpose of a fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// ISP level blockpage
    Isp,
    /// National level blockpage
    Nat,
    /// Pattern tied to a middlebox product
    Prod,
    /// Voluntary institution blockpage (school, office)
    Inst,
    /// Vague blocking word
    Vbw,
    /// Known false positive
    Fp,
    Injb,
    Prov,
}

impl Scope {
    pub const ALL: [Scope; 8] = [
        Scope::Isp,
        Scope::Nat,
        Scope::Prod,
        Scope::Inst,
        Scope::Fp,
        Scope::Vbw,
        Scope::Injb,
        Scope::Prov,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Scope::Isp => "isp",
            Scope::Nat => "nat",
            Scope::Prod => "prod",
            Scope::Inst => "inst",
            Scope::Vbw => "vbw",
            Scope::Fp => "fp",
            Scope::Injb => "injb",
            Scope::Prov => "prov",
        }
    }

    /// Parse a possibly-empty scope cell. Empty means "not classified".
    pub fn parse_optional(s: &str) -> Result<Option<Scope>, RegistryError> {
        if s.is_empty() {
            Ok(None)
        } else {
            s.parse().map(Some)
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scope::ALL
            .into_iter()
            .find(|scope| scope.as_str() == s)
            .ok_or_else(|| RegistryError::InvalidField(format!("Invalid scope '{s}'")))
    }
}

/// One curated fingerprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    /// Source-prefixed identifier, e.g. `cl.foo` or `ooni.us_3`
    pub name: String,
    pub pattern: String,
    pub pattern_type: PatternType,
    pub location_found: Location,
    pub scope: Option<Scope>,
    /// 1 (likely false positive) to 5 (certainly a block)
    pub confidence_no_fp: u8,
    /// Provenance tags, in the order the feed listed them
    pub source: Vec<String>,
    pub expected_countries: BTreeSet<String>,
    /// Names other feeds used for the same pattern
    pub other_names: BTreeSet<String>,
    pub notes: String,
    pub exp_url: String,
}

impl Fingerprint {
    pub fn new(
        name: impl Into<String>,
        pattern: impl Into<String>,
        pattern_type: PatternType,
        location_found: Location,
    ) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.into(),
            pattern_type,
            location_found,
            scope: None,
            confidence_no_fp: DEFAULT_CONFIDENCE,
            source: Vec::new(),
            expected_countries: BTreeSet::new(),
            other_names: BTreeSet::new(),
            notes: String::new(),
            exp_url: String::new(),
        }
    }

    pub fn with_source(mut self, tag: &str) -> Self {
        push_unique(&mut self.source, tag.to_string());
        self
    }

    pub fn with_scope(mut self, scope: Option<Scope>) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_countries<I, S>(mut self, countries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.expected_countries = countries.into_iter().map(Into::into).collect();
        self
    }
}

/// Append `value` unless already present, keeping first-seen order.
pub fn push_unique(values: &mut Vec<String>, value: String) {
    if !values.contains(&value) {
        values.push(value);
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_round_trips_through_display() {
        for raw in ["body", "dns", "header.location", "header.server"] {
            let loc: Location = raw.parse().unwrap();
            assert_eq!(loc.to_string(), raw);
        }
    }

    #[test]
    fn bare_header_is_not_a_location() {
        assert!("header".parse::<Location>().is_err());
        assert!("header.".parse::<Location>().is_err());
        assert!("cookie".parse::<Location>().is_err());
    }

    #[test]
    fn scope_accepts_every_curated_value() {
        for s in ["isp", "nat", "prod", "inst", "vbw", "fp", "injb", "prov"] {
            assert_eq!(s.parse::<Scope>().unwrap().as_str(), s);
        }
        assert_eq!(Scope::parse_optional("").unwrap(), None);
        assert!(Scope::parse_optional("global").is_err());
    }

    #[test]
    fn country_table_is_sorted_and_has_wildcard() {
        assert!(COUNTRY_CODES.windows(2).all(|w| w[0] < w[1]));
        assert!(is_valid_country("IR"));
        assert!(is_valid_country("ZZ"));
        assert!(!is_valid_country("XX"));
        assert!(!is_valid_country("ir"));
    }

    #[test]
    fn new_fingerprint_defaults() {
        let fp = Fingerprint::new("cp.x", "blocked", PatternType::Contains, Location::Body)
            .with_source("ooni")
            .with_source("ooni");
        assert_eq!(fp.confidence_no_fp, DEFAULT_CONFIDENCE);
        assert_eq!(fp.source, vec!["ooni".to_string()]);
        assert!(fp.scope.is_none());
        assert!(fp.other_names.is_empty());
    }
}
