// SPDX-License-Identifier: EUPL-1.2
// Copyright (c) 2026 Benjamin Küttner <benjamin.kuettner@icloud.com>
// Patent Pending — DE Gebrauchsmuster, filed 2026-02-23

//! Censored Planet blockpage and false-positive signature feeds.
//!
//! One JSON object per line: `{"fingerprint": "...", "pattern": "..."}`.

use serde::Deserialize;

use crate::canonical;
use crate::error::RegistryError;
use crate::models::{Fingerprint, Location, PatternType, Scope};

pub const SOURCE_TAG: &str = "censored planet";

#[derive(Debug, Deserialize)]
struct Signature {
    fingerprint: String,
    pattern: String,
}

/// Adapt one signature feed. `prefix` is prepended to every fingerprint id;
/// `scope` is applied to every record (`fp` for the false-positive feed).
pub fn adapt(
    document: &str,
    prefix: &str,
    scope: Option<Scope>,
) -> Result<Vec<Fingerprint>, RegistryError> {
    let mut out = Vec::new();
    for (line_no, line) in document.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let unsupported = |reason: String| RegistryError::UnsupportedShape {
            feed: "censored planet",
            position: format!("line {}", line_no + 1),
            reason,
        };
        let sig: Signature = serde_json::from_str(line).map_err(|e| unsupported(e.to_string()))?;
        let records = signature_records(sig, prefix, scope);
        if let Some(fp) = records.iter().find(|fp| fp.pattern.is_empty()) {
            return Err(unsupported(format!("empty pattern for {}", fp.name)));
        }
        out.extend(records);
    }
    Ok(out)
}

fn signature_records(sig: Signature, prefix: &str, scope: Option<Scope>) -> Vec<Fingerprint> {
    let (pattern, pattern_type) = canonical::canonicalize(&sig.pattern, PatternType::Contains);
    let name = format!("{prefix}{}", sig.fingerprint);
    let record = |name: String, pattern: &str, pattern_type, location| {
        Fingerprint::new(name, pattern, pattern_type, location)
            .with_source(SOURCE_TAG)
            .with_scope(scope)
    };

    // An echoed URL may land in the body or in a redirect.
    if pattern.starts_with("http://") || pattern.starts_with("https://") {
        return vec![
            record(format!("{name}_body"), &pattern, PatternType::Contains, Location::Body),
            record(
                format!("{name}_location"),
                &pattern,
                PatternType::Prefix,
                Location::header("location"),
            ),
        ];
    }

    // Both header prefixes land on header.location. The Server branch
    // probably wants header.server; kept until the dataset owners decide.
    for header_prefix in ["Location: ", "Server: "] {
        if let Some(value) = pattern.strip_prefix(header_prefix) {
            return vec![record(
                name,
                value,
                PatternType::Prefix,
                Location::header("location"),
            )];
        }
    }

    vec![record(name, &pattern, pattern_type, Location::Body)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_pattern_yields_body_and_location_records() {
        let doc = r#"{"fingerprint": "example_block", "pattern": "http://example.com/block"}"#;
        let fps = adapt(doc, "cp.", None).unwrap();
        assert_eq!(fps.len(), 2);

        assert_eq!(fps[0].name, "cp.example_block_body");
        assert_eq!(fps[0].location_found, Location::Body);
        assert_eq!(fps[0].pattern_type, PatternType::Contains);
        assert_eq!(fps[0].pattern, "http://example.com/block");

        assert_eq!(fps[1].name, "cp.example_block_location");
        assert_eq!(fps[1].location_found, Location::header("location"));
        assert_eq!(fps[1].pattern_type, PatternType::Prefix);
        assert_eq!(fps[1].source, vec![SOURCE_TAG.to_string()]);
    }

    #[test]
    fn https_and_wildcard_urls_still_split_into_body_and_location() {
        let doc = concat!(
            r#"{"fingerprint": "tls", "pattern": "https://warning.example/"}"#,
            "\n",
            r#"{"fingerprint": "any", "pattern": "http://block.example/.*"}"#,
        );
        let fps = adapt(doc, "cp.", None).unwrap();
        assert_eq!(fps.len(), 4);
        assert_eq!(fps[0].name, "cp.tls_body");
        assert_eq!(fps[1].name, "cp.tls_location");
        assert_eq!(fps[1].pattern, "https://warning.example/");

        // The wildcard text is kept verbatim but typed for the URL split.
        assert_eq!(fps[2].name, "cp.any_body");
        assert_eq!(fps[2].pattern, "http://block.example/.*");
        assert_eq!(fps[2].pattern_type, PatternType::Contains);
        assert_eq!(fps[3].pattern, "http://block.example/.*");
        assert_eq!(fps[3].pattern_type, PatternType::Prefix);
        assert_eq!(fps[3].location_found, Location::header("location"));
    }

    #[test]
    fn empty_patterns_are_fatal() {
        let doc = r#"{"fingerprint": "bare_loc", "pattern": "Location: "}"#;
        let err = adapt(doc, "cp.", None).unwrap_err();
        assert!(
            matches!(err, RegistryError::UnsupportedShape { ref position, .. } if position == "line 1"),
            "{err}"
        );

        let doc = "{\"fingerprint\": \"ok\", \"pattern\": \"x\"}\n{\"fingerprint\": \"empty\", \"pattern\": \"\"}";
        let err = adapt(doc, "cp.", None).unwrap_err();
        assert!(err.to_string().contains("cp.empty"), "{err}");
    }

    #[test]
    fn escaped_body_pattern_is_unescaped() {
        let doc = r#"{"fingerprint": "a_ru", "pattern": "src=\\\"http://www.ferra.ru/images/416/416695.jpeg\\\""}"#;
        let fps = adapt(doc, "cp.", None).unwrap();
        assert_eq!(fps.len(), 1);
        assert_eq!(fps[0].pattern, r#"src="http://www.ferra.ru/images/416/416695.jpeg""#);
        assert_eq!(fps[0].pattern_type, PatternType::Contains);
        assert_eq!(fps[0].location_found, Location::Body);
    }

    #[test]
    fn wildcard_pattern_stays_regexp() {
        let doc = r#"{"fingerprint": "b_any", "pattern": "blocked\\ by.*policy"}"#;
        let fps = adapt(doc, "cp.", None).unwrap();
        assert_eq!(fps[0].pattern, r"blocked\ by.*policy");
        assert_eq!(fps[0].pattern_type, PatternType::Regexp);
    }

    #[test]
    fn header_prefixes_are_stripped_onto_location_header() {
        let doc = concat!(
            r#"{"fingerprint": "loc", "pattern": "Location: http://blocked.example"}"#,
            "\n",
            r#"{"fingerprint": "srv", "pattern": "Server: Squid"}"#,
        );
        let fps = adapt(doc, "cp.", None).unwrap();
        assert_eq!(fps.len(), 2);
        assert_eq!(fps[0].pattern, "http://blocked.example");
        assert_eq!(fps[1].name, "cp.srv");
        assert_eq!(fps[1].pattern, "Squid");
        for fp in &fps {
            assert_eq!(fp.pattern_type, PatternType::Prefix);
            assert_eq!(fp.location_found, Location::header("location"));
        }
    }

    #[test]
    fn false_positive_feed_carries_scope_and_skips_blank_lines() {
        let doc = "\n{\"fingerprint\": \"cdn\", \"pattern\": \"cloudflare\"}\n\n";
        let fps = adapt(doc, "cp.fp_", Some(Scope::Fp)).unwrap();
        assert_eq!(fps.len(), 1);
        assert_eq!(fps[0].name, "cp.fp_cdn");
        assert_eq!(fps[0].scope, Some(Scope::Fp));
    }

    #[test]
    fn malformed_line_is_fatal() {
        let doc = "{\"fingerprint\": \"ok\", \"pattern\": \"x\"}\n{\"pattern\": \"no id\"}";
        let err = adapt(doc, "cp.", None).unwrap_err();
        assert!(err.to_string().contains("line 2"), "{err}");
    }
}
