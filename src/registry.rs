// SPDX-License-Identifier: EUPL-1.2
// Copyright (c) 2026 Benjamin Küttner <benjamin.kuettner@icloud.com>
// Patent Pending — DE Gebrauchsmuster, filed 2026-02-23

//! In-memory fingerprint registry and the merge engine.
//!
//! Records are matched on `(location_found, pattern)`. A match never
//! replaces what is already curated: empty single-valued fields are filled
//! from the candidate, multi-valued fields accumulate.

use std::collections::HashSet;

use crate::models::Fingerprint;

/// What [`Registry::upsert`] did with a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Added,
    /// Merged into an existing record.
    Merged,
}

/// Ordered collection of fingerprints, owned by a single run.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Registry {
    records: Vec<Fingerprint>,
}

impl Registry {
    pub fn new(records: Vec<Fingerprint>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[Fingerprint] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Index of the first record with the same identity as `candidate`.
    ///
    /// `pattern_type` is not part of the identity: a `prefix` and a
    /// `contains` record on the same location and pattern are the same
    /// fingerprint. The published dataset has always been merged this way.
    pub fn find(&self, candidate: &Fingerprint) -> Option<usize> {
        self.records.iter().position(|existing| {
            existing.location_found == candidate.location_found
                && existing.pattern == candidate.pattern
        })
    }

    /// Merge `candidate` into its matching record, or append it.
    pub fn upsert(&mut self, candidate: Fingerprint) -> Upsert {
        let Some(idx) = self.find(&candidate) else {
            tracing::info!(
                "Adding new fingerprint {} ({} {})",
                candidate.name,
                candidate.location_found,
                candidate.pattern_type
            );
            self.records.push(candidate);
            return Upsert::Added;
        };

        let existing = &mut self.records[idx];
        if existing.scope.is_none() && candidate.scope.is_some() {
            existing.scope = candidate.scope;
        }
        if existing.exp_url.is_empty() && !candidate.exp_url.is_empty() {
            existing.exp_url = candidate.exp_url;
        }
        if existing.notes.is_empty() && !candidate.notes.is_empty() {
            existing.notes = candidate.notes;
        }
        if existing.name != candidate.name {
            existing.other_names.insert(candidate.name.clone());
        }
        // An empty candidate set never narrows an established constraint.
        existing
            .expected_countries
            .extend(candidate.expected_countries);

        tracing::debug!(
            "Found existing fingerprint {} for candidate {}",
            existing.name,
            candidate.name
        );
        Upsert::Merged
    }

    /// Names carried by more than one record, each reported once, in the
    /// order their second occurrence appears.
    ///
    /// Duplicates are logged as warnings and left in place.
    pub fn finalize(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut reported = HashSet::new();
        let mut duplicates = Vec::new();
        for fp in &self.records {
            if !seen.insert(fp.name.as_str()) && reported.insert(fp.name.as_str()) {
                tracing::warn!("Duplicate fingerprint with ID {}", fp.name);
                duplicates.push(fp.name.clone());
            }
        }
        duplicates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{strategies, Location, PatternType, Scope};
    use proptest::prelude::*;

    fn body(name: &str, pattern: &str) -> Fingerprint {
        Fingerprint::new(name, pattern, PatternType::Contains, Location::Body)
    }

    #[test]
    fn new_identity_is_appended() {
        let mut reg = Registry::default();
        assert_eq!(reg.upsert(body("a", "x")), Upsert::Added);
        assert_eq!(reg.upsert(body("b", "y")), Upsert::Added);
        let mut other_place = body("c", "x");
        other_place.location_found = Location::header("location");
        assert_eq!(reg.upsert(other_place), Upsert::Added);
        assert_eq!(reg.len(), 3);
    }

    #[test]
    fn empty_scope_is_filled_once() {
        let mut reg = Registry::new(vec![body("cl.a", "blocked")]);
        let candidate = body("ooni.ir_0", "blocked").with_scope(Some(Scope::Isp));
        assert_eq!(reg.upsert(candidate), Upsert::Merged);
        assert_eq!(reg.records()[0].scope, Some(Scope::Isp));

        reg.upsert(body("ooni.ir_0", "blocked").with_scope(Some(Scope::Nat)));
        assert_eq!(reg.records()[0].scope, Some(Scope::Isp));
    }

    #[test]
    fn curated_text_fields_are_never_overwritten() {
        let mut existing = body("cl.a", "blocked");
        existing.notes = "manually curated".into();
        let mut reg = Registry::new(vec![existing]);

        let mut candidate = body("cp.a", "blocked");
        candidate.notes = "feed note".into();
        candidate.exp_url = "https://example.org/why".into();
        reg.upsert(candidate);

        let merged = &reg.records()[0];
        assert_eq!(merged.notes, "manually curated");
        assert_eq!(merged.exp_url, "https://example.org/why");

        let mut later = body("cp.b", "blocked");
        later.exp_url = "https://example.org/other".into();
        reg.upsert(later);
        assert_eq!(reg.records()[0].exp_url, "https://example.org/why");
    }

    #[test]
    fn identity_ignores_pattern_type_and_keeps_existing_type() {
        let mut reg = Registry::new(vec![body("cl.a", "blocked")]);
        let mut candidate = body("cp.a", "blocked");
        candidate.pattern_type = PatternType::Full;
        assert_eq!(reg.upsert(candidate), Upsert::Merged);
        assert_eq!(reg.records()[0].pattern_type, PatternType::Contains);
    }

    #[test]
    fn other_names_collect_sorted_and_unique() {
        let mut reg = Registry::new(vec![body("cl.a", "blocked")]);
        reg.upsert(body("ooni.ru_2", "blocked"));
        reg.upsert(body("cp.z", "blocked"));
        reg.upsert(body("cp.z", "blocked"));
        reg.upsert(body("cl.a", "blocked"));
        let names: Vec<_> = reg.records()[0].other_names.iter().cloned().collect();
        assert_eq!(names, vec!["cp.z".to_string(), "ooni.ru_2".to_string()]);
    }

    #[test]
    fn countries_union_and_empty_candidate_keeps_set() {
        let mut reg = Registry::new(vec![body("cl.a", "blocked").with_countries(["RU"])]);
        reg.upsert(body("ooni.ir_0", "blocked").with_countries(["IR", "RU"]));
        reg.upsert(body("cp.a", "blocked"));
        let countries: Vec<_> = reg.records()[0].expected_countries.iter().cloned().collect();
        assert_eq!(countries, vec!["IR".to_string(), "RU".to_string()]);
    }

    #[test]
    fn first_match_in_insertion_order_wins() {
        // Two records can share an identity when loaded from a hand-edited file.
        let mut reg = Registry::new(vec![body("first", "x"), body("second", "x")]);
        assert_eq!(reg.upsert(body("third", "x")), Upsert::Merged);
        assert!(reg.records()[0].other_names.contains("third"));
        assert!(reg.records()[1].other_names.is_empty());
    }

    #[test]
    fn upsert_is_idempotent() {
        let seed = vec![body("cl.a", "blocked"), body("cl.b", "denied")];
        let candidate = body("ooni.tr_1", "blocked")
            .with_scope(Some(Scope::Nat))
            .with_countries(["TR"]);
        let fresh = body("cp.new", "forbidden").with_scope(Some(Scope::Fp));

        let mut once = Registry::new(seed.clone());
        once.upsert(candidate.clone());
        once.upsert(fresh.clone());

        let mut twice = once.clone();
        twice.upsert(candidate);
        twice.upsert(fresh);

        assert_eq!(once, twice);
    }

    /// Fingerprints over a small identity pool so merges actually happen.
    fn pooled() -> impl Strategy<Value = Fingerprint> {
        strategies::fingerprint_with(
            prop::sample::select(vec![
                Location::Body,
                Location::Dns,
                Location::header("location"),
            ]),
            prop::sample::select(vec![
                "blocked".to_string(),
                "denied".to_string(),
                "1.2.3.4".to_string(),
            ]),
        )
    }

    proptest! {
        #[test]
        fn replaying_candidates_changes_nothing(
            seed in prop::collection::vec(pooled(), 0..4),
            candidates in prop::collection::vec(pooled(), 0..8),
        ) {
            let mut once = Registry::new(seed);
            for candidate in candidates.clone() {
                once.upsert(candidate);
            }
            let mut twice = once.clone();
            for candidate in candidates {
                twice.upsert(candidate);
            }
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn merge_fills_forward_and_never_shrinks(existing in pooled(), candidate in pooled()) {
            let mut candidate = candidate;
            candidate.location_found = existing.location_found.clone();
            candidate.pattern = existing.pattern.clone();

            let mut reg = Registry::new(vec![existing.clone()]);
            prop_assert_eq!(reg.upsert(candidate.clone()), Upsert::Merged);
            let merged = &reg.records()[0];

            prop_assert_eq!(&merged.name, &existing.name);
            prop_assert_eq!(merged.pattern_type, existing.pattern_type);
            prop_assert_eq!(merged.confidence_no_fp, existing.confidence_no_fp);
            prop_assert_eq!(&merged.source, &existing.source);
            prop_assert_eq!(merged.scope, existing.scope.or(candidate.scope));
            let filled = |kept: &str, offered: &str| {
                if kept.is_empty() { offered.to_string() } else { kept.to_string() }
            };
            prop_assert_eq!(&merged.notes, &filled(&existing.notes, &candidate.notes));
            prop_assert_eq!(&merged.exp_url, &filled(&existing.exp_url, &candidate.exp_url));
            prop_assert!(merged.expected_countries.is_superset(&existing.expected_countries));
            prop_assert!(merged.expected_countries.is_superset(&candidate.expected_countries));
            prop_assert!(merged.other_names.is_superset(&existing.other_names));
            prop_assert_eq!(
                merged.other_names.contains(&candidate.name),
                candidate.name != existing.name || existing.other_names.contains(&candidate.name)
            );
        }
    }

    #[test]
    fn finalize_reports_each_duplicate_once() {
        let mut dns = body("ooni.it_0", "1.2.3.4");
        dns.location_found = Location::Dns;
        let reg = Registry::new(vec![
            body("ooni.it_0", "a"),
            dns,
            body("cl.x", "b"),
            body("ooni.it_0", "c"),
        ]);
        assert_eq!(reg.finalize(), vec!["ooni.it_0".to_string()]);
        assert_eq!(reg.len(), 4);
    }
}
