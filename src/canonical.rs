// SPDX-License-Identifier: EUPL-1.2
// Copyright (c) 2026 Benjamin Küttner <benjamin.kuettner@icloud.com>
// Patent Pending — DE Gebrauchsmuster, filed 2026-02-23

//! Pattern canonicalization.
//!
//! Feeds publish patterns with regex-style backslash escaping even when the
//! pattern is meant literally. The only regex construct actually in use is
//! `.*`, so its presence marks a real expression; anything else is unescaped
//! into the literal string it denotes.

use crate::models::PatternType;

/// Characters a feed may escape with a backslash.
pub const ESCAPABLE: &[char] = &[
    '(', ')', '[', ']', '{', '}', '?', '*', '+', '-', '|', '^', '$', '\\', '.', '#', ' ', '\t',
    '\n', '\r', '\u{0b}', '\u{0c}', '\'', '"',
];

/// Marker of a genuine regular expression.
pub const WILDCARD: &str = ".*";

pub fn is_regexp(raw: &str) -> bool {
    raw.contains(WILDCARD)
}

/// Replace every `\<c>` with `<c>` for `c` in [`ESCAPABLE`].
///
/// Single left-to-right pass: an escaped backslash is consumed together with
/// its escape, so `\\(` yields `\(`. Other backslashes are kept as-is.
pub fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next) = chars.peek() {
                if ESCAPABLE.contains(&next) {
                    out.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        out.push(c);
    }
    out
}

/// Canonical form of a raw pattern and the type it implies.
///
/// Regular expressions come back verbatim as [`PatternType::Regexp`];
/// everything else is unescaped and typed `default_type`.
pub fn canonicalize(raw: &str, default_type: PatternType) -> (String, PatternType) {
    if is_regexp(raw) {
        (raw.to_string(), PatternType::Regexp)
    } else {
        (unescape(raw), default_type)
    }
}
