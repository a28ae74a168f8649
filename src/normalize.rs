//! Entity Name Normalizer
//!
//! Canonicalizes user-supplied entity names into the identity used for
//! request URLs and cache keys. Every function here is pure.

use crate::entity::EntityKind;

/// Characters that are percent-encoded in URL identities.
const RESERVED: &[char] = &['\'', '"', '#', '%', '&', '+', '/', '?', '<', '>', '\\'];

// == Normalize ==
/// Canonical display form of an entity name.
///
/// Trims, collapses whitespace runs to one space and upper-cases the first
/// alphabetic character of every word. The rest of each word is left as
/// written so names like `LeBlanc` or `Kai'Sa` keep their casing.
///
/// Idempotent: `normalize(&normalize(s)) == normalize(s)`.
pub fn normalize(raw: &str) -> String {
    raw.split_whitespace()
        .map(title_case_word)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case_word(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    let mut seen_alpha = false;
    for c in word.chars() {
        if !seen_alpha && c.is_alphabetic() {
            seen_alpha = true;
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

// == URL Identity ==
/// Path segment used when building the request URL for an entity.
///
/// Spaces become `_`, reserved characters are percent-encoded and anything
/// else (including non-ASCII letters) passes through.
pub fn url_identity(raw: &str) -> String {
    let mut out = String::new();
    for c in normalize(raw).chars() {
        if c == ' ' {
            out.push('_');
        } else if RESERVED.contains(&c) || c.is_ascii_control() {
            out.push_str(&format!("%{:02X}", c as u32));
        } else {
            out.push(c);
        }
    }
    out
}

// == Cache Key ==
/// Deterministic, filesystem-safe key for an entity of the given kind.
///
/// The normalized name is lowercased; ASCII letters and digits are kept,
/// spaces become `_` and every other character is written as `-xx` per
/// UTF-8 byte. `_` and `-` never appear unescaped, so distinct lowercased
/// names always get distinct keys: `Kai'Sa` becomes `champion_kai-27sa`
/// while `Kai Sa` becomes `champion_kai_sa`.
pub fn cache_key(kind: EntityKind, raw: &str) -> String {
    format!("{}_{}", kind, slug(raw))
}

fn slug(raw: &str) -> String {
    let mut out = String::new();
    let mut buf = [0u8; 4];
    for c in normalize(raw).to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            out.push(c);
        } else if c == ' ' {
            out.push('_');
        } else {
            for byte in c.encode_utf8(&mut buf).bytes() {
                out.push_str(&format!("-{:02x}", byte));
            }
        }
    }
    out
}
