//! Extraction
//!
//! Flattens fetched wiki HTML into labelled text lines and runs each entity
//! kind's stat alias table through the formula parser.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::entity::EntityKind;
use crate::formula::{parse_all, StatFormula};

static SCRIPTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<!--.*?-->|<script\b.*?</script\s*>|<style\b.*?</style\s*>").unwrap()
});

static BLOCK_TAGS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<\s*/?\s*(?:br|p|div|tr|td|th|li|dt|dd|h[1-6]|table|section|aside)\b[^>]*>")
        .unwrap()
});

static TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

const ENTITIES: &[(&str, &str)] = &[
    ("&nbsp;", " "),
    ("&#160;", " "),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&#039;", "'"),
    ("&times;", "×"),
    ("&sup2;", "²"),
    // Last so "&amp;lt;" decodes to "&lt;" and not "<"
    ("&amp;", "&"),
];

// == Document Text ==
/// Plain text of an HTML document, one block per line.
///
/// Scripts, styles and comments are dropped; block-level tags become line
/// breaks; inline tags become spaces so labels never fuse with values.
pub fn document_text(document: &[u8]) -> String {
    let html = String::from_utf8_lossy(document);
    let html = SCRIPTS.replace_all(&html, " ");
    let html = BLOCK_TAGS.replace_all(&html, "\n");
    let html = TAGS.replace_all(&html, " ");

    let mut text = html.into_owned();
    for (entity, replacement) in ENTITIES {
        if text.contains(entity) {
            text = text.replace(entity, replacement);
        }
    }

    text.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

// == Stat Formulas ==
/// Every stat of `kind` found in `text`, keyed by stat name.
///
/// Stats with no match are absent. Dual-form entities yield several formulas
/// for one stat.
pub fn stat_formulas(kind: EntityKind, text: &str) -> BTreeMap<String, Vec<StatFormula>> {
    let mut formulas = BTreeMap::new();
    for (stat, aliases) in kind.stat_aliases() {
        let forms = parse_all(text, aliases);
        if !forms.is_empty() {
            formulas.insert(stat.to_string(), forms);
        }
    }
    debug!(%kind, stats = formulas.len(), "Extracted stat formulas");
    formulas
}
