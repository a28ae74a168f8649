//! Formula Parser
//!
//! Finds stat growth expressions in extracted page text.
//!
//! A fragment is either labelled (the text right after a stat label such as
//! `Health:`) or unlabelled (text that itself starts with a number). Patterns
//! are tried in priority order, each anchored at the start of the fragment:
//!
//! 1. quadratic  `605 (+ 88 × L²)`
//! 2. linear     `645 (+ 99 × L)`
//! 3. percentage `25%`
//! 4. legacy     `340 (+25 per level)`
//! 5. bare       `550`

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use crate::formula::{GrowthShape, StatFormula};

const LEAD: &str = r"^[\s:=]*";
const NUM: &str = r"([0-9][0-9,]*(?:\.[0-9]+)*)";
const TIMES: &str = r"\s*[×x*·]\s*";
const LEVEL: &str = r"(?:level|lvl|l)";
// Growth such as `(+ 2.5% × L)`; the coefficient is kept as written
const COEF_PCT: &str = r"(?:\s*%)?";

static QUADRATIC: Lazy<Regex> = Lazy::new(|| {
    compile(&format!(
        r"(?i){LEAD}{NUM}\s*\(\s*\+\s*{NUM}{COEF_PCT}{TIMES}{LEVEL}\s*(?:²|\^\s*2|2)\s*\)"
    ))
});

static LINEAR: Lazy<Regex> = Lazy::new(|| {
    compile(&format!(
        r"(?i){LEAD}{NUM}\s*\(\s*\+\s*{NUM}{COEF_PCT}{TIMES}{LEVEL}\s*\)"
    ))
});

static PERCENTAGE: Lazy<Regex> = Lazy::new(|| compile(&format!(r"{LEAD}{NUM}\s*%")));

static LEGACY: Lazy<Regex> = Lazy::new(|| {
    compile(&format!(
        r"(?i){LEAD}{NUM}\s*\(\s*\+\s*{NUM}{COEF_PCT}\s*per\s+level\s*\)"
    ))
});

static BARE: Lazy<Regex> = Lazy::new(|| compile(&format!(r"{LEAD}{NUM}")));

/// Opening of a growth term; a bare number must not be followed by one.
static GROWTH_MARKER: Lazy<Regex> = Lazy::new(|| compile(r"^\s*\(\s*\+"));

static CAP: Lazy<Regex> = Lazy::new(|| {
    compile(&format!(
        r"(?i)^\s*\(?\s*(?:max(?:imum)?|capped\s+at)\s*:?\s*{NUM}"
    ))
});

// Patterns are constant; a failure here is a programming error caught by tests.
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid formula pattern {pattern:?}: {e}"))
}

#[derive(Clone, Copy)]
enum Pattern {
    Quadratic,
    Linear,
    Percentage,
    Legacy,
    Bare,
}

const PRIORITY: [Pattern; 5] = [
    Pattern::Quadratic,
    Pattern::Linear,
    Pattern::Percentage,
    Pattern::Legacy,
    Pattern::Bare,
];

// == Parse ==
/// Parses the first growth expression for any of `candidate_names`.
///
/// Candidates are aliases of one stat, tried in order; the first pattern that
/// matches for the first matching candidate wins. `None` means the stat is
/// absent from `text` and must not be replaced by a default.
pub fn parse(text: &str, candidate_names: &[&str]) -> Option<StatFormula> {
    let mut labelled = false;

    for name in candidate_names {
        let Some(label) = label_regex(name) else {
            continue;
        };
        for found in label.find_iter(text) {
            labelled = true;
            if let Some(formula) = parse_fragment(&text[found.end()..]) {
                return Some(formula);
            }
        }
    }

    if !labelled && !candidate_names.is_empty() && starts_with_digit(text) {
        return parse_fragment(text);
    }

    None
}

// == Parse All ==
/// Parses every labelled occurrence, in text order.
///
/// Dual-form entities list the same stat twice; each occurrence yields its
/// own formula. Unlabelled text yields at most one.
pub fn parse_all(text: &str, candidate_names: &[&str]) -> Vec<StatFormula> {
    let mut found_at = std::collections::BTreeMap::new();

    for name in candidate_names {
        let Some(label) = label_regex(name) else {
            continue;
        };
        for found in label.find_iter(text) {
            // Nested aliases ("Attack range" / "Range") end at the same place
            if found_at.contains_key(&found.end()) {
                continue;
            }
            if let Some(formula) = parse_fragment(&text[found.end()..]) {
                found_at.insert(found.end(), formula);
            }
        }
    }

    if found_at.is_empty() && !candidate_names.is_empty() && starts_with_digit(text) {
        return parse_fragment(text).into_iter().collect();
    }

    found_at.into_values().collect()
}

fn label_regex(name: &str) -> Option<Regex> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    match Regex::new(&format!(r"(?i)\b{}\b", regex::escape(name))) {
        Ok(re) => Some(re),
        Err(e) => {
            warn!(name, error = %e, "Skipping unusable stat label");
            None
        }
    }
}

fn starts_with_digit(text: &str) -> bool {
    text.trim_start().starts_with(|c: char| c.is_ascii_digit())
}

// == Fragment Matching ==
/// Tries every pattern in priority order against the start of `fragment`.
pub fn parse_fragment(fragment: &str) -> Option<StatFormula> {
    PRIORITY
        .iter()
        .find_map(|pattern| match_pattern(*pattern, fragment))
}

fn match_pattern(pattern: Pattern, fragment: &str) -> Option<StatFormula> {
    let (caps, formula) = match pattern {
        Pattern::Quadratic => {
            let caps = QUADRATIC.captures(fragment)?;
            let formula = growth_formula(&caps, GrowthShape::Quadratic)?;
            (caps, formula)
        }
        Pattern::Linear => {
            let caps = LINEAR.captures(fragment)?;
            let formula = growth_formula(&caps, GrowthShape::Linear)?;
            (caps, formula)
        }
        Pattern::Legacy => {
            let caps = LEGACY.captures(fragment)?;
            let formula = growth_formula(&caps, GrowthShape::Linear)?;
            (caps, formula)
        }
        Pattern::Percentage => {
            let caps = PERCENTAGE.captures(fragment)?;
            let value = parse_number(&caps[1])?;
            (caps, StatFormula::percentage(value))
        }
        Pattern::Bare => {
            let caps = BARE.captures(fragment)?;
            let end = caps.get(0).map(|m| m.end()).unwrap_or(0);
            if GROWTH_MARKER.is_match(&fragment[end..]) {
                return None;
            }
            let value = parse_number(&caps[1])?;
            (caps, StatFormula::flat(value))
        }
    };

    let end = caps.get(0).map(|m| m.end()).unwrap_or(0);
    Some(match parse_cap(&fragment[end..]) {
        Some(max) => formula.with_max(max),
        None => formula,
    })
}

fn growth_formula(caps: &regex::Captures<'_>, shape: GrowthShape) -> Option<StatFormula> {
    let base = parse_number(&caps[1])?;
    let coefficient = parse_number(&caps[2])?;
    Some(match shape {
        GrowthShape::Quadratic => StatFormula::quadratic(base, coefficient),
        GrowthShape::Linear => StatFormula::linear(base, coefficient),
        GrowthShape::None => StatFormula::flat(base),
    })
}

fn parse_cap(rest: &str) -> Option<f64> {
    let caps = CAP.captures(rest)?;
    parse_number(&caps[1])
}

/// Parses a captured number, dropping thousands separators.
///
/// Malformed digits are logged and reported as a miss so the caller falls
/// through to the next pattern.
fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|c| *c != ',').collect();
    match cleaned.parse::<f64>() {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(raw, error = %e, "Malformed number in stat text");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_unlabelled() {
        let formula = parse("645 (+ 99 × L)", &["hp"]).unwrap();
        assert_eq!(formula, StatFormula::linear(645.0, 99.0));
    }

    #[test]
    fn test_quadratic_unlabelled() {
        let formula = parse("605 (+ 88 × L²)", &["hp"]).unwrap();
        assert_eq!(formula, StatFormula::quadratic(605.0, 88.0));
    }

    #[test]
    fn test_quadratic_marker_variants() {
        for text in [
            "605 (+88 × l²)",
            "605 (+ 88 x L^2)",
            "605 (+ 88 * L2)",
            "605 (+ 88 × Lvl²)",
            "605 (+ 88 · level^2)",
        ] {
            let formula = parse(text, &["hp"]).unwrap_or_else(|| panic!("no match for {text}"));
            assert_eq!(formula.growth_shape, GrowthShape::Quadratic, "{text}");
            assert_eq!(formula.growth_coefficient, 88.0, "{text}");
        }
    }

    #[test]
    fn test_labelled_with_separator() {
        let text = "Armor: 36 (+ 5.2 × L)\nMagic resist: 30 (+ 1.3 × L)";
        assert_eq!(parse(text, &["Armor"]), Some(StatFormula::linear(36.0, 5.2)));
        assert_eq!(
            parse(text, &["Magic resistance", "Magic resist"]),
            Some(StatFormula::linear(30.0, 1.3))
        );
    }

    #[test]
    fn test_label_is_case_insensitive() {
        assert_eq!(
            parse("HEALTH 570 (+ 90 × L)", &["Health"]),
            Some(StatFormula::linear(570.0, 90.0))
        );
    }

    #[test]
    fn test_label_needs_word_boundary() {
        // "HP" must not match inside "HP5"
        assert_eq!(parse("HP5 8 (+ 0.8 × L)", &["HP"]), None);
    }

    #[test]
    fn test_skips_label_occurrence_without_value() {
        let text = "Health regen 8.5 (+ 0.9 × L)\nHealth 650 (+ 109 × L)";
        assert_eq!(parse(text, &["Health"]), Some(StatFormula::linear(650.0, 109.0)));
    }

    #[test]
    fn test_first_candidate_wins() {
        let text = "HP 500\nHealth 600";
        assert_eq!(parse(text, &["Health", "HP"]), Some(StatFormula::flat(600.0)));
        assert_eq!(parse(text, &["HP", "Health"]), Some(StatFormula::flat(500.0)));
    }

    #[test]
    fn test_percentage() {
        let formula = parse("Critical strike chance 25%", &["Critical strike chance"]).unwrap();
        assert!(formula.is_percentage);
        assert_eq!(formula.base_value, 25.0);
        assert_eq!(formula.growth_shape, GrowthShape::None);
    }

    #[test]
    fn test_legacy_per_level() {
        assert_eq!(
            parse("Mana: 340 (+25 per level)", &["Mana"]),
            Some(StatFormula::linear(340.0, 25.0))
        );
    }

    #[test]
    fn test_bare_number() {
        assert_eq!(parse("Move speed 335", &["Move speed"]), Some(StatFormula::flat(335.0)));
    }

    #[test]
    fn test_bare_number_not_followed_by_growth() {
        // "(+" opens a growth term that no pattern understands
        assert_eq!(parse("Armor 30 (+ something odd)", &["Armor"]), None);
    }

    #[test]
    fn test_thousands_separator() {
        assert_eq!(parse("Cost 3,400", &["Cost"]), Some(StatFormula::flat(3400.0)));
    }

    #[test]
    fn test_malformed_number_falls_through_to_miss() {
        assert_eq!(parse("Armor 1.2.3 (+ 4 × L)", &["Armor"]), None);
        assert_eq!(parse("1.2.3", &["Armor"]), None);
    }

    #[test]
    fn test_cap_sets_max_value() {
        let formula = parse("Shield 40 (+ 10 × L) (max 180)", &["Shield"]).unwrap();
        assert_eq!(formula.max_value, Some(180.0));
        let formula = parse("Damage 20 capped at 100", &["Damage"]).unwrap();
        assert_eq!(formula, StatFormula::flat(20.0).with_max(100.0));
    }

    #[test]
    fn test_absent_stat_is_none() {
        assert_eq!(parse("Armor 36 (+ 5.2 × L)", &["Mana"]), None);
        assert_eq!(parse("no numbers here", &["hp"]), None);
        assert_eq!(parse("645 (+ 99 × L)", &[]), None);
    }

    #[test]
    fn test_unlabelled_text_ignored_once_a_label_is_present() {
        // A label was found but had no value; the leading number belongs to something else
        assert_eq!(parse("30 armor then Health", &["Health"]), None);
    }

    #[test]
    fn test_parse_all_dual_form() {
        let text = "Human form\nAttack range 525\nCougar form\nAttack range 125";
        let forms = parse_all(text, &["Attack range", "Range"]);
        assert_eq!(forms, vec![StatFormula::flat(525.0), StatFormula::flat(125.0)]);
    }

    #[test]
    fn test_parse_all_dedupes_overlapping_aliases() {
        let text = "Range 550";
        let forms = parse_all(text, &["Range", "range"]);
        assert_eq!(forms.len(), 1);
    }

    #[test]
    fn test_parse_all_empty_when_absent() {
        assert!(parse_all("Armor 30", &["Mana"]).is_empty());
    }

    #[test]
    fn test_percent_growth_coefficient() {
        let formula = parse("Attack speed 0.625 (+ 2.5% × L)", &["Attack speed"]).unwrap();
        assert_eq!(formula, StatFormula::linear(0.625, 2.5));

        let formula = parse("Bonus 10 (+ 1.5 % × L²)", &["Bonus"]).unwrap();
        assert_eq!(formula, StatFormula::quadratic(10.0, 1.5));

        let formula = parse("Crit 5 (+2% per level)", &["Crit"]).unwrap();
        assert_eq!(formula, StatFormula::linear(5.0, 2.0));
    }

    #[test]
    fn test_patterns_compile() {
        for re in [&QUADRATIC, &LINEAR, &PERCENTAGE, &LEGACY, &BARE, &GROWTH_MARKER, &CAP] {
            assert!(!re.as_str().is_empty());
        }
    }
}
