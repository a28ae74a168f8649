//! Formula Evaluator
//!
//! Level queries over parsed formulas. Everything here is pure.

use std::collections::BTreeMap;

use tracing::warn;

use crate::error::FormulaError;
use crate::formula::{GrowthShape, Level, StatFormula};

// == Evaluate ==
/// Value of `formula` at `level`.
///
/// Levels outside `1..=18` are rejected with `OutOfRange`, never clamped.
pub fn evaluate(formula: &StatFormula, level: u32) -> Result<f64, FormulaError> {
    let level = Level::new(level)?;
    check_finite(formula)?;
    Ok(value_at(formula, level))
}

fn value_at(formula: &StatFormula, level: Level) -> f64 {
    let steps = f64::from(level.steps());
    let value = match formula.growth_shape {
        GrowthShape::None => formula.base_value,
        GrowthShape::Linear => formula.base_value + formula.growth_coefficient * steps,
        GrowthShape::Quadratic => formula.base_value + formula.growth_coefficient * steps * steps,
    };
    match formula.max_value {
        Some(max) => value.min(max),
        None => value,
    }
}

fn check_finite(formula: &StatFormula) -> Result<(), FormulaError> {
    if !formula.base_value.is_finite() {
        return Err(FormulaError::Malformed(format!(
            "base value {} is not finite",
            formula.base_value
        )));
    }
    if formula.has_growth() && !formula.growth_coefficient.is_finite() {
        return Err(FormulaError::Malformed(format!(
            "growth coefficient {} is not finite",
            formula.growth_coefficient
        )));
    }
    if let Some(max) = formula.max_value {
        if max.is_nan() {
            return Err(FormulaError::Malformed("max value is NaN".to_string()));
        }
    }
    Ok(())
}

// == Level Range ==
/// Values for every level in `start..=end`, both bounds validated.
pub fn level_range(
    formula: &StatFormula,
    start: u32,
    end: u32,
) -> Result<BTreeMap<u8, f64>, FormulaError> {
    let first = Level::new(start)?;
    let last = Level::new(end)?;
    if first > last {
        return Err(FormulaError::InvalidRange { start, end });
    }
    check_finite(formula)?;

    Ok(Level::all()
        .filter(|level| *level >= first && *level <= last)
        .map(|level| (level.get(), value_at(formula, level)))
        .collect())
}

// == Growth At ==
/// Growth gained between level 1 and `level`; zero at level 1.
pub fn growth_at(formula: &StatFormula, level: u32) -> Result<f64, FormulaError> {
    let at_level = evaluate(formula, level)?;
    // Measured from the level-1 value so a cap below the base still yields 0 at level 1
    let at_first = evaluate(formula, u32::from(crate::formula::MIN_LEVEL))?;
    Ok(at_level - at_first)
}

// == Calculate All ==
/// Evaluates every named formula at one level.
///
/// The level is checked once and an invalid level fails the whole call. A
/// formula that fails on its own is logged and left out of the result.
pub fn calculate_all(
    formulas: &BTreeMap<String, StatFormula>,
    level: u32,
) -> Result<BTreeMap<String, f64>, FormulaError> {
    let level = Level::new(level)?;

    let mut results = BTreeMap::new();
    for (name, formula) in formulas {
        match check_finite(formula) {
            Ok(()) => {
                results.insert(name.clone(), value_at(formula, level));
            }
            Err(e) => warn!(stat = %name, error = %e, "Skipping stat"),
        }
    }
    Ok(results)
}

/// Like `calculate_all` for stats that may carry several forms.
///
/// Failing forms are dropped; a stat with no surviving form is omitted.
pub fn calculate_forms(
    formulas: &BTreeMap<String, Vec<StatFormula>>,
    level: u32,
) -> Result<BTreeMap<String, Vec<f64>>, FormulaError> {
    let level = Level::new(level)?;

    let mut results = BTreeMap::new();
    for (name, forms) in formulas {
        let values: Vec<f64> = forms
            .iter()
            .filter_map(|formula| match check_finite(formula) {
                Ok(()) => Some(value_at(formula, level)),
                Err(e) => {
                    warn!(stat = %name, error = %e, "Skipping stat form");
                    None
                }
            })
            .collect();
        if !values.is_empty() {
            results.insert(name.clone(), values);
        }
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::parse;

    #[test]
    fn test_linear_round_trip() {
        let formula = parse("645 (+ 99 × L)", &["hp"]).unwrap();
        assert_eq!(formula.base_value, 645.0);
        assert_eq!(formula.growth_coefficient, 99.0);
        assert_eq!(formula.growth_shape, GrowthShape::Linear);

        assert_eq!(evaluate(&formula, 1).unwrap(), 645.0);
        assert_eq!(evaluate(&formula, 18).unwrap(), 2328.0);
    }

    #[test]
    fn test_quadratic_round_trip() {
        let formula = parse("605 (+ 88 × L²)", &["hp"]).unwrap();
        assert_eq!(formula.growth_shape, GrowthShape::Quadratic);
        assert_eq!(evaluate(&formula, 10).unwrap(), 7733.0);
    }

    #[test]
    fn test_level_boundaries() {
        let formula = StatFormula::linear(100.0, 10.0);
        assert_eq!(evaluate(&formula, 0), Err(FormulaError::OutOfRange { level: 0 }));
        assert_eq!(evaluate(&formula, 19), Err(FormulaError::OutOfRange { level: 19 }));
        assert!(evaluate(&formula, 1).is_ok());
        assert!(evaluate(&formula, 18).is_ok());
    }

    #[test]
    fn test_flat_ignores_coefficient() {
        let formula = StatFormula {
            growth_coefficient: 1000.0,
            ..StatFormula::flat(335.0)
        };
        assert_eq!(evaluate(&formula, 18).unwrap(), 335.0);
    }

    #[test]
    fn test_flat_ignores_non_finite_coefficient() {
        let formula = StatFormula {
            growth_coefficient: f64::NAN,
            ..StatFormula::flat(335.0)
        };
        assert_eq!(evaluate(&formula, 5).unwrap(), 335.0);
    }

    #[test]
    fn test_max_value_clamps() {
        let formula = StatFormula::linear(40.0, 10.0).with_max(100.0);
        assert_eq!(evaluate(&formula, 5).unwrap(), 80.0);
        assert_eq!(evaluate(&formula, 18).unwrap(), 100.0);
    }

    #[test]
    fn test_malformed_formula() {
        let formula = StatFormula::linear(f64::INFINITY, 1.0);
        assert!(matches!(evaluate(&formula, 1), Err(FormulaError::Malformed(_))));
    }

    #[test]
    fn test_level_range() {
        let formula = StatFormula::linear(10.0, 2.0);
        let table = level_range(&formula, 3, 5).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table[&3], 14.0);
        assert_eq!(table[&5], 18.0);
    }

    #[test]
    fn test_level_range_full() {
        let table = level_range(&StatFormula::flat(1.0), 1, 18).unwrap();
        assert_eq!(table.len(), 18);
    }

    #[test]
    fn test_level_range_validates_bounds() {
        let formula = StatFormula::flat(1.0);
        assert_eq!(
            level_range(&formula, 0, 5),
            Err(FormulaError::OutOfRange { level: 0 })
        );
        assert_eq!(
            level_range(&formula, 1, 19),
            Err(FormulaError::OutOfRange { level: 19 })
        );
        assert_eq!(
            level_range(&formula, 9, 3),
            Err(FormulaError::InvalidRange { start: 9, end: 3 })
        );
    }

    #[test]
    fn test_growth_at() {
        let formula = StatFormula::quadratic(605.0, 88.0);
        assert_eq!(growth_at(&formula, 1).unwrap(), 0.0);
        assert_eq!(growth_at(&formula, 10).unwrap(), 7128.0);
        assert!(growth_at(&formula, 0).is_err());
    }

    #[test]
    fn test_calculate_all_skips_malformed() {
        let mut formulas = BTreeMap::new();
        formulas.insert("hp".to_string(), StatFormula::linear(645.0, 99.0));
        formulas.insert("armor".to_string(), StatFormula::linear(f64::NAN, 4.0));
        formulas.insert("move_speed".to_string(), StatFormula::flat(335.0));

        let results = calculate_all(&formulas, 18).unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results["hp"], 2328.0);
        assert_eq!(results["move_speed"], 335.0);
        assert!(!results.contains_key("armor"));
    }

    #[test]
    fn test_calculate_all_rejects_level() {
        let mut formulas = BTreeMap::new();
        formulas.insert("hp".to_string(), StatFormula::flat(1.0));
        assert_eq!(
            calculate_all(&formulas, 19),
            Err(FormulaError::OutOfRange { level: 19 })
        );
    }

    #[test]
    fn test_calculate_forms() {
        let mut formulas = BTreeMap::new();
        formulas.insert(
            "attack_range".to_string(),
            vec![StatFormula::flat(525.0), StatFormula::flat(125.0)],
        );
        formulas.insert("broken".to_string(), vec![StatFormula::flat(f64::NAN)]);
        formulas.insert("none".to_string(), Vec::new());

        let results = calculate_forms(&formulas, 1).unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results["attack_range"], vec![525.0, 125.0]);
    }
}
