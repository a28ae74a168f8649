//! Stat formula model and the level domain.

use serde::{Deserialize, Serialize};

use crate::error::FormulaError;

/// Lowest in-game level
pub const MIN_LEVEL: u8 = 1;

/// Highest in-game level
pub const MAX_LEVEL: u8 = 18;

// == Growth Shape ==
/// How a stat changes across levels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrowthShape {
    /// Constant; the coefficient is ignored
    #[default]
    None,
    /// `base + coef * (level - 1)`
    Linear,
    /// `base + coef * (level - 1)^2`
    Quadratic,
}

// == Stat Formula ==
/// A parsed growth expression such as `605 (+ 88 × L²)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatFormula {
    pub base_value: f64,
    #[serde(default)]
    pub growth_coefficient: f64,
    #[serde(default)]
    pub growth_shape: GrowthShape,
    #[serde(default)]
    pub is_percentage: bool,
    /// Results are clamped to this value when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
}

impl StatFormula {
    /// Constant value with no growth.
    pub fn flat(base_value: f64) -> Self {
        Self {
            base_value,
            growth_coefficient: 0.0,
            growth_shape: GrowthShape::None,
            is_percentage: false,
            max_value: None,
        }
    }

    pub fn linear(base_value: f64, growth_coefficient: f64) -> Self {
        Self {
            growth_coefficient,
            growth_shape: GrowthShape::Linear,
            ..Self::flat(base_value)
        }
    }

    pub fn quadratic(base_value: f64, growth_coefficient: f64) -> Self {
        Self {
            growth_coefficient,
            growth_shape: GrowthShape::Quadratic,
            ..Self::flat(base_value)
        }
    }

    /// Constant percentage such as `25%`.
    pub fn percentage(value: f64) -> Self {
        Self {
            is_percentage: true,
            ..Self::flat(value)
        }
    }

    pub fn with_max(mut self, max_value: f64) -> Self {
        self.max_value = Some(max_value);
        self
    }

    pub fn has_growth(&self) -> bool {
        self.growth_shape != GrowthShape::None
    }
}

// == Level ==
/// An in-game level, always inside `MIN_LEVEL..=MAX_LEVEL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Level(u8);

impl Level {
    /// Rejects anything outside the leveling range instead of clamping.
    pub fn new(level: u32) -> Result<Self, FormulaError> {
        if (u32::from(MIN_LEVEL)..=u32::from(MAX_LEVEL)).contains(&level) {
            Ok(Level(level as u8))
        } else {
            Err(FormulaError::OutOfRange { level })
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Levels gained since level 1.
    pub fn steps(self) -> u8 {
        self.0 - MIN_LEVEL
    }

    pub fn all() -> impl Iterator<Item = Level> {
        (MIN_LEVEL..=MAX_LEVEL).map(Level)
    }
}

impl TryFrom<u32> for Level {
    type Error = FormulaError;

    fn try_from(level: u32) -> Result<Self, Self::Error> {
        Level::new(level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_bounds() {
        assert!(Level::new(1).is_ok());
        assert!(Level::new(18).is_ok());
        assert_eq!(Level::new(0), Err(FormulaError::OutOfRange { level: 0 }));
        assert_eq!(Level::new(19), Err(FormulaError::OutOfRange { level: 19 }));
    }

    #[test]
    fn test_level_all() {
        let levels: Vec<u8> = Level::all().map(Level::get).collect();
        assert_eq!(levels.len(), 18);
        assert_eq!(levels.first(), Some(&1));
        assert_eq!(levels.last(), Some(&18));
    }

    #[test]
    fn test_formula_json_defaults() {
        let formula: StatFormula = serde_json::from_str(r#"{"base_value": 30}"#).unwrap();
        assert_eq!(formula, StatFormula::flat(30.0));
    }

    #[test]
    fn test_formula_json_shape_lowercase() {
        let json = serde_json::to_value(StatFormula::quadratic(605.0, 88.0)).unwrap();
        assert_eq!(json["growth_shape"], "quadratic");
        assert!(json.get("max_value").is_none());
    }
}
