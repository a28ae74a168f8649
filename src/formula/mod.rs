//! Formula Module
//!
//! Parses stat growth text into `StatFormula` values and evaluates them at
//! any level in the game's 1..=18 range.

mod evaluator;
mod model;
mod parser;


// Re-export public types
pub use evaluator::{calculate_all, calculate_forms, evaluate, growth_at, level_range};
pub use model::{GrowthShape, Level, StatFormula, MAX_LEVEL, MIN_LEVEL};
pub use parser::{parse, parse_all, parse_fragment};
