//! Request DTOs for the stats API
//!
//! Defines the structure of incoming query strings and request bodies.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::formula::{StatFormula, MAX_LEVEL, MIN_LEVEL};

/// Most formulas accepted by one evaluate call
pub const MAX_BATCH: usize = 256;

/// Query string for `GET /entities/:kind/:name`
///
/// When `level` is present the response also carries values at that level.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntityQuery {
    #[serde(default)]
    pub level: Option<u32>,
}

/// Query string for `GET /entities/:kind/:name/progression`
#[derive(Debug, Clone, Deserialize)]
pub struct ProgressionQuery {
    /// Stat name as listed in the entity response, e.g. `hp`
    pub stat: String,
    #[serde(default)]
    pub start: Option<u32>,
    #[serde(default)]
    pub end: Option<u32>,
}

impl ProgressionQuery {
    /// Requested bounds, defaulting to the full leveling range.
    pub fn bounds(&self) -> (u32, u32) {
        (
            self.start.unwrap_or(u32::from(MIN_LEVEL)),
            self.end.unwrap_or(u32::from(MAX_LEVEL)),
        )
    }
}

/// Request body for `POST /evaluate`
#[derive(Debug, Clone, Deserialize)]
pub struct EvaluateRequest {
    pub formulas: BTreeMap<String, StatFormula>,
    pub level: u32,
}

impl EvaluateRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid. The level
    /// itself is checked by the evaluator.
    pub fn validate(&self) -> Option<String> {
        if self.formulas.len() > MAX_BATCH {
            return Some(format!(
                "At most {} formulas can be evaluated per request",
                MAX_BATCH
            ));
        }
        if self.formulas.keys().any(|name| name.trim().is_empty()) {
            return Some("Stat names cannot be empty".to_string());
        }
        None
    }
}
