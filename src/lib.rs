//! Wiki Stats - fetch, cache and evaluate game-wiki stat formulas
//!
//! Pulls entity pages from a wiki through a rate-limited retrying client,
//! keeps them in a TTL disk cache and turns the growth expressions they
//! contain into formulas that can be evaluated at any level.

pub mod api;
pub mod cache;
pub mod config;
pub mod engine;
pub mod entity;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod formula;
pub mod models;
pub mod normalize;
pub mod tasks;

pub use api::AppState;
pub use cache::{CacheConfig, ContentCache};
pub use config::Config;
pub use engine::{Document, EntityStats, StatEngine};
pub use entity::EntityKind;
pub use error::{ApiError, CacheError, FetchError, FormulaError, TransientError};
pub use fetch::{FetchClient, FetchConfig, FetchMetrics};
pub use formula::{calculate_all, evaluate, parse, GrowthShape, StatFormula};
pub use tasks::spawn_sweep_task;
