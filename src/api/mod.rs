//! API Module
//!
//! HTTP handlers and routing for the stats REST API.
//!
//! # Endpoints
//! - `GET /health` - Health check endpoint
//! - `GET /metrics` - Fetch and cache counters
//! - `GET /entities/:kind/:name` - Stat formulas for one entity
//! - `GET /entities/:kind/:name/progression` - One stat over a level range
//! - `POST /evaluate` - Evaluate formulas at a level
//! - `POST /cache/sweep` - Sweep stale cache entries
//! - `GET /cache` - List cache entries

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
