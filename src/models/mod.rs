//! Request and Response models for the stats API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{EntityQuery, EvaluateRequest, ProgressionQuery};
pub use responses::{
    CacheEntryResponse, CacheListResponse, EntityStatsResponse, ErrorResponse, EvaluateResponse,
    HealthResponse, MetricsResponse, ProgressionResponse, SweepResponse,
};
