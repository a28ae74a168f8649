//! API Handlers
//!
//! HTTP request handlers for each stats endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use tracing::info;

use crate::cache::ContentCache;
use crate::config::Config;
use crate::engine::StatEngine;
use crate::entity::EntityKind;
use crate::error::{ApiError, FormulaError, Result};
use crate::fetch::FetchClient;
use crate::formula::{calculate_all, calculate_forms, level_range, Level};
use crate::models::{
    CacheListResponse, EntityQuery, EntityStatsResponse, EvaluateRequest, EvaluateResponse,
    HealthResponse, MetricsResponse, ProgressionQuery, ProgressionResponse, SweepResponse,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<StatEngine>,
}

impl AppState {
    /// Creates a new AppState around an engine.
    pub fn new(engine: StatEngine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Builds the fetch client and content cache from the Config.
    pub fn from_config(config: &Config) -> Self {
        let client = FetchClient::new(config.fetch_config());
        let cache = Arc::new(ContentCache::new(config.cache_config()));
        Self::new(StatEngine::new(config.wiki_base_url.clone(), client, cache))
    }

    pub fn cache(&self) -> Arc<ContentCache> {
        Arc::clone(self.engine.cache())
    }
}

fn parse_target(kind: &str, name: &str) -> Result<EntityKind> {
    let kind = kind.parse::<EntityKind>().map_err(ApiError::InvalidRequest)?;
    if name.trim().is_empty() {
        return Err(ApiError::InvalidRequest(
            "Entity name cannot be empty".to_string(),
        ));
    }
    Ok(kind)
}

async fn blocking<T, F>(cache: Arc<ContentCache>, f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&ContentCache) -> T + Send + 'static,
{
    tokio::task::spawn_blocking(move || f(cache.as_ref()))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))
}

/// Handler for GET /entities/:kind/:name
///
/// Returns every stat formula found on the entity page. With `?level=N` the
/// response also carries each stat's value at that level.
pub async fn entity_handler(
    State(state): State<AppState>,
    Path((kind, name)): Path<(String, String)>,
    Query(query): Query<EntityQuery>,
) -> Result<Json<EntityStatsResponse>> {
    let kind = parse_target(&kind, &name)?;
    if let Some(level) = query.level {
        Level::new(level)?;
    }

    let stats = state.engine.entity_stats(kind, &name).await?;

    let response = match query.level {
        Some(level) => {
            let values = calculate_forms(&stats.formulas, level)?;
            EntityStatsResponse::new(stats).with_values(level, values)
        }
        None => EntityStatsResponse::new(stats),
    };
    Ok(Json(response))
}

/// Handler for GET /entities/:kind/:name/progression
///
/// Tabulates one stat over a level range. Dual-form entities use their first
/// listed form.
pub async fn progression_handler(
    State(state): State<AppState>,
    Path((kind, name)): Path<(String, String)>,
    Query(query): Query<ProgressionQuery>,
) -> Result<Json<ProgressionResponse>> {
    let kind = parse_target(&kind, &name)?;
    let (start, end) = query.bounds();
    // Bounds are checked before any network traffic
    if Level::new(start)? > Level::new(end)? {
        return Err(FormulaError::InvalidRange { start, end }.into());
    }

    let stats = state.engine.entity_stats(kind, &name).await?;
    let formula = stats
        .formulas
        .get(&query.stat)
        .and_then(|forms| forms.first())
        .cloned()
        .ok_or_else(|| ApiError::StatNotFound(format!("{} for {}", query.stat, stats.name)))?;

    let values = level_range(&formula, start, end)?;

    Ok(Json(ProgressionResponse {
        kind,
        name: stats.name,
        stat: query.stat,
        formula,
        values,
    }))
}

/// Handler for POST /evaluate
///
/// Evaluates caller-supplied formulas at one level.
pub async fn evaluate_handler(Json(req): Json<EvaluateRequest>) -> Result<Json<EvaluateResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(ApiError::InvalidRequest(error_msg));
    }

    let values = calculate_all(&req.formulas, req.level)?;
    Ok(Json(EvaluateResponse::new(req.level, values, req.formulas.keys())))
}

/// Handler for POST /cache/sweep
pub async fn sweep_handler(State(state): State<AppState>) -> Result<Json<SweepResponse>> {
    let removed = blocking(state.cache(), ContentCache::sweep).await?;
    info!(removed, "Manual cache sweep");
    Ok(Json(SweepResponse { removed }))
}

/// Handler for GET /cache
pub async fn cache_handler(State(state): State<AppState>) -> Result<Json<CacheListResponse>> {
    let entries = blocking(state.cache(), ContentCache::entries).await?;
    Ok(Json(CacheListResponse::new(&entries)))
}

/// Handler for GET /metrics
pub async fn metrics_handler(State(state): State<AppState>) -> Result<Json<MetricsResponse>> {
    let cache_stats = blocking(state.cache(), ContentCache::stats).await?;
    Ok(Json(MetricsResponse::new(state.engine.metrics(), cache_stats)))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
