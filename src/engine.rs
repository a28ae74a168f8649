//! Stat Engine
//!
//! Owns the fetch client and the content cache and is the single entry point
//! for turning `(kind, name)` into a document or a table of stat formulas.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::cache::ContentCache;
use crate::entity::EntityKind;
use crate::error::FetchError;
use crate::extract::{document_text, stat_formulas};
use crate::fetch::{FetchClient, FetchMetrics};
use crate::formula::StatFormula;
use crate::normalize::{cache_key, normalize, url_identity};

/// A fetched or cached wiki page.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub key: String,
    /// Normalized entity name
    pub source_name: String,
    pub url: String,
    pub body: Vec<u8>,
    pub from_cache: bool,
}

/// Formulas extracted from one entity page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityStats {
    pub kind: EntityKind,
    pub name: String,
    pub key: String,
    pub url: String,
    pub from_cache: bool,
    pub formulas: BTreeMap<String, Vec<StatFormula>>,
}

// == Stat Engine ==
pub struct StatEngine {
    base_url: String,
    client: FetchClient,
    cache: Arc<ContentCache>,
}

impl StatEngine {
    pub fn new(base_url: impl Into<String>, client: FetchClient, cache: Arc<ContentCache>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            client,
            cache,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Page URL for an entity, built from its percent-encoded identity.
    pub fn build_url(&self, kind: EntityKind, name: &str) -> String {
        format!("{}/{}", self.base_url, kind.path_for(&url_identity(name)))
    }

    // == Fetch Document ==
    /// Returns the page for `(kind, name)`, from the cache when it holds a
    /// valid entry, otherwise from the network.
    ///
    /// A fetched page is written back to the cache. A failed write is logged
    /// and the page is still returned.
    #[instrument(skip(self, kind), fields(kind = %kind))]
    pub async fn fetch_document(
        &self,
        kind: EntityKind,
        name: &str,
    ) -> Result<Document, FetchError> {
        let source_name = normalize(name);
        let key = cache_key(kind, name);
        let url = self.build_url(kind, name);

        let cache = Arc::clone(&self.cache);
        let lookup_key = key.clone();
        let cached = match tokio::task::spawn_blocking(move || cache.get(&lookup_key)).await {
            Ok(cached) => cached,
            Err(e) => {
                warn!(key = %key, error = %e, "Cache lookup task failed");
                None
            }
        };

        if let Some(body) = cached {
            debug!(key = %key, "Cache hit");
            self.client.record_cache_lookup(true);
            return Ok(Document {
                key,
                source_name,
                url,
                body,
                from_cache: true,
            });
        }

        debug!(key = %key, "Cache miss");
        self.client.record_cache_lookup(false);

        let body = self.client.fetch(&url).await?;

        let cache = Arc::clone(&self.cache);
        let (store_key, store_name, store_body) = (key.clone(), source_name.clone(), body.clone());
        match tokio::task::spawn_blocking(move || cache.put(&store_key, &store_name, &store_body))
            .await
        {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(key = %key, error = %e, "Failed to cache document"),
            Err(e) => warn!(key = %key, error = %e, "Cache write task failed"),
        }

        Ok(Document {
            key,
            source_name,
            url,
            body,
            from_cache: false,
        })
    }

    // == Entity Stats ==
    /// Fetches the page for `(kind, name)` and extracts every stat formula
    /// the kind tracks.
    pub async fn entity_stats(
        &self,
        kind: EntityKind,
        name: &str,
    ) -> Result<EntityStats, FetchError> {
        let document = self.fetch_document(kind, name).await?;
        let text = document_text(&document.body);
        let formulas = stat_formulas(kind, &text);

        if formulas.is_empty() {
            warn!(key = %document.key, "No stat formulas found on page");
        }

        Ok(EntityStats {
            kind,
            name: document.source_name,
            key: document.key,
            url: document.url,
            from_cache: document.from_cache,
            formulas,
        })
    }

    pub fn metrics(&self) -> FetchMetrics {
        self.client.metrics()
    }

    pub fn cache(&self) -> &Arc<ContentCache> {
        &self.cache
    }

    pub fn client(&self) -> &FetchClient {
        &self.client
    }

    // == Close ==
    /// Releases network resources. Cached documents stay on disk.
    pub async fn close(&self) {
        self.client.close().await;
        info!("Stat engine closed");
    }
}
