//! Provider model catalog discovery with a TTL-bounded cache.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::ranking::normalize_name;

/// Cached catalog contents. Populated only by a non-empty successful
/// discovery and reused for the whole TTL window; a failed or empty
/// discovery never overwrites a previous good result.
#[derive(Debug, Default)]
pub struct ModelCache {
    entries: Vec<String>,
    populated_at: Option<Instant>,
}

impl ModelCache {
    /// Seed the cache, marking it freshly populated. Used by callers
    /// that want to skip the first discovery round-trip (and by tests).
    pub fn warm(entries: Vec<String>) -> Self {
        Self {
            entries,
            populated_at: Some(Instant::now()),
        }
    }

    fn fresh_within(&self, ttl: Duration) -> bool {
        self.populated_at
            .map(|at| at.elapsed() < ttl)
            .unwrap_or(false)
    }
}

#[derive(Debug, Deserialize)]
struct ModelsResponse {
    #[serde(default)]
    models: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    name: String,
    #[serde(default, rename = "supportedGenerationMethods")]
    supported_generation_methods: Vec<String>,
}

/// Discovers generation-capable models from the provider catalog
/// endpoint, caching the result process-wide.
pub struct ModelCatalog {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    ttl: Duration,
    cache: Mutex<ModelCache>,
}

impl ModelCatalog {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        ttl: Duration,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            ttl,
            cache: Mutex::new(ModelCache::default()),
        }
    }

    /// Replace the cache wholesale. Tests use this to start from a
    /// warm or deliberately stale state.
    pub fn set_cache(&self, cache: ModelCache) {
        *self.cache.lock().unwrap() = cache;
    }

    /// Generation-capable model names, from cache when fresh.
    ///
    /// Discovery failure is not an error at this level: the caller
    /// still has its static candidates, so an unreachable catalog just
    /// returns the empty list (and leaves any stale cache in place).
    pub async fn generation_models(&self) -> Vec<String> {
        {
            let cache = self.cache.lock().unwrap();
            if cache.fresh_within(self.ttl) {
                debug!(
                    subsystem = "ai",
                    component = "catalog",
                    cached = cache.entries.len(),
                    "Model catalog served from cache"
                );
                return cache.entries.clone();
            }
        }

        let discovered = match self.discover().await {
            Ok(models) => models,
            Err(e) => {
                warn!(
                    subsystem = "ai",
                    component = "catalog",
                    error = %e,
                    "Model discovery failed, continuing with static candidates"
                );
                return Vec::new();
            }
        };

        if discovered.is_empty() {
            return Vec::new();
        }

        let mut cache = self.cache.lock().unwrap();
        *cache = ModelCache::warm(discovered.clone());
        discovered
    }

    async fn discover(&self) -> nimbus_core::Result<Vec<String>> {
        let url = format!("{}/v1beta/models?key={}", self.base_url, self.api_key);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(nimbus_core::Error::Provider(format!(
                "model catalog returned {}",
                response.status()
            )));
        }

        let catalog: ModelsResponse = response.json().await?;
        let models: Vec<String> = catalog
            .models
            .into_iter()
            .filter(|m| {
                m.supported_generation_methods
                    .iter()
                    .any(|method| method == "generateContent")
            })
            .map(|m| normalize_name(&m.name))
            .collect();

        debug!(
            subsystem = "ai",
            component = "catalog",
            discovered = models.len(),
            "Model catalog discovered"
        );
        Ok(models)
    }
}
