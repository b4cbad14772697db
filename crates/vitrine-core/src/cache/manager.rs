//! Versioned asset cache with request interception
//!
//! Models the background-worker lifecycle as an explicit state machine:
//!
//! - `Installing`: precache the manifest into the generation named by the
//!   current version (all-or-nothing).
//! - `Activating`: purge every generation whose name is not the current
//!   version, then claim interception.
//! - `Active`: serve intercepted requests cache-first.
//!
//! Until the manager is active, `handle()` behaves like an uncontrolled
//! request: straight to the network, no cache reads or writes. Within a
//! generation entries may be stale relative to the network (no
//! revalidation); a version bump plus activate is the invalidation story.

use crate::cache::fetcher::Fetcher;
use crate::cache::store::GenerationStore;
use crate::cache::types::{AssetRequest, CacheKey, Method, RequestKind, ResponseSnapshot};
use crate::error::CoreError;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Lifecycle phase of the cache manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Installing,
    Activating,
    Active,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Installing => "installing",
            Phase::Activating => "activating",
            Phase::Active => "active",
        };
        f.write_str(name)
    }
}

/// Configuration for the cache manager
///
/// `version` is bumped by the deployer whenever caching semantics or the
/// manifest change; activation purges every other generation.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Current cache generation identifier
    pub version: String,

    /// Asset paths precached during install
    pub manifest: Vec<String>,

    /// Path prefixes that are never cached (dynamic content)
    pub excluded_prefixes: Vec<String>,

    /// Cached document served when a navigation fetch fails offline
    pub fallback_document: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            version: "portfolio-v1".to_string(),
            manifest: vec![
                "/".to_string(),
                "/favicon.svg".to_string(),
                "/favicon.ico".to_string(),
                "/resume.pdf".to_string(),
                "/placeholder.svg".to_string(),
            ],
            excluded_prefixes: vec!["/api/".to_string()],
            fallback_document: "/".to_string(),
        }
    }
}

/// Static asset cache manager
///
/// Intercepts read requests, serves cached snapshots, and keeps exactly
/// one cache generation alive across version bumps.
pub struct CacheManager {
    config: CacheConfig,
    store: Arc<GenerationStore>,
    fetcher: Arc<dyn Fetcher>,
    phase: RwLock<Phase>,
}

impl CacheManager {
    pub fn new(config: CacheConfig, store: Arc<GenerationStore>, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            config,
            store,
            fetcher,
            phase: RwLock::new(Phase::Installing),
        }
    }

    pub fn phase(&self) -> Phase {
        *self.phase.read()
    }

    pub fn version(&self) -> &str {
        &self.config.version
    }

    pub fn store(&self) -> &Arc<GenerationStore> {
        &self.store
    }

    /// Install phase: precache the whole manifest, all-or-nothing.
    ///
    /// Any transport failure or non-success status fails the phase and the
    /// generation is left unpopulated. On success the manager is
    /// immediately eligible for activation (no waiting period).
    pub async fn install(&self) -> Result<(), CoreError> {
        let phase = self.phase();
        if phase != Phase::Installing {
            return Err(CoreError::InvalidPhase {
                operation: "install",
                phase,
            });
        }

        // Fetch everything before touching the store so a partial manifest
        // never becomes visible.
        let mut precached = Vec::with_capacity(self.config.manifest.len());
        for path in &self.config.manifest {
            let request = AssetRequest::get(path.clone());
            let snapshot = self.fetcher.fetch(&request).await.map_err(|source| {
                CoreError::ManifestFetch {
                    path: path.clone(),
                    source,
                }
            })?;
            if !snapshot.is_success() {
                return Err(CoreError::ManifestStatus {
                    path: path.clone(),
                    status: snapshot.status,
                });
            }
            precached.push((request.cache_key(), snapshot));
        }

        self.store.open(&self.config.version);
        for (key, snapshot) in precached {
            self.store.put(&self.config.version, key, snapshot)?;
        }

        info!(
            generation = %self.config.version,
            assets = self.config.manifest.len(),
            "Install complete, manifest precached"
        );
        *self.phase.write() = Phase::Activating;
        Ok(())
    }

    /// Activate phase: purge stale generations, then claim interception.
    pub async fn activate(&self) -> Result<(), CoreError> {
        let phase = self.phase();
        if phase != Phase::Activating {
            return Err(CoreError::InvalidPhase {
                operation: "activate",
                phase,
            });
        }

        for name in self.store.generation_names() {
            if name != self.config.version {
                self.store.delete(&name);
                debug!(generation = %name, "Purged stale cache generation");
            }
        }

        *self.phase.write() = Phase::Active;
        info!(generation = %self.config.version, "Activated, claiming requests");
        Ok(())
    }

    /// Intercept one outgoing request.
    ///
    /// Policy, in order: non-GET and excluded paths pass straight through;
    /// otherwise cache-first with a detached write-back on miss, and a
    /// fallback to the cached root document when a navigation fetch fails.
    pub async fn handle(&self, request: &AssetRequest) -> Result<ResponseSnapshot, CoreError> {
        if self.phase() != Phase::Active {
            // Uncontrolled request: an unactivated worker never intercepts
            return self.passthrough(request).await;
        }

        if !request.method.is_cacheable_read() {
            return self.passthrough(request).await;
        }

        if self.is_excluded(request) {
            debug!(url = %request.url, "Excluded path, bypassing cache");
            return self.passthrough(request).await;
        }

        let key = request.cache_key();
        if let Some(hit) = self.store.get(&self.config.version, &key) {
            debug!(key = %key, "Cache hit");
            return Ok((*hit).clone());
        }

        debug!(key = %key, "Cache miss, fetching upstream");
        match self.fetcher.fetch(request).await {
            Ok(snapshot) => {
                if snapshot.is_success() {
                    self.spawn_write_back(key, snapshot.clone());
                }
                Ok(snapshot)
            }
            Err(source) => {
                if request.kind == RequestKind::Document {
                    let fallback =
                        CacheKey::new(Method::Get, &self.config.fallback_document);
                    if let Some(cached) = self.store.get(&self.config.version, &fallback) {
                        warn!(
                            url = %request.url,
                            "Navigation fetch failed, serving cached fallback document"
                        );
                        return Ok((*cached).clone());
                    }
                }
                Err(CoreError::UpstreamFetch {
                    url: request.url.clone(),
                    source,
                })
            }
        }
    }

    fn is_excluded(&self, request: &AssetRequest) -> bool {
        let path = request.path();
        self.config
            .excluded_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }

    async fn passthrough(&self, request: &AssetRequest) -> Result<ResponseSnapshot, CoreError> {
        self.fetcher
            .fetch(request)
            .await
            .map_err(|source| CoreError::UpstreamFetch {
                url: request.url.clone(),
                source,
            })
    }

    /// Detached write-back after a miss.
    ///
    /// The response has already been handed to the caller; a failed write
    /// only costs a future cache miss, so the outcome is logged and
    /// dropped.
    fn spawn_write_back(&self, key: CacheKey, snapshot: ResponseSnapshot) {
        let store = Arc::clone(&self.store);
        let generation = self.config.version.clone();
        tokio::spawn(async move {
            if let Err(e) = store.put(&generation, key, snapshot) {
                warn!("Failed to write back cached response: {}", e);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::fetcher::mock::MockFetcher;
    use std::time::Duration;

    fn manager_with(fetcher: MockFetcher) -> CacheManager {
        CacheManager::new(
            CacheConfig::default(),
            Arc::new(GenerationStore::new()),
            Arc::new(fetcher),
        )
    }

    fn stubbed_fetcher() -> MockFetcher {
        MockFetcher::new()
            .ok("/", "<html>index</html>")
            .ok("/favicon.svg", "svg-icon")
            .ok("/favicon.ico", "ico-icon")
            .ok("/resume.pdf", "pdf-bytes")
            .ok("/placeholder.svg", "placeholder")
    }

    async fn settle() {
        // Let the detached write-back task run
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    #[tokio::test]
    async fn test_install_precaches_manifest() {
        let manager = manager_with(stubbed_fetcher());
        manager.install().await.unwrap();

        assert_eq!(manager.phase(), Phase::Activating);
        assert_eq!(manager.store().entry_count("portfolio-v1"), 5);
    }

    #[tokio::test]
    async fn test_install_is_all_or_nothing() {
        let fetcher = stubbed_fetcher();
        fetcher.go_offline("/resume.pdf");
        let manager = manager_with(fetcher);

        let err = manager.install().await.unwrap_err();
        assert!(matches!(err, CoreError::ManifestFetch { path, .. } if path == "/resume.pdf"));
        assert_eq!(manager.phase(), Phase::Installing);
        assert!(!manager.store().contains("portfolio-v1"));
    }

    #[tokio::test]
    async fn test_install_rejects_error_status() {
        let fetcher = stubbed_fetcher();
        fetcher.respond(
            "/placeholder.svg",
            ResponseSnapshot {
                status: 404,
                headers: vec![],
                body: vec![],
            },
        );
        let manager = manager_with(fetcher);

        let err = manager.install().await.unwrap_err();
        assert!(matches!(
            err,
            CoreError::ManifestStatus { status: 404, .. }
        ));
        assert!(!manager.store().contains("portfolio-v1"));
    }

    #[tokio::test]
    async fn test_activate_purges_stale_generations() {
        let manager = manager_with(stubbed_fetcher());
        manager.store().open("portfolio-v0");
        manager.store().open("abandoned-experiment");

        manager.install().await.unwrap();
        manager.activate().await.unwrap();

        assert_eq!(manager.phase(), Phase::Active);
        let names = manager.store().generation_names();
        assert_eq!(names, vec!["portfolio-v1".to_string()]);
    }

    #[tokio::test]
    async fn test_activate_requires_install() {
        let manager = manager_with(stubbed_fetcher());
        let err = manager.activate().await.unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidPhase {
                operation: "activate",
                phase: Phase::Installing,
            }
        ));
    }

    #[tokio::test]
    async fn test_handle_before_activation_is_uncontrolled() {
        let manager = manager_with(stubbed_fetcher().ok("/style.css", "css"));
        let snap = manager
            .handle(&AssetRequest::get("/style.css"))
            .await
            .unwrap();
        assert_eq!(snap.body, b"css");
        // No generation exists yet, so nothing was cached
        assert!(!manager.store().contains("portfolio-v1"));
    }

    async fn active_manager(fetcher: MockFetcher) -> CacheManager {
        let manager = manager_with(fetcher);
        manager.install().await.unwrap();
        manager.activate().await.unwrap();
        manager
    }

    #[tokio::test]
    async fn test_non_get_passes_through() {
        let fetcher = stubbed_fetcher().ok("/contact", "submitted");
        let manager = active_manager(fetcher).await;

        let request = AssetRequest::get("/contact").with_method(Method::Post);
        manager.handle(&request).await.unwrap();
        settle().await;

        // Only the 5 manifest entries, no POST key
        assert_eq!(manager.store().entry_count("portfolio-v1"), 5);
        assert!(manager
            .store()
            .get("portfolio-v1", &request.cache_key())
            .is_none());
    }

    #[tokio::test]
    async fn test_excluded_path_passes_through() {
        let fetcher = stubbed_fetcher().ok("/api/projects", "[]");
        let manager = active_manager(fetcher).await;

        let request = AssetRequest::get("/api/projects");
        manager.handle(&request).await.unwrap();
        settle().await;

        assert_eq!(manager.store().entry_count("portfolio-v1"), 5);
    }

    #[tokio::test]
    async fn test_excluded_path_matches_absolute_urls() {
        let fetcher = stubbed_fetcher().ok("https://example.com/api/projects", "[]");
        let manager = active_manager(fetcher).await;

        manager
            .handle(&AssetRequest::get("https://example.com/api/projects"))
            .await
            .unwrap();
        settle().await;

        assert_eq!(manager.store().entry_count("portfolio-v1"), 5);
    }

    #[tokio::test]
    async fn test_cache_hit_skips_network() {
        let shared = Arc::new(stubbed_fetcher());
        let manager = CacheManager::new(
            CacheConfig::default(),
            Arc::new(GenerationStore::new()),
            Arc::clone(&shared) as Arc<dyn Fetcher>,
        );
        manager.install().await.unwrap();
        manager.activate().await.unwrap();

        // Install fetched exactly the manifest
        assert_eq!(shared.call_count(), 5);

        let snap = manager
            .handle(&AssetRequest::get("/favicon.svg"))
            .await
            .unwrap();
        assert_eq!(snap.body, b"svg-icon");
        assert_eq!(shared.call_count(), 5);
    }

    #[tokio::test]
    async fn test_cache_miss_stores_and_returns_original() {
        let shared = Arc::new(stubbed_fetcher().ok("/projects/thumb.png", "png-bytes"));
        let manager = CacheManager::new(
            CacheConfig::default(),
            Arc::new(GenerationStore::new()),
            Arc::clone(&shared) as Arc<dyn Fetcher>,
        );
        manager.install().await.unwrap();
        manager.activate().await.unwrap();

        let request = AssetRequest::get("/projects/thumb.png");
        let snap = manager.handle(&request).await.unwrap();
        assert_eq!(snap.body, b"png-bytes");
        settle().await;

        let stored = manager
            .store()
            .get("portfolio-v1", &request.cache_key())
            .unwrap();
        assert_eq!(stored.body, b"png-bytes");
        assert_eq!(manager.store().entry_count("portfolio-v1"), 6);

        // Second request is served from cache, no extra network call
        let calls = shared.call_count();
        manager.handle(&request).await.unwrap();
        assert_eq!(shared.call_count(), calls);
    }

    #[tokio::test]
    async fn test_miss_with_error_status_is_not_stored() {
        let fetcher = stubbed_fetcher();
        fetcher.respond(
            "/gone.png",
            ResponseSnapshot {
                status: 404,
                headers: vec![],
                body: b"not found".to_vec(),
            },
        );
        let manager = active_manager(fetcher).await;

        let request = AssetRequest::get("/gone.png");
        let snap = manager.handle(&request).await.unwrap();
        assert_eq!(snap.status, 404);
        settle().await;

        assert!(manager
            .store()
            .get("portfolio-v1", &request.cache_key())
            .is_none());
    }

    #[tokio::test]
    async fn test_offline_navigation_falls_back_to_root() {
        let manager = active_manager(stubbed_fetcher()).await;

        let snap = manager
            .handle(&AssetRequest::document("/projects"))
            .await
            .unwrap();
        assert_eq!(snap.body, b"<html>index</html>");
    }

    #[tokio::test]
    async fn test_offline_asset_failure_propagates() {
        let manager = active_manager(stubbed_fetcher()).await;

        let err = manager
            .handle(&AssetRequest::get("/projects/thumb.png"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::UpstreamFetch { url, .. } if url == "/projects/thumb.png"
        ));
    }

    #[tokio::test]
    async fn test_offline_navigation_without_fallback_propagates() {
        // Fallback document configured but never cached
        let config = CacheConfig {
            manifest: vec!["/favicon.svg".to_string()],
            ..CacheConfig::default()
        };
        let manager = CacheManager::new(
            config,
            Arc::new(GenerationStore::new()),
            Arc::new(MockFetcher::new().ok("/favicon.svg", "svg")),
        );
        manager.install().await.unwrap();
        manager.activate().await.unwrap();

        let err = manager
            .handle(&AssetRequest::document("/projects"))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::UpstreamFetch { .. }));
    }
}
