//! Page session context
//!
//! Owns both runtime subsystems for one page visit. The subsystems share
//! no state; the session just starts them together and provides the
//! construct-once collector handle that replaces a process-wide global.

use crate::cache::{CacheConfig, CacheManager, Fetcher, GenerationStore};
use crate::error::CoreError;
use crate::metrics::{AnalyticsExporter, AnalyticsPayload, PerformanceCollector, SignalHost};
use once_cell::sync::OnceCell;
use std::sync::Arc;
use tracing::info;

/// Configuration for one page session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub cache: CacheConfig,

    /// Analytics destination; `None` means log-only
    pub analytics_endpoint: Option<String>,

    /// Client identifier reported with every payload
    pub user_agent: String,

    /// Originating page URL reported with every payload
    pub page_url: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            analytics_endpoint: None,
            user_agent: format!("vitrine/{}", env!("CARGO_PKG_VERSION")),
            page_url: "/".to_string(),
        }
    }
}

/// One page visit: cache manager + lazily-initialized metrics collector.
pub struct PageSession {
    cache: CacheManager,
    host: Arc<dyn SignalHost>,
    exporter: AnalyticsExporter,
    collector: OnceCell<Arc<PerformanceCollector>>,
}

impl PageSession {
    pub fn new(
        config: SessionConfig,
        fetcher: Arc<dyn Fetcher>,
        host: Arc<dyn SignalHost>,
    ) -> Self {
        let exporter = AnalyticsExporter::new(
            config.analytics_endpoint.clone(),
            config.user_agent.clone(),
            config.page_url.clone(),
        );
        let cache = CacheManager::new(config.cache, Arc::new(GenerationStore::new()), fetcher);

        Self {
            cache,
            host,
            exporter,
            collector: OnceCell::new(),
        }
    }

    /// Start both subsystems.
    ///
    /// The collector comes up first so metrics capture survives a cache
    /// setup failure; an install failure still surfaces to the caller.
    pub async fn start(&self) -> Result<(), CoreError> {
        let _ = self.collector();
        self.cache.install().await?;
        self.cache.activate().await?;
        info!("Page session started");
        Ok(())
    }

    /// The session's metrics collector, created on first access.
    ///
    /// Repeated calls return the same instance.
    pub fn collector(&self) -> Arc<PerformanceCollector> {
        let collector = self
            .collector
            .get_or_init(|| Arc::new(PerformanceCollector::new(self.host.as_ref())));
        Arc::clone(collector)
    }

    pub fn cache(&self) -> &CacheManager {
        &self.cache
    }

    /// Page-unload analogue: best-effort final metrics send, then detach
    /// all listeners. Returns the reported payload, or `None` if the
    /// collector was never initialized.
    pub async fn finish(&self) -> Option<AnalyticsPayload> {
        let collector = self.collector.get()?;
        let payload = self.exporter.send(collector.snapshot()).await;
        collector.shutdown();
        info!("Page session finished");
        Some(payload)
    }
}
