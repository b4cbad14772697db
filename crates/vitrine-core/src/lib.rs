//! vitrine-core - Runtime core for the vitrine portfolio site
//!
//! Two independent subsystems, composed only by being started together at
//! page load:
//!
//! - [`cache`]: versioned static asset cache with manifest precaching and
//!   cache-first request interception.
//! - [`metrics`]: passive web-vitals collector with snapshot, scoring and
//!   analytics export.

pub mod cache;
pub mod error;
pub mod metrics;
pub mod session;

pub use cache::{AssetRequest, CacheConfig, CacheManager, GenerationStore, HttpFetcher};
pub use error::{CoreError, FetchError};
pub use metrics::{MetricsRecord, PerformanceCollector};
pub use session::{PageSession, SessionConfig};
