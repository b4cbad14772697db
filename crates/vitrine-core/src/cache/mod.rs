//! Static asset caching layer for vitrine
//!
//! Versioned cache generations, manifest precaching, and a cache-first
//! request interception policy with an offline navigation fallback.

pub mod fetcher;
pub mod manager;
pub mod store;
pub mod types;

pub use fetcher::{Fetcher, HttpFetcher};
pub use manager::{CacheConfig, CacheManager, Phase};
pub use store::{GenerationStore, StoreStats};
pub use types::{AssetRequest, CacheKey, Method, RequestKind, ResponseSnapshot};
