//! Error types for vitrine-core
//!
//! Typed errors with thiserror; app-level flows use anyhow with context.

use thiserror::Error;

use crate::cache::manager::Phase;

/// Network-level fetch failure (offline, DNS, connection reset).
///
/// Upstream status codes are *not* errors: a 404 or 500 comes back as a
/// regular `ResponseSnapshot` so callers can decide what to do with it.
#[derive(Error, Debug, Clone)]
#[error("Network fetch failed for {url}: {message}")]
pub struct FetchError {
    pub url: String,
    pub message: String,
}

impl FetchError {
    pub fn new(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            message: message.into(),
        }
    }
}

/// Core error type for vitrine operations
#[derive(Error, Debug)]
pub enum CoreError {
    // ===================
    // Cache install errors
    // ===================
    #[error("Failed to precache manifest asset {path}")]
    ManifestFetch {
        path: String,
        #[source]
        source: FetchError,
    },

    #[error("Unexpected status {status} precaching manifest asset {path}")]
    ManifestStatus { path: String, status: u16 },

    // ===================
    // Cache runtime errors
    // ===================
    #[error("Upstream fetch failed for {url}")]
    UpstreamFetch {
        url: String,
        #[source]
        source: FetchError,
    },

    #[error("Cache generation not found: {name}")]
    GenerationNotFound { name: String },

    // ===================
    // Lifecycle errors
    // ===================
    #[error("Cache manager cannot {operation} while in the {phase} phase")]
    InvalidPhase {
        operation: &'static str,
        phase: Phase,
    },
}
