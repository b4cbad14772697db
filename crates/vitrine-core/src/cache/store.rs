//! Generation store backed by DashMap
//!
//! One named generation per cache version; each generation maps request
//! keys to immutable response snapshots. Entry-level operations are atomic
//! (DashMap shard locking); concurrent writes to the same key are
//! last-write-wins, which is all the interception path requires.

use crate::cache::types::{CacheKey, ResponseSnapshot};
use crate::error::CoreError;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

/// One versioned set of cached entries
#[derive(Debug, Default)]
struct Generation {
    entries: DashMap<CacheKey, Arc<ResponseSnapshot>>,
}

/// Thread-safe store of named cache generations
#[derive(Debug, Default)]
pub struct GenerationStore {
    generations: DashMap<String, Arc<Generation>>,
}

impl GenerationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a generation, creating it if absent
    pub fn open(&self, name: &str) {
        if !self.generations.contains_key(name) {
            self.generations
                .insert(name.to_string(), Arc::new(Generation::default()));
            debug!(generation = name, "Cache generation created");
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.generations.contains_key(name)
    }

    /// Names of all existing generations
    pub fn generation_names(&self) -> Vec<String> {
        self.generations
            .iter()
            .map(|entry| entry.key().clone())
            .collect()
    }

    /// Delete a whole generation; returns true if one existed
    pub fn delete(&self, name: &str) -> bool {
        let removed = self.generations.remove(name).is_some();
        if removed {
            debug!(generation = name, "Cache generation deleted");
        }
        removed
    }

    /// Look up an entry in a generation
    pub fn get(&self, name: &str, key: &CacheKey) -> Option<Arc<ResponseSnapshot>> {
        let generation = self.generations.get(name)?;
        let entry = generation.entries.get(key)?;
        Some(Arc::clone(entry.value()))
    }

    /// Store an entry (last-write-wins); fails if the generation is missing
    pub fn put(
        &self,
        name: &str,
        key: CacheKey,
        snapshot: ResponseSnapshot,
    ) -> Result<(), CoreError> {
        let generation = self
            .generations
            .get(name)
            .ok_or_else(|| CoreError::GenerationNotFound {
                name: name.to_string(),
            })?;
        generation.entries.insert(key, Arc::new(snapshot));
        Ok(())
    }

    /// Number of entries in a generation (0 if it does not exist)
    pub fn entry_count(&self, name: &str) -> usize {
        self.generations
            .get(name)
            .map(|generation| generation.entries.len())
            .unwrap_or(0)
    }

    /// Store-wide statistics
    pub fn stats(&self) -> StoreStats {
        let mut total_entries = 0;
        let mut total_body_bytes = 0;
        for generation in self.generations.iter() {
            total_entries += generation.entries.len();
            total_body_bytes += generation
                .entries
                .iter()
                .map(|entry| entry.value().body_len())
                .sum::<usize>();
        }
        StoreStats {
            generation_count: self.generations.len(),
            total_entries,
            total_body_bytes,
        }
    }
}

/// Store statistics
#[derive(Debug, Clone)]
pub struct StoreStats {
    pub generation_count: usize,
    pub total_entries: usize,
    pub total_body_bytes: usize,
}
