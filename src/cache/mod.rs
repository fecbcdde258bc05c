// ABOUTME: In-memory SliceKey -> path index, single-writer (worker) single-reader (driver)
// ABOUTME: Backed by DashMap so the worker-message handler makes progress while the driver blocks on I/O
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use dashmap::DashMap;
use replay_core::SliceKey;
use std::path::PathBuf;
use std::sync::Arc;

/// `CachedSlicePaths`: a mapping from `SliceKey` to filesystem path, owned
/// by the replay driver for the lifetime of one job.
///
/// Invariant: an entry is present only once the corresponding file is fully
/// written and closed — the fetch worker only calls [`CacheIndex::insert`]
/// after the slice file has been renamed into its final, stable path.
#[derive(Clone, Default)]
pub struct CacheIndex {
    entries: Arc<DashMap<SliceKey, PathBuf>>,
}

impl CacheIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Called by the worker-message handler when a slice finishes.
    pub fn insert(&self, key: SliceKey, path: PathBuf) {
        self.entries.insert(key, path);
    }

    /// Non-blocking lookup; the driver's wait loop calls this in a poll.
    #[must_use]
    pub fn get(&self, key: &SliceKey) -> Option<PathBuf> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    /// Drains the entry for `key` — called once the driver has finished
    /// consuming that slice.
    pub fn remove(&self, key: &SliceKey) {
        self.entries.remove(key);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
