//! In-memory reference engine.
//!
//! A complete in-process implementation of [`OfflineEngine`] backing the
//! integration suite and host embeddings that want an engine without native
//! storage. It keeps the contract the bridge depends on: asynchronous
//! operations return immediately and complete on a worker thread from the
//! engine's own pool, never on the submitting thread.
//!
//! # Storage
//!
//! Resources live in a `DashMap` keyed by the debuggable
//! [`ResourceKey::cache_key`] string. Tile entries additionally join an
//! insertion-order queue used for eviction: when the cached tile count
//! exceeds the configured limit, oldest tiles are evicted first. Plain
//! resources are not counted against the tile limit.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use tokio::runtime::Runtime;
use tracing::{debug, trace, warn};

use crate::config::EngineConfig;

use super::traits::{CreateContinuation, EngineError, ListContinuation, OfflineEngine};
use super::types::{CachedResponse, Region, RegionDefinition, RegionId, ResourceKey};

/// In-memory offline-map engine with an internal worker pool.
pub struct MemoryEngine {
    state: Arc<EngineState>,
    workers: Runtime,
}

struct EngineState {
    /// Known regions, in creation order. Listing preserves this order.
    regions: RwLock<Vec<Region>>,
    next_region_id: AtomicU64,

    /// Cached resources keyed by `ResourceKey::cache_key()`.
    resources: DashMap<String, CachedResponse>,
    /// Insertion order of tile keys, for eviction.
    tile_order: Mutex<VecDeque<String>>,
    /// Maximum cached tile count. Last write wins.
    max_tiles: AtomicU64,
}

impl MemoryEngine {
    /// Create an engine with the default configuration.
    pub fn new() -> Result<Self, EngineError> {
        Self::with_config(&EngineConfig::default())
    }

    /// Create an engine with the given configuration.
    pub fn with_config(config: &EngineConfig) -> Result<Self, EngineError> {
        let workers = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(config.worker_threads.max(1))
            .thread_name("maplink-engine")
            .build()
            .map_err(|e| EngineError::Internal(format!("failed to start worker pool: {e}")))?;

        Ok(Self {
            state: Arc::new(EngineState {
                regions: RwLock::new(Vec::new()),
                next_region_id: AtomicU64::new(1),
                resources: DashMap::new(),
                tile_order: Mutex::new(VecDeque::new()),
                max_tiles: AtomicU64::new(config.max_cached_tile_count),
            }),
            workers,
        })
    }

    /// Look up a cached resource.
    pub fn lookup(&self, key: &ResourceKey) -> Option<CachedResponse> {
        self.state
            .resources
            .get(&key.cache_key())
            .map(|entry| entry.clone())
    }

    /// Number of cached resources, tiles included.
    pub fn cached_resource_count(&self) -> usize {
        self.state.resources.len()
    }

    /// Number of cached tiles.
    pub fn cached_tile_count(&self) -> u64 {
        self.state.tile_order.lock().len() as u64
    }

    /// The currently applied tile count limit.
    pub fn max_cached_tile_count(&self) -> u64 {
        self.state.max_tiles.load(Ordering::Relaxed)
    }

    /// Number of known regions.
    pub fn region_count(&self) -> usize {
        self.state.regions.read().len()
    }
}

impl EngineState {
    fn validate(definition: &RegionDefinition) -> Result<(), EngineError> {
        match definition {
            RegionDefinition::TilePyramid(pyramid) => {
                if pyramid.style_url.is_empty() {
                    return Err(EngineError::InvalidDefinition(
                        "style URL must not be empty".to_string(),
                    ));
                }
                if pyramid.min_zoom > pyramid.max_zoom {
                    return Err(EngineError::InvalidDefinition(format!(
                        "minZoom {} exceeds maxZoom {}",
                        pyramid.min_zoom, pyramid.max_zoom
                    )));
                }
                if !pyramid.bounds.is_ordered() {
                    return Err(EngineError::InvalidDefinition(
                        "bounds are not south/west to north/east ordered".to_string(),
                    ));
                }
                Ok(())
            }
        }
    }

    fn create_region(&self, definition: RegionDefinition, metadata: Bytes) -> Result<Region, EngineError> {
        Self::validate(&definition)?;

        let id = RegionId(self.next_region_id.fetch_add(1, Ordering::Relaxed));
        let region = Region::new(id, definition, metadata);
        self.regions.write().push(region.clone());
        debug!(region = %id, "offline region created");
        Ok(region)
    }

    fn store(&self, key: ResourceKey, response: CachedResponse) {
        let cache_key = key.cache_key();
        let is_tile = key.is_tile();

        self.resources.insert(cache_key.clone(), response);
        trace!(key = %cache_key, "resource stored");

        if is_tile {
            let mut order = self.tile_order.lock();
            // A rewrite moves the tile to the back of the eviction order.
            order.retain(|existing| existing != &cache_key);
            order.push_back(cache_key);
            self.enforce_tile_limit(&mut order);
        }
    }

    fn enforce_tile_limit(&self, order: &mut VecDeque<String>) {
        let limit = self.max_tiles.load(Ordering::Relaxed);
        while order.len() as u64 > limit {
            // Oldest first.
            let Some(evicted) = order.pop_front() else {
                break;
            };
            self.resources.remove(&evicted);
            debug!(key = %evicted, limit, "tile evicted");
        }
    }
}

impl OfflineEngine for MemoryEngine {
    fn list_regions(&self, on_done: ListContinuation) {
        let state = Arc::clone(&self.state);
        self.workers.spawn(async move {
            let snapshot = state.regions.read().clone();
            on_done(Ok(Some(snapshot)));
        });
    }

    fn create_region(&self, definition: RegionDefinition, metadata: Bytes, on_done: CreateContinuation) {
        let state = Arc::clone(&self.state);
        self.workers.spawn(async move {
            let outcome = state.create_region(definition, metadata);
            if let Err(ref error) = outcome {
                warn!(%error, "region creation rejected");
            }
            on_done(outcome.map(Some));
        });
    }

    fn store_resource(&self, key: ResourceKey, response: CachedResponse) {
        self.state.store(key, response);
    }

    fn set_max_cached_tile_count(&self, limit: u64) {
        self.state.max_tiles.store(limit, Ordering::Relaxed);
        debug!(limit, "tile count limit applied");

        let mut order = self.state.tile_order.lock();
        self.state.enforce_tile_limit(&mut order);
    }

    fn clear_all(&self) {
        let mut order = self.state.tile_order.lock();
        self.state.resources.clear();
        order.clear();
        debug!("resource cache cleared");
    }
}
