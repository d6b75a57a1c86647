//! The bridge surface exposed to the host application.
//!
//! [`OfflineBridge`] wires one engine instance to one host runtime and
//! exposes the offline-map operations: listing and creating regions,
//! seeding the resource cache, bounding cache size, and clearing. It is a
//! boundary, not a store — no wire protocol or file format is owned here.

mod broker;
mod directory;
mod limiter;
mod seeder;

pub use broker::{OperationBroker, OperationKind, PendingOperation};
pub use directory::{RegionDirectory, RegionHandle};
pub use limiter::CacheLimiter;
pub use seeder::{ResourceCacheSeeder, SEED_LIFETIME_DAYS};

use std::sync::Arc;

use crate::engine::{OfflineEngine, RegionDefinition};
use crate::host::{
    CacheHandle, CacheRef, CreateRegionCallback, HostHandle, HostRuntime, ListRegionsCallback,
};
use crate::pin::PinRegistry;
use crate::telemetry::{BridgeMetrics, MetricsSnapshot};

/// The host-visible offline-map manager.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use maplink::bridge::OfflineBridge;
/// use maplink::engine::MemoryEngine;
/// use maplink::host::HostRuntime;
///
/// struct Detached;
/// impl HostRuntime for Detached {
///     fn attach_current_thread(&self) {}
///     fn detach_current_thread(&self) {}
/// }
///
/// let engine = Arc::new(MemoryEngine::new().unwrap());
/// let bridge = OfflineBridge::new(engine, Arc::new(Detached));
///
/// bridge.set_offline_tile_count_limit(6_000);
/// bridge.put_resource("https://example/style.json", b"{}");
/// ```
pub struct OfflineBridge {
    engine: Arc<dyn OfflineEngine>,
    directory: RegionDirectory,
    seeder: ResourceCacheSeeder,
    limiter: CacheLimiter,
    pins: Arc<PinRegistry>,
    metrics: Arc<BridgeMetrics>,
}

impl OfflineBridge {
    /// Bridge the given engine to the given host runtime.
    pub fn new(engine: Arc<dyn OfflineEngine>, runtime: Arc<dyn HostRuntime>) -> Self {
        let pins = Arc::new(PinRegistry::new());
        let metrics = Arc::new(BridgeMetrics::new());
        let broker = OperationBroker::new(Arc::clone(&pins), runtime, Arc::clone(&metrics));

        Self {
            directory: RegionDirectory::new(Arc::clone(&engine), broker),
            seeder: ResourceCacheSeeder::new(Arc::clone(&engine), Arc::clone(&metrics)),
            limiter: CacheLimiter::new(Arc::clone(&engine)),
            engine,
            pins,
            metrics,
        }
    }

    /// Create a host-visible handle to this bridge's cache instance.
    ///
    /// The host passes the handle back into [`list_offline_regions`] and
    /// [`create_offline_regions`]; region handles are paired with it.
    ///
    /// [`list_offline_regions`]: OfflineBridge::list_offline_regions
    /// [`create_offline_regions`]: OfflineBridge::create_offline_region
    pub fn cache_handle(&self) -> CacheHandle {
        CacheHandle::new(CacheRef::new(Arc::clone(&self.engine)))
    }

    /// Apply a new maximum cached tile count. Last write wins.
    pub fn set_offline_tile_count_limit(&self, limit: u64) {
        self.limiter.set_max_cached_tile_count(limit);
    }

    /// Request all known regions; completion arrives on an engine worker
    /// thread through `callback`.
    pub fn list_offline_regions<C>(&self, cache: &CacheHandle, callback: &HostHandle<C>)
    where
        C: ListRegionsCallback + 'static,
    {
        self.directory.list(cache, callback);
    }

    /// Create a new offline region; completion arrives on an engine worker
    /// thread through `callback`.
    pub fn create_offline_region<C>(
        &self,
        cache: &CacheHandle,
        definition: RegionDefinition,
        metadata: Option<&[u8]>,
        callback: &HostHandle<C>,
    ) where
        C: CreateRegionCallback + 'static,
    {
        self.directory.create(cache, definition, metadata, callback);
    }

    /// Remove every cached resource. Regions are unaffected.
    pub fn clear(&self) {
        self.engine.clear_all();
    }

    /// Seed a plain URL resource into the cache.
    pub fn put_resource(&self, url: &str, bytes: &[u8]) {
        self.seeder.seed_plain_resource(url, bytes);
    }

    /// Seed one tile into the cache.
    pub fn put_tile(&self, url_template: &str, pixel_ratio: f32, x: u32, y: u32, z: u8, bytes: &[u8]) {
        self.seeder.seed_tile(url_template, pixel_ratio, x, y, z, bytes);
    }

    /// Point-in-time copy of the bridge counters.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// The pin registry backing this bridge's submissions.
    pub fn pins(&self) -> &Arc<PinRegistry> {
        &self.pins
    }
}
