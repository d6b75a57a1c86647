//! Offline cache seeding.
//!
//! Seeding inserts a resource into the engine cache without a network
//! fetch: the host supplies the bytes, the seeder synthesizes a long-lived
//! response and hands it to the engine's "store as if fetched" entry point.
//! Pre-seeded resources are treated as effectively permanent until
//! explicitly cleared.
//!
//! Seeding is fire-and-forget by design: it is best-effort pre-population,
//! not a user-initiated action awaiting a result, so no completion callback
//! exists and storage failures stay engine-internal.

use std::sync::Arc;

use bytes::Bytes;
use chrono::{Duration, Utc};
use tracing::debug;

use crate::engine::{CachedResponse, OfflineEngine, ResourceKey, TileScheme};
use crate::telemetry::BridgeMetrics;

/// How long a seeded resource stays valid.
pub const SEED_LIFETIME_DAYS: i64 = 365;

/// Writes host-supplied resources into the engine cache.
pub struct ResourceCacheSeeder {
    engine: Arc<dyn OfflineEngine>,
    metrics: Arc<BridgeMetrics>,
}

impl ResourceCacheSeeder {
    /// Create a seeder over the given engine.
    pub fn new(engine: Arc<dyn OfflineEngine>, metrics: Arc<BridgeMetrics>) -> Self {
        Self { engine, metrics }
    }

    /// Seed a plain URL resource.
    ///
    /// The payload is copied before the call returns; the caller's buffer
    /// may be reused immediately.
    pub fn seed_plain_resource(&self, url: &str, bytes: &[u8]) {
        self.store(ResourceKey::url(url), bytes);
    }

    /// Seed one tile of a tile pyramid.
    ///
    /// Tiles are addressed by URL template, pixel ratio, and XYZ grid
    /// coordinates. The payload is copied before the call returns.
    pub fn seed_tile(&self, url_template: &str, pixel_ratio: f32, x: u32, y: u32, z: u8, bytes: &[u8]) {
        self.store(
            ResourceKey::tile(url_template, pixel_ratio, x, y, z, TileScheme::Xyz),
            bytes,
        );
    }

    fn store(&self, key: ResourceKey, bytes: &[u8]) {
        // No validation metadata: a seeded entry is never revalidated.
        let response = CachedResponse::new(
            Bytes::copy_from_slice(bytes),
            Utc::now() + Duration::days(SEED_LIFETIME_DAYS),
        );

        debug!(key = %key.cache_key(), size = bytes.len(), "seeding cache resource");
        self.engine.store_resource(key, response);
        self.metrics.resource_seeded();
    }
}
