//! Cache size limiting.
//!
//! Propagates the maximum cached tile count into the engine. The limit is a
//! single process-wide scalar, last write wins; eviction under the limit is
//! the engine's own policy and is opaque here.

use std::sync::Arc;

use tracing::debug;

use crate::engine::OfflineEngine;

/// Forwards the tile count limit to the engine.
pub struct CacheLimiter {
    engine: Arc<dyn OfflineEngine>,
}

impl CacheLimiter {
    /// Create a limiter over the given engine.
    pub fn new(engine: Arc<dyn OfflineEngine>) -> Self {
        Self { engine }
    }

    /// Apply a new maximum cached tile count.
    ///
    /// Cannot fail observably; the engine enforces the limit through its
    /// own eviction.
    pub fn set_max_cached_tile_count(&self, limit: u64) {
        debug!(limit, "forwarding tile count limit");
        self.engine.set_max_cached_tile_count(limit);
    }
}
