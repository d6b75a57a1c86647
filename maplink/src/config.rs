//! Engine configuration.
//!
//! Configuration for the in-process reference engine. The bridge itself has
//! no tunables; everything here belongs to the engine side of the boundary.

/// Default maximum number of cached tiles.
///
/// Matches the default limit the offline engine ships with. The host can
/// override it at any time through `set_offline_tile_count_limit`.
pub const DEFAULT_TILE_COUNT_LIMIT: u64 = 6_000;

/// Default number of engine worker threads.
pub const DEFAULT_WORKER_THREADS: usize = 2;

/// Configuration for [`MemoryEngine`](crate::engine::MemoryEngine).
///
/// # Example
///
/// ```
/// use maplink::config::EngineConfig;
///
/// let config = EngineConfig::default();
/// assert_eq!(config.worker_threads, 2);
/// assert_eq!(config.max_cached_tile_count, 6_000);
/// ```
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Number of worker threads in the engine's internal pool.
    ///
    /// Completion callbacks for asynchronous operations are delivered from
    /// these threads, never from the submitting thread.
    pub worker_threads: usize,

    /// Initial maximum number of cached tiles.
    pub max_cached_tile_count: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            worker_threads: DEFAULT_WORKER_THREADS,
            max_cached_tile_count: DEFAULT_TILE_COUNT_LIMIT,
        }
    }
}
