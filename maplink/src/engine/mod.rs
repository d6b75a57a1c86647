//! The native engine side of the boundary.
//!
//! [`OfflineEngine`] is the narrow interface the bridge consumes; the data
//! types here are engine-owned and pass through the bridge opaquely.
//! [`MemoryEngine`] is a complete in-process implementation with its own
//! worker pool.

mod memory;
mod traits;
mod types;

pub use memory::MemoryEngine;
pub use traits::{
    CreateContinuation, CreateOutcome, EngineError, ListContinuation, ListOutcome, OfflineEngine,
};
pub use types::{
    CachedResponse, DownloadState, LatLngBounds, Region, RegionDefinition, RegionId, RegionStatus,
    ResourceKey, ResourceKind, TilePyramidDefinition, TileScheme,
};
