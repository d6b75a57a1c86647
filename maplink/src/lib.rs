//! MapLink - asynchronous bridge to a native offline-map engine.
//!
//! This library connects a managed host application (garbage-collected
//! objects, runtime-attached threads) to a native, thread-pool-based
//! offline-map engine. It reconciles the two lifetime models at the
//! boundary: engine callbacks fire on arbitrary worker threads, while host
//! objects may be finalized at any time and may only be invoked from a
//! thread attached to the host runtime.
//!
//! The bridge does three things, and only three:
//!
//! - **Lifetime pinning**: host objects referenced by an in-flight engine
//!   operation are pinned ([`pin`]) until the operation's single terminal
//!   dispatch.
//! - **Thread-context transitions**: engine worker threads pass through a
//!   [`host::ContextGuard`] before invoking any host callback.
//! - **Boundary translation**: engine regions become host-visible
//!   [`bridge::RegionHandle`]s paired with their owning cache; host bytes
//!   become long-lived cache entries.
//!
//! Everything else — scheduling, retries, storage, rendering — belongs to
//! the engine or the host and is consumed through narrow interfaces.

pub mod bridge;
pub mod config;
pub mod engine;
pub mod host;
pub mod pin;
pub mod telemetry;

pub use bridge::{OfflineBridge, RegionHandle};
pub use engine::{
    EngineError, LatLngBounds, MemoryEngine, OfflineEngine, Region, RegionDefinition, RegionId,
    ResourceKey, TilePyramidDefinition, TileScheme,
};
pub use host::{
    CacheHandle, CacheRef, ContextGuard, CreateRegionCallback, ErrorCallback, HostHandle,
    HostRuntime, ListRegionsCallback,
};
pub use pin::{PinRegistry, PinToken};
