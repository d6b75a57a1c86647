//! The native engine boundary.
//!
//! [`OfflineEngine`] is the narrow interface the bridge consumes. The
//! engine's scheduling, retry, and storage internals are invisible here;
//! the trait only promises that asynchronous operations return immediately
//! and deliver their outcome later, through a continuation invoked on an
//! engine-owned worker thread.
//!
//! # Outcome shape
//!
//! Listing and creation complete with `Result<Option<T>, EngineError>`:
//!
//! - `Err(_)` — the operation failed; the error renders to a message.
//! - `Ok(None)` — the operation succeeded but produced nothing to report.
//!   This is a valid terminal state distinct from an empty list.
//! - `Ok(Some(_))` — the operation succeeded with a result.
//!
//! # Dyn Compatibility
//!
//! The trait is object-safe: continuations are boxed `FnOnce` values so the
//! bridge can hold `Arc<dyn OfflineEngine>`.

use bytes::Bytes;
use thiserror::Error;

use super::types::{CachedResponse, Region, RegionDefinition, ResourceKey};

/// Errors produced by the engine.
///
/// These never cross the bridge structurally; the host only ever sees the
/// `Display` rendering through an `on_error` callback.
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    /// The region definition was rejected.
    #[error("invalid region definition: {0}")]
    InvalidDefinition(String),

    /// Storage failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// Any other engine-internal failure.
    #[error("engine error: {0}")]
    Internal(String),
}

/// Terminal outcome of a region listing.
pub type ListOutcome = Result<Option<Vec<Region>>, EngineError>;

/// Terminal outcome of a region creation.
pub type CreateOutcome = Result<Option<Region>, EngineError>;

/// Continuation invoked once with the outcome of a listing.
pub type ListContinuation = Box<dyn FnOnce(ListOutcome) + Send + 'static>;

/// Continuation invoked once with the outcome of a creation.
pub type CreateContinuation = Box<dyn FnOnce(CreateOutcome) + Send + 'static>;

/// A native offline-map engine instance.
///
/// Asynchronous operations (`list_regions`, `create_region`) suspend only
/// from the caller's perspective: the call returns immediately and the
/// continuation fires later on an engine worker thread. No ordering is
/// guaranteed between the completions of independent calls. Cache writes
/// (`store_resource`) and configuration (`set_max_cached_tile_count`,
/// `clear_all`) are synchronous and return once the engine has accepted
/// them.
///
/// The engine serializes cache access internally; callers add no locking.
pub trait OfflineEngine: Send + Sync {
    /// Request all known regions.
    ///
    /// The continuation receives the regions in engine-defined order.
    fn list_regions(&self, on_done: ListContinuation);

    /// Create a new offline region.
    ///
    /// Definition validation is the engine's responsibility; a rejected
    /// definition surfaces as `Err(EngineError::InvalidDefinition)`.
    /// `metadata` is stored opaquely; an empty blob means none.
    fn create_region(&self, definition: RegionDefinition, metadata: Bytes, on_done: CreateContinuation);

    /// Store a resource in the cache as if it had been fetched.
    ///
    /// Fire-and-forget: storage failures are logged by the engine and never
    /// reported back.
    fn store_resource(&self, key: ResourceKey, response: CachedResponse);

    /// Apply a new maximum cached tile count. Last write wins.
    fn set_max_cached_tile_count(&self, limit: u64);

    /// Remove every cached resource.
    fn clear_all(&self);
}
