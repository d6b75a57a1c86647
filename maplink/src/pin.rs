//! Explicit keep-alive pins for host objects.
//!
//! A native asynchronous operation may outlive every host-side reference to
//! the callback it will eventually invoke. Pins extend the lifetime of a
//! host object for the duration of one in-flight operation, independent of
//! host garbage-collection timing: a [`PinToken`] holds a strong reference
//! to the object and registers the pin in a per-identity count, usable from
//! any thread.
//!
//! Pins are reference-counted per object identity. The same cache handle
//! reused across concurrent operations carries one count per outstanding
//! pin; the object stays pinned until the last token is dropped.
//!
//! Acquiring a pin on an already-invalidated host object is a programming
//! error: call sites must pin before the object can be finalized. It is
//! fatal in debug builds and degrades to a logged no-op in release builds.

use std::ops::Deref;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::warn;

use crate::host::{HandleId, HostHandle};

/// Tracks pin counts per host object identity.
///
/// The registry itself holds no object references; the strong reference
/// lives in each [`PinToken`]. The counts exist so the invariant "pins cover
/// every outstanding operation reference" is observable.
#[derive(Debug, Default)]
pub struct PinRegistry {
    counts: DashMap<HandleId, usize>,
}

impl PinRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin a host object for the duration of one in-flight operation.
    ///
    /// Returns a token that keeps the object alive and counted until
    /// dropped. Multiple pins on the same identity stack.
    pub fn acquire<T>(self: &Arc<Self>, handle: &HostHandle<T>) -> PinToken<T> {
        if !handle.is_valid() {
            debug_assert!(
                false,
                "pin acquired on invalidated host object {}",
                handle.id()
            );
            warn!(handle = %handle.id(), "pin acquired on invalidated host object");
        }

        *self.counts.entry(handle.id()).or_insert(0) += 1;

        PinToken {
            handle: handle.clone(),
            registry: Arc::clone(self),
        }
    }

    /// Number of outstanding pins for the given object identity.
    pub fn pin_count(&self, id: HandleId) -> usize {
        self.counts.get(&id).map(|count| *count).unwrap_or(0)
    }

    /// Number of distinct objects currently pinned.
    pub fn pinned_objects(&self) -> usize {
        self.counts.len()
    }

    fn release(&self, id: HandleId) {
        match self.counts.entry(id) {
            Entry::Occupied(mut occupied) => {
                if *occupied.get() <= 1 {
                    occupied.remove();
                } else {
                    *occupied.get_mut() -= 1;
                }
            }
            Entry::Vacant(_) => {
                debug_assert!(false, "pin released twice for host object {id}");
                warn!(handle = %id, "pin released twice for host object");
            }
        }
    }
}

/// A durable reference keeping one host object alive.
///
/// Dropping the token releases the pin. The token dereferences to the
/// pinned object, so completion paths can invoke callback methods directly
/// through it.
pub struct PinToken<T> {
    handle: HostHandle<T>,
    registry: Arc<PinRegistry>,
}

impl<T> PinToken<T> {
    /// The handle this pin keeps alive.
    pub fn handle(&self) -> &HostHandle<T> {
        &self.handle
    }
}

impl<T> Deref for PinToken<T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.handle.get()
    }
}

impl<T> Drop for PinToken<T> {
    fn drop(&mut self) {
        self.registry.release(self.handle.id());
    }
}
