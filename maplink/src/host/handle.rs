//! Host object handles.
//!
//! A [`HostHandle`] wraps an object owned by the managed host application.
//! On the host side the object's liveness is governed by a garbage collector;
//! the bridge models that with an identity (`HandleId`) plus an invalidation
//! flag the host flips when its collector finalizes the object. Cloning a
//! handle shares the identity and the underlying object.
//!
//! Handles alone do not grant the bridge the right to call into the object
//! from an engine worker thread. That requires a pin from
//! [`PinRegistry`](crate::pin::PinRegistry), acquired at submission time and
//! released after the terminal dispatch.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Global counter for handle identities.
static NEXT_HANDLE_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identity of a host object.
///
/// Two handles compare equal here exactly when they refer to the same host
/// object, regardless of how many times the handle was cloned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandleId(u64);

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

struct Slot<T> {
    valid: AtomicBool,
    value: T,
}

/// A reference to a host-owned object.
///
/// The wrapped value stays allocated as long as any handle (or pin) exists;
/// `invalidate` marks the host-side object as finalized without freeing the
/// value, mirroring a collector that has run the object's finalizer while a
/// native reference is still outstanding.
pub struct HostHandle<T> {
    id: HandleId,
    slot: Arc<Slot<T>>,
}

impl<T> HostHandle<T> {
    /// Wrap a host object, assigning it a fresh identity.
    pub fn new(value: T) -> Self {
        Self {
            id: HandleId(NEXT_HANDLE_ID.fetch_add(1, Ordering::Relaxed)),
            slot: Arc::new(Slot {
                valid: AtomicBool::new(true),
                value,
            }),
        }
    }

    /// The stable identity of the underlying host object.
    pub fn id(&self) -> HandleId {
        self.id
    }

    /// Whether the host still considers the object alive.
    pub fn is_valid(&self) -> bool {
        self.slot.valid.load(Ordering::Acquire)
    }

    /// Mark the host object as finalized.
    ///
    /// Visible through every clone of this handle. The wrapped value itself
    /// remains allocated until the last handle and pin are gone.
    pub fn invalidate(&self) {
        self.slot.valid.store(false, Ordering::Release);
    }

    /// Access the wrapped object.
    pub fn get(&self) -> &T {
        &self.slot.value
    }
}

impl<T> Clone for HostHandle<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T> std::ops::Deref for HostHandle<T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.get()
    }
}

impl<T> fmt::Debug for HostHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostHandle")
            .field("id", &self.id)
            .field("valid", &self.is_valid())
            .finish()
    }
}
