//! Host-side binding to a native cache instance.
//!
//! The host addresses a particular native cache/file-source through a
//! [`CacheRef`] wrapped in a [`HostHandle`]. Region handles returned by the
//! bridge are paired with the cache handle they were listed or created
//! through, so later region operations can pinpoint the owning instance.

use std::fmt;
use std::sync::Arc;

use crate::engine::OfflineEngine;
use crate::host::handle::HostHandle;

/// The host-visible handle to a native cache instance.
pub type CacheHandle = HostHandle<CacheRef>;

/// Binding between a host object and the native engine instance it owns.
pub struct CacheRef {
    engine: Arc<dyn OfflineEngine>,
}

impl CacheRef {
    /// Bind a host object to a native engine instance.
    pub fn new(engine: Arc<dyn OfflineEngine>) -> Self {
        Self { engine }
    }

    /// The native engine this cache reference points at.
    pub fn engine(&self) -> &Arc<dyn OfflineEngine> {
        &self.engine
    }
}

impl fmt::Debug for CacheRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheRef").finish_non_exhaustive()
    }
}
