//! Region listing and creation.
//!
//! The query/command surface for offline regions, plus the translation from
//! engine-owned [`Region`] values to host-visible [`RegionHandle`]s. The
//! directory forwards definitions opaquely; validation happens in the
//! engine and surfaces only as an error message.

use std::sync::Arc;

use bytes::Bytes;
use tracing::warn;

use crate::engine::{OfflineEngine, Region, RegionDefinition, RegionId};
use crate::host::{CacheHandle, CreateRegionCallback, HostHandle, ListRegionsCallback};

use super::broker::{OperationBroker, OperationKind};

/// Host-visible projection of an offline region.
///
/// Created fresh for each region returned to the host and owned by the host
/// afterwards; the bridge holds no reference once dispatched. The handle is
/// paired with the cache it was listed or created through, so later region
/// operations can pinpoint the owning instance.
#[derive(Debug, Clone)]
pub struct RegionHandle {
    id: RegionId,
    definition: RegionDefinition,
    metadata: Bytes,
    cache: CacheHandle,
}

impl RegionHandle {
    /// Translate an engine region, pairing it with its owning cache.
    ///
    /// The pairing is validated here rather than assumed from global state:
    /// translating against a finalized cache handle is a programming error.
    pub fn from_region(cache: &CacheHandle, region: Region) -> Self {
        if !cache.is_valid() {
            debug_assert!(
                false,
                "region translated against finalized cache handle {}",
                cache.id()
            );
            warn!(cache = %cache.id(), "region translated against finalized cache handle");
        }

        Self {
            id: region.id(),
            definition: region.definition().clone(),
            metadata: region.metadata().clone(),
            cache: cache.clone(),
        }
    }

    /// The region's stable identity.
    pub fn id(&self) -> RegionId {
        self.id
    }

    /// The definition the region was created with.
    pub fn definition(&self) -> &RegionDefinition {
        &self.definition
    }

    /// The host-defined metadata blob. Empty when none was supplied.
    pub fn metadata(&self) -> &Bytes {
        &self.metadata
    }

    /// The cache this region belongs to.
    pub fn cache(&self) -> &CacheHandle {
        &self.cache
    }
}

/// Lists and creates offline regions.
pub struct RegionDirectory {
    engine: Arc<dyn OfflineEngine>,
    broker: OperationBroker,
}

impl RegionDirectory {
    /// Create a directory over the given engine and broker.
    pub fn new(engine: Arc<dyn OfflineEngine>, broker: OperationBroker) -> Self {
        Self { engine, broker }
    }

    /// Request all known regions.
    ///
    /// Returns immediately. On success the callback receives one handle per
    /// region, in the order the engine returned them; an empty vector is a
    /// valid result. A completion with no result dispatches nothing.
    pub fn list<C>(&self, cache: &CacheHandle, callback: &HostHandle<C>)
    where
        C: ListRegionsCallback + 'static,
    {
        let pending = self.broker.begin(OperationKind::ListRegions, cache, callback);
        self.engine.list_regions(Box::new(move |outcome| {
            pending.complete(outcome, |callback, cache, regions| {
                let handles = regions
                    .into_iter()
                    .map(|region| RegionHandle::from_region(cache, region))
                    .collect();
                callback.on_list(handles);
            });
        }));
    }

    /// Create a new offline region.
    ///
    /// The definition is forwarded opaquely. A `None` or zero-length
    /// metadata blob is stored as empty.
    pub fn create<C>(
        &self,
        cache: &CacheHandle,
        definition: RegionDefinition,
        metadata: Option<&[u8]>,
        callback: &HostHandle<C>,
    ) where
        C: CreateRegionCallback + 'static,
    {
        let metadata = metadata
            .filter(|blob| !blob.is_empty())
            .map(Bytes::copy_from_slice)
            .unwrap_or_default();

        let pending = self.broker.begin(OperationKind::CreateRegion, cache, callback);
        self.engine.create_region(
            definition,
            metadata,
            Box::new(move |outcome| {
                pending.complete(outcome, |callback, cache, region| {
                    callback.on_create(RegionHandle::from_region(cache, region));
                });
            }),
        );
    }
}
