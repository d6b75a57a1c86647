//! Asynchronous operation brokering.
//!
//! Each submission is a two-state machine. `begin` produces a
//! [`PendingOperation`]: the callback object and the owning cache handle are
//! pinned, and the record is moved into the engine continuation. When the
//! continuation fires on an engine worker thread, `complete` consumes the
//! record: the thread enters the host context, exactly one of
//! {error, success, silent no-op} is dispatched, then the pins release and
//! the context exits.
//!
//! Dispatch-after-terminal and double dispatch are impossible by
//! construction: `complete` takes the operation by value, so a second
//! terminal transition does not typecheck. Pin release and context exit are
//! RAII-backed, so they run even when the dispatched callback unwinds.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::engine::EngineError;
use crate::host::{CacheHandle, CacheRef, ContextGuard, ErrorCallback, HostHandle, HostRuntime};
use crate::pin::{PinRegistry, PinToken};
use crate::telemetry::BridgeMetrics;

/// What a pending operation was submitted to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    /// Listing all known regions.
    ListRegions,
    /// Creating a new region.
    CreateRegion,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::ListRegions => write!(f, "list-regions"),
            OperationKind::CreateRegion => write!(f, "create-region"),
        }
    }
}

/// Issues asynchronous operations against the engine on behalf of the host.
///
/// The broker owns no per-operation state; each submission gets its own
/// [`PendingOperation`] with disjoint pins, so concurrent submissions need
/// no coordination.
pub struct OperationBroker {
    pins: Arc<PinRegistry>,
    runtime: Arc<dyn HostRuntime>,
    metrics: Arc<BridgeMetrics>,
}

impl OperationBroker {
    /// Create a broker over the given pin registry and host runtime.
    pub fn new(
        pins: Arc<PinRegistry>,
        runtime: Arc<dyn HostRuntime>,
        metrics: Arc<BridgeMetrics>,
    ) -> Self {
        Self {
            pins,
            runtime,
            metrics,
        }
    }

    /// Pin everything one submission needs and record it as pending.
    ///
    /// The returned record must be moved into the engine continuation; the
    /// continuation carries only pinned references, never bare host
    /// pointers.
    pub fn begin<C>(
        &self,
        kind: OperationKind,
        cache: &CacheHandle,
        callback: &HostHandle<C>,
    ) -> PendingOperation<C>
    where
        C: ErrorCallback + 'static,
    {
        let callback = self.pins.acquire(callback);
        let owner = self.pins.acquire(cache);
        self.metrics.operation_submitted();
        trace!(%kind, callback = %callback.handle().id(), "operation submitted");

        PendingOperation {
            kind,
            callback,
            owner,
            runtime: Arc::clone(&self.runtime),
            metrics: Arc::clone(&self.metrics),
        }
    }
}

/// One in-flight operation: pinned host references plus the operation kind.
///
/// Created when the native call is issued; consumed by [`complete`], the
/// single terminal transition.
///
/// [`complete`]: PendingOperation::complete
pub struct PendingOperation<C: ErrorCallback> {
    kind: OperationKind,
    callback: PinToken<C>,
    owner: PinToken<CacheRef>,
    runtime: Arc<dyn HostRuntime>,
    metrics: Arc<BridgeMetrics>,
}

impl<C: ErrorCallback> PendingOperation<C> {
    /// The operation kind this record was submitted as.
    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    /// Terminal transition: dispatch exactly one outcome to the host.
    ///
    /// Called from the engine continuation, on an arbitrary worker thread.
    /// The thread is attached to the host context for the duration of the
    /// dispatch. Outcomes:
    ///
    /// - `Err(_)` invokes `on_error` with the rendered message;
    /// - `Ok(None)` dispatches nothing (a valid terminal state);
    /// - `Ok(Some(value))` invokes `on_success` with the pinned callback,
    ///   the owning cache handle, and the value.
    pub fn complete<T, F>(self, outcome: Result<Option<T>, EngineError>, on_success: F)
    where
        F: FnOnce(&C, &CacheHandle, T),
    {
        let PendingOperation {
            kind,
            callback,
            owner,
            runtime,
            metrics,
        } = self;

        let guard = ContextGuard::enter(runtime);

        match outcome {
            Err(error) => {
                debug!(%kind, %error, "operation failed");
                metrics.operation_failed();
                callback.on_error(error.to_string());
            }
            Ok(None) => {
                // Nothing to report; deliberately silent toward the host.
                trace!(%kind, "operation completed without a result");
                metrics.operation_empty();
            }
            Ok(Some(value)) => {
                trace!(%kind, "operation completed");
                metrics.operation_succeeded();
                on_success(&callback, owner.handle(), value);
            }
        }

        // Pins release only after the dispatched callback has returned; the
        // context detaches last.
        drop(callback);
        drop(owner);
        drop(guard);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MemoryEngine;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct RecordingRuntime {
        attaches: AtomicUsize,
        detaches: AtomicUsize,
    }

    impl HostRuntime for RecordingRuntime {
        fn attach_current_thread(&self) {
            self.attaches.fetch_add(1, Ordering::SeqCst);
        }

        fn detach_current_thread(&self) {
            self.detaches.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[derive(Default)]
    struct RecordingCallback {
        errors: Mutex<Vec<String>>,
    }

    impl ErrorCallback for RecordingCallback {
        fn on_error(&self, message: String) {
            self.errors.lock().push(message);
        }
    }

    struct Fixture {
        pins: Arc<PinRegistry>,
        runtime: Arc<RecordingRuntime>,
        metrics: Arc<BridgeMetrics>,
        broker: OperationBroker,
        cache: CacheHandle,
    }

    fn fixture() -> Fixture {
        let pins = Arc::new(PinRegistry::new());
        let runtime = Arc::new(RecordingRuntime::default());
        let metrics = Arc::new(BridgeMetrics::new());
        let broker = OperationBroker::new(
            Arc::clone(&pins),
            runtime.clone(),
            Arc::clone(&metrics),
        );
        let engine = Arc::new(MemoryEngine::new().unwrap());
        let cache = CacheHandle::new(CacheRef::new(engine));
        Fixture {
            pins,
            runtime,
            metrics,
            broker,
            cache,
        }
    }

    #[test]
    fn test_begin_pins_callback_and_owner() {
        let fx = fixture();
        let callback = HostHandle::new(RecordingCallback::default());

        let pending = fx.broker.begin(OperationKind::ListRegions, &fx.cache, &callback);

        assert_eq!(fx.pins.pin_count(callback.id()), 1);
        assert_eq!(fx.pins.pin_count(fx.cache.id()), 1);
        assert_eq!(pending.kind(), OperationKind::ListRegions);
        assert_eq!(fx.metrics.snapshot().operations_submitted, 1);
    }

    #[test]
    fn test_error_outcome_dispatches_message_and_releases_pins() {
        let fx = fixture();
        let callback = HostHandle::new(RecordingCallback::default());
        let pending = fx.broker.begin(OperationKind::ListRegions, &fx.cache, &callback);

        let outcome: Result<Option<()>, EngineError> =
            Err(EngineError::Storage("disk full".to_string()));
        pending.complete(outcome, |_, _, _| panic!("success path must not run"));

        let errors = callback.get().errors.lock();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("disk full"));
        drop(errors);

        assert_eq!(fx.pins.pin_count(callback.id()), 0);
        assert_eq!(fx.pins.pin_count(fx.cache.id()), 0);
        assert_eq!(fx.metrics.snapshot().operations_failed, 1);
    }

    #[test]
    fn test_empty_outcome_dispatches_nothing() {
        let fx = fixture();
        let callback = HostHandle::new(RecordingCallback::default());
        let pending = fx.broker.begin(OperationKind::ListRegions, &fx.cache, &callback);

        let outcome: Result<Option<Vec<u8>>, EngineError> = Ok(None);
        pending.complete(outcome, |_, _, _| panic!("no-op must not dispatch"));

        assert!(callback.get().errors.lock().is_empty());
        assert_eq!(fx.pins.pin_count(callback.id()), 0);
        assert_eq!(fx.metrics.snapshot().operations_empty, 1);
    }

    #[test]
    fn test_success_outcome_runs_success_path_under_context() {
        let fx = fixture();
        let callback = HostHandle::new(RecordingCallback::default());
        let pending = fx.broker.begin(OperationKind::CreateRegion, &fx.cache, &callback);

        let mut delivered = None;
        pending.complete(Ok(Some(42u32)), |_, cache, value| {
            // Dispatch runs attached to the host context.
            assert_eq!(fx.runtime.attaches.load(Ordering::SeqCst), 1);
            assert_eq!(fx.runtime.detaches.load(Ordering::SeqCst), 0);
            assert_eq!(cache.id(), fx.cache.id());
            delivered = Some(value);
        });

        assert_eq!(delivered, Some(42));
        assert_eq!(fx.runtime.detaches.load(Ordering::SeqCst), 1);
        assert_eq!(fx.metrics.snapshot().operations_succeeded, 1);
    }

    #[test]
    fn test_concurrent_submissions_pin_the_same_cache_independently() {
        let fx = fixture();
        let first_callback = HostHandle::new(RecordingCallback::default());
        let second_callback = HostHandle::new(RecordingCallback::default());

        let first = fx
            .broker
            .begin(OperationKind::ListRegions, &fx.cache, &first_callback);
        let second = fx
            .broker
            .begin(OperationKind::ListRegions, &fx.cache, &second_callback);

        assert_eq!(fx.pins.pin_count(fx.cache.id()), 2);

        first.complete(Ok::<Option<()>, EngineError>(None), |_, _, _| {});
        assert_eq!(fx.pins.pin_count(fx.cache.id()), 1);

        second.complete(Ok::<Option<()>, EngineError>(None), |_, _, _| {});
        assert_eq!(fx.pins.pin_count(fx.cache.id()), 0);
    }

    #[test]
    fn test_panicking_dispatch_still_releases_pins_and_context() {
        let fx = fixture();
        let callback = HostHandle::new(RecordingCallback::default());
        let pending = fx.broker.begin(OperationKind::ListRegions, &fx.cache, &callback);

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            pending.complete(Ok(Some(())), |_, _, _| panic!("host callback failed"));
        }));

        assert!(result.is_err());
        assert_eq!(fx.pins.pin_count(callback.id()), 0);
        assert_eq!(fx.pins.pin_count(fx.cache.id()), 0);
        assert_eq!(fx.runtime.detaches.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_operation_kind_display() {
        assert_eq!(OperationKind::ListRegions.to_string(), "list-regions");
        assert_eq!(OperationKind::CreateRegion.to_string(), "create-region");
    }
}
