//! Host runtime attachment.
//!
//! Engine completion callbacks arrive on engine-owned worker threads that
//! have no pre-existing relationship with the host runtime. Before any host
//! object method is invoked from such a thread, the thread must be attached
//! to the host's execution context, and detached once no longer needed.
//!
//! [`ContextGuard`] models that as a scope-bound resource: `enter` attaches
//! if the current thread is not already attached, and the guard's `Drop`
//! detaches only if that `enter` performed the attach. Nested guards on the
//! same thread attach and detach exactly once, and the detach runs on every
//! exit path, including unwinding out of a dispatched callback.

use std::cell::Cell;
use std::sync::Arc;

/// The host's execution context, as seen from native threads.
///
/// Implemented by the host embedding. `attach_current_thread` must be safe
/// to call from any thread; the bridge guarantees it is never called twice
/// on a thread without an intervening `detach_current_thread`.
pub trait HostRuntime: Send + Sync {
    /// Attach the calling thread to the host execution context.
    fn attach_current_thread(&self);

    /// Detach the calling thread from the host execution context.
    fn detach_current_thread(&self);
}

thread_local! {
    /// Nesting depth of context guards on this thread. A thread attaches to
    /// at most one host runtime at a time.
    static ATTACH_DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Scope-bound attachment of the current thread to the host runtime.
///
/// # Example
///
/// ```ignore
/// let guard = ContextGuard::enter(runtime);
/// callback.on_list(regions); // safe: thread is attached
/// drop(guard);               // detaches if this guard attached
/// ```
pub struct ContextGuard {
    runtime: Arc<dyn HostRuntime>,
    attached_here: bool,
}

impl ContextGuard {
    /// Attach the current thread if it is not already attached.
    pub fn enter(runtime: Arc<dyn HostRuntime>) -> Self {
        let depth = ATTACH_DEPTH.with(|d| {
            let depth = d.get();
            d.set(depth + 1);
            depth
        });
        let attached_here = depth == 0;
        if attached_here {
            runtime.attach_current_thread();
        }
        Self {
            runtime,
            attached_here,
        }
    }

    /// Whether this guard performed the attach (outermost guard).
    pub fn attached_by_this_guard(&self) -> bool {
        self.attached_here
    }
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        ATTACH_DEPTH.with(|d| d.set(d.get() - 1));
        if self.attached_here {
            self.runtime.detach_current_thread();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct RecordingRuntime {
        attaches: AtomicUsize,
        detaches: AtomicUsize,
    }

    impl RecordingRuntime {
        fn attaches(&self) -> usize {
            self.attaches.load(Ordering::SeqCst)
        }

        fn detaches(&self) -> usize {
            self.detaches.load(Ordering::SeqCst)
        }
    }

    impl HostRuntime for RecordingRuntime {
        fn attach_current_thread(&self) {
            self.attaches.fetch_add(1, Ordering::SeqCst);
        }

        fn detach_current_thread(&self) {
            self.detaches.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_guard_attaches_and_detaches_once() {
        let runtime = Arc::new(RecordingRuntime::default());

        {
            let guard = ContextGuard::enter(runtime.clone());
            assert!(guard.attached_by_this_guard());
            assert_eq!(runtime.attaches(), 1);
            assert_eq!(runtime.detaches(), 0);
        }

        assert_eq!(runtime.attaches(), 1);
        assert_eq!(runtime.detaches(), 1);
    }

    #[test]
    fn test_nested_guards_attach_once() {
        let runtime = Arc::new(RecordingRuntime::default());

        {
            let _outer = ContextGuard::enter(runtime.clone());
            {
                let inner = ContextGuard::enter(runtime.clone());
                assert!(!inner.attached_by_this_guard());
                assert_eq!(runtime.attaches(), 1);
            }
            // Inner guard must not have detached.
            assert_eq!(runtime.detaches(), 0);
        }

        assert_eq!(runtime.attaches(), 1);
        assert_eq!(runtime.detaches(), 1);
    }

    #[test]
    fn test_sequential_guards_each_attach() {
        let runtime = Arc::new(RecordingRuntime::default());

        drop(ContextGuard::enter(runtime.clone()));
        drop(ContextGuard::enter(runtime.clone()));

        assert_eq!(runtime.attaches(), 2);
        assert_eq!(runtime.detaches(), 2);
    }

    #[test]
    fn test_guard_detaches_on_unwind() {
        let runtime = Arc::new(RecordingRuntime::default());
        let runtime_for_panic = runtime.clone();

        let result = std::panic::catch_unwind(move || {
            let _guard = ContextGuard::enter(runtime_for_panic);
            panic!("callback failed");
        });

        assert!(result.is_err());
        assert_eq!(runtime.attaches(), 1);
        assert_eq!(runtime.detaches(), 1);
    }

    #[test]
    fn test_guards_on_different_threads_are_independent() {
        let runtime = Arc::new(RecordingRuntime::default());
        let mut handles = Vec::new();

        for _ in 0..4 {
            let runtime = runtime.clone();
            handles.push(std::thread::spawn(move || {
                let _guard = ContextGuard::enter(runtime);
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(runtime.attaches(), 4);
        assert_eq!(runtime.detaches(), 4);
    }
}
