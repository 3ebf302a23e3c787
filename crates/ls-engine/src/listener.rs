//! Listener capability and thread-safe listener registry

use std::sync::Arc;

use parking_lot::Mutex;

use ls_core::StereoColorSample;

/// Capability handed to listeners during dispatch
pub trait RunningProcess: Send + Sync {
    /// Ask the dispatching thread to exit at the end of its drain pass
    fn signal_should_exit(&self);

    fn should_exit(&self) -> bool;
}

/// Receives every decoded sample dispatched by a reader
pub trait StereoColorListener: Send + Sync {
    /// Called on the reader thread, once per sample, in registration order
    fn on_stereo_color(&self, process: &dyn RunningProcess, sample: &StereoColorSample);
}

/// Closure adapter for [`StereoColorListener`]
pub struct FnListener<F> {
    callback: F,
}

impl<F> FnListener<F>
where
    F: Fn(&dyn RunningProcess, &StereoColorSample) + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }

    /// Wrap the closure in an `Arc` ready for [`ListenerRegistry::add`]
    pub fn shared(callback: F) -> Arc<Self>
    where
        F: 'static,
    {
        Arc::new(Self::new(callback))
    }
}

impl<F> StereoColorListener for FnListener<F>
where
    F: Fn(&dyn RunningProcess, &StereoColorSample) + Send + Sync,
{
    fn on_stereo_color(&self, process: &dyn RunningProcess, sample: &StereoColorSample) {
        (self.callback)(process, sample)
    }
}

pub type ListenerRef = Arc<dyn StereoColorListener>;

#[inline]
fn same_listener(a: &ListenerRef, b: &ListenerRef) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

// ═══════════════════════════════════════════════════════════════════════════════
// REGISTRY
// ═══════════════════════════════════════════════════════════════════════════════

/// Copy-on-write listener list.
///
/// Mutation replaces the list under the mutex; dispatch clones the current
/// `Arc` and iterates it without holding the lock, so listeners may be added
/// or removed (even from inside a callback) while a reader dispatches.
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: Mutex<Arc<Vec<ListenerRef>>>,
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistry").field("len", &self.len()).finish()
    }
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. Returns `false` if it is already registered.
    pub fn add(&self, listener: ListenerRef) -> bool {
        let mut guard = self.listeners.lock();
        if guard.iter().any(|l| same_listener(l, &listener)) {
            return false;
        }
        let mut next = Vec::with_capacity(guard.len() + 1);
        next.extend(guard.iter().cloned());
        next.push(listener);
        *guard = Arc::new(next);
        true
    }

    /// Unregister a listener. Returns whether it was registered.
    pub fn remove(&self, listener: &ListenerRef) -> bool {
        let mut guard = self.listeners.lock();
        if !guard.iter().any(|l| same_listener(l, listener)) {
            return false;
        }
        let next: Vec<ListenerRef> = guard
            .iter()
            .filter(|l| !same_listener(l, listener))
            .cloned()
            .collect();
        *guard = Arc::new(next);
        true
    }

    pub fn clear(&self) {
        *self.listeners.lock() = Arc::new(Vec::new());
    }

    pub fn len(&self) -> usize {
        self.listeners.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, listener: &ListenerRef) -> bool {
        self.listeners.lock().iter().any(|l| same_listener(l, listener))
    }

    /// Current list; stays valid while the registry changes
    pub fn snapshot(&self) -> Arc<Vec<ListenerRef>> {
        Arc::clone(&self.listeners.lock())
    }

    /// Invoke every listener once, in registration order
    pub fn dispatch(&self, process: &dyn RunningProcess, sample: &StereoColorSample) {
        let listeners = self.snapshot();
        for listener in listeners.iter() {
            listener.on_stereo_color(process, sample);
        }
    }
}
