use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::Duration;

/// One-shot signal that a fixture page response has left the server.
///
/// Set once by the serving thread, readable and waitable from any
/// thread. There is no reset; a second fetch looks like the first.
/// Clones share the same underlying flag.
#[derive(Clone, Default)]
pub struct PageServed {
    inner: Arc<Latch>,
}

#[derive(Default)]
struct Latch {
    served: Mutex<bool>,
    condvar: Condvar,
}

impl PageServed {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once a response body has been written and flushed.
    pub fn is_set(&self) -> bool {
        *self.lock()
    }

    pub(crate) fn set(&self) {
        let mut served = self.lock();
        *served = true;
        self.inner.condvar.notify_all();
    }

    /// Block until the signal is set.
    pub fn wait(&self) {
        let mut served = self.lock();
        while !*served {
            served = self
                .inner
                .condvar
                .wait(served)
                .unwrap_or_else(|e| e.into_inner());
        }
    }

    /// Block until the signal is set or `timeout` elapses.
    ///
    /// Returns whether the signal was set.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let served = self.lock();
        let (served, _) = self
            .inner
            .condvar
            .wait_timeout_while(served, timeout, |served| !*served)
            .unwrap_or_else(|e| e.into_inner());
        *served
    }

    fn lock(&self) -> MutexGuard<'_, bool> {
        self.inner.served.lock().unwrap_or_else(|e| e.into_inner())
    }
}
