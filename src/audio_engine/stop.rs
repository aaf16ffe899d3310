use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Cancellation flag shared between the control flow and the driver adapter.
///
/// Raising it never interrupts a render call in flight; the adapter checks it
/// between periods.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    flag: Arc<AtomicBool>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.flag.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_requested(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// Block the calling thread until someone raises the flag.
    pub fn wait(&self, poll: Duration) {
        while !self.is_requested() {
            thread::sleep(poll);
        }
    }
}
