use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Notify;

/// Binary wake-up signal between producers and the flusher.
///
/// `set` is cheap, idempotent and callable from any thread. A `set` that
/// lands between the flusher checking the flag and going to sleep is not
/// lost: `Notify` keeps a permit for the next waiter. The flusher still
/// re-checks the queue after every `reset`, since a `set` that happened
/// before the reset is cleared by it.
#[derive(Debug, Default)]
pub struct WakeSignal {
    flag: AtomicBool,
    notify: Notify,
}

impl WakeSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self) {
        self.flag.store(true, Ordering::SeqCst);
        self.notify.notify_one();
    }

    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }

    pub fn is_set(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Suspend until the signal is set. Returns immediately if it already is.
    pub async fn wait_until_set(&self) {
        while !self.is_set() {
            self.notify.notified().await;
        }
    }
}
