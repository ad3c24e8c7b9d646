use tokio::sync::{Mutex, MutexGuard};

/// Held for the whole consume → deploy → notify sequence.
pub type DeploySlotGuard<'a> = MutexGuard<'a, ()>;

/// Process-wide exclusion: at most one deployment in flight.
///
/// Uses an async mutex because the guard is held across remote-shell calls.
#[derive(Debug, Default)]
pub struct DeploySlot {
    inner: Mutex<()>,
}

impl DeploySlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until no other deployment is running. Released when the guard drops.
    pub async fn acquire(&self) -> DeploySlotGuard<'_> {
        self.inner.lock().await
    }

    /// Returns `true` while some caller holds the slot.
    pub fn is_busy(&self) -> bool {
        self.inner.try_lock().is_err()
    }
}
