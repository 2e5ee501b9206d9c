//! One-shot guard for releasing session resources

use std::sync::atomic::{AtomicBool, Ordering};

/// Monotonic released flag: false → true, never back.
#[derive(Debug, Default)]
pub struct ReleaseGuard {
    released: AtomicBool,
}

impl ReleaseGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true for exactly one caller, even under concurrent use
    pub fn try_acquire(&self) -> bool {
        self.released
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }
}
