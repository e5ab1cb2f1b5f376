use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tracing::debug;

/// Fixed pause taken after every domain pass to stay polite with third-party
/// search endpoints. The search loop awaits it, so passes never overlap.
#[derive(Debug)]
pub struct DomainPacer {
    delay: Duration,
    pauses: AtomicU64,
}

impl DomainPacer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pauses: AtomicU64::new(0),
        }
    }

    pub async fn pause(&self) {
        self.pauses.fetch_add(1, Ordering::Relaxed);
        if self.delay.is_zero() {
            return;
        }
        debug!(delay_ms = self.delay.as_millis() as u64, "pacing before next domain");
        tokio::time::sleep(self.delay).await;
    }

    /// Number of pauses taken so far.
    pub fn pauses(&self) -> u64 {
        self.pauses.load(Ordering::Relaxed)
    }
}
