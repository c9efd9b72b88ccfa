///! Inter-request pacing
///!
///! Both remote APIs are queried unauthenticated, so the updater must
///! stay well under their quotas. One pacer is shared across the whole
///! run and enforces a minimum interval between consecutive remote
///! calls, including the boundary between one API's last call and the
///! other's first; this is a hard policy, not best-effort.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

pub struct Pacer {
    last_call: Mutex<Option<Instant>>,
}

impl Pacer {
    pub fn new() -> Self {
        Self {
            last_call: Mutex::new(None),
        }
    }

    /// Wait out the remainder of `min_interval` since the previous call
    /// (whichever API it went to), then mark the current instant as the
    /// new reference point.
    pub async fn pace(&self, min_interval: Duration) {
        let mut last = self.last_call.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < min_interval {
                tokio::time::sleep(min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}

impl Default for Pacer {
    fn default() -> Self {
        Self::new()
    }
}
