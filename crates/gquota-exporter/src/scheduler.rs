//! Periodic refresh loop.
//!
//! One interval timer, one cycle at a time: the loop awaits each cycle before
//! taking the next tick, and missed ticks are skipped rather than queued.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::publisher::QuotaPublisher;

/// Spawn the refresh loop. The first tick fires one `period` after the call.
pub fn spawn_refresh_loop(publisher: Arc<QuotaPublisher>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            run_guarded(&publisher).await;
        }
    })
}

/// Run one cycle in its own task so a panic inside it is logged instead of
/// ending the loop.
pub async fn run_guarded(publisher: &Arc<QuotaPublisher>) {
    let p = Arc::clone(publisher);
    if let Err(e) = tokio::spawn(async move { p.run_logged().await }).await {
        tracing::error!(error = %e, "quota refresh task aborted");
    }
}
