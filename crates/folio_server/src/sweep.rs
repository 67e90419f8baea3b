//! The session sweeper.

use folio_core::Service;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::info;

/// Spawns the background task that expires stale sessions.
///
/// Runs every `interval` for the life of the process; each pass removes
/// every session whose expiry has passed and clears the owning
/// accounts' logged-in state and outstanding verification codes.
pub fn spawn_sweeper(service: Arc<Service>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let expired = service.sessions().sweep();
            if !expired.is_empty() {
                info!(expired = expired.len(), "sessions expired");
            }
        }
    })
}
