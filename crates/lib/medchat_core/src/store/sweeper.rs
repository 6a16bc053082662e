//! Periodic purge of expired refresh-token records.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, warn};

use super::SessionStore;

/// Spawn a task that purges expired sessions every `interval`.
///
/// Lookups already ignore expired records; this only reclaims storage.
/// Abort the returned handle to stop it.
pub fn spawn_session_sweeper(
    store: Arc<dyn SessionStore>,
    interval: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            match store.purge_expired(Utc::now()).await {
                Ok(0) => {}
                Ok(purged) => debug!(purged, "purged expired refresh tokens"),
                Err(e) => warn!(error = %e, "refresh token sweep failed"),
            }
        }
    })
}
