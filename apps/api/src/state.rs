use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::config::Config;
use crate::export::{ExportBridge, ExportJobs};
use crate::session::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub sessions: SessionStore,
    pub exports: ExportJobs,
    /// Export pipeline. Remote formats are unavailable when no conversion service
    /// is configured (EXPORT_SERVICE_URL).
    pub bridge: Arc<ExportBridge>,
}

impl AppState {
    pub fn new(config: Config, bridge: ExportBridge) -> Self {
        Self {
            config,
            sessions: SessionStore::new(),
            exports: ExportJobs::new(),
            bridge: Arc::new(bridge),
        }
    }

    /// One pass of the background sweeper: expires idle sessions along with their
    /// export jobs, then finished jobs older than the retention window.
    pub async fn sweep_expired(&self, now: DateTime<Utc>) {
        let idle = self
            .sessions
            .evict_idle(cutoff(now, self.config.session_ttl))
            .await;
        for session_id in &idle {
            self.exports.remove_session(*session_id).await;
        }

        let expired = self
            .exports
            .evict_finished_before(cutoff(now, self.config.export_retention))
            .await;
        if expired > 0 {
            debug!(expired, "finished export jobs expired");
        }
    }
}

fn cutoff(now: DateTime<Utc>, age: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(age)
        .ok()
        .and_then(|age| now.checked_sub_signed(age))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}
