//! Multi-target sync orchestration.
//!
//! Owns the last accepted position and, for each qualifying fix, fans one
//! resync batch out to every configured controller concurrently via
//! independent one-shot sessions. The accepted position moves only when
//! every controller succeeds; any failure leaves it untouched so the next
//! qualifying fix re-attempts.

use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

use crate::config::ConfigFile;
use crate::position::{decide, AcceptedPosition, Decision, FilterThresholds, PositionFix};
use crate::session::{deliver, SessionConfig, Target};
use crate::timezone::{GeoZoneResolver, ZoneResolver};

use super::batch::CommandBatch;

/// What one fix amounted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The fix was invalid or within thresholds; nothing was sent.
    Skipped,
    /// Every controller acknowledged the full batch; the accepted position
    /// moved.
    Synced,
    /// At least one controller failed; the accepted position is unchanged.
    Failed,
}

/// Drives resync decisions and multi-target delivery.
///
/// `handle_fix` takes `&mut self` and is awaited to completion before the
/// next fix is read, so sync attempts are strictly serialized and the
/// accepted position never sees interleaved writers.
pub struct SyncOrchestrator {
    targets: Vec<Target>,
    thresholds: FilterThresholds,
    session: SessionConfig,
    deadline: Duration,
    resolver: Box<dyn ZoneResolver + Send + Sync>,
    accepted: AcceptedPosition,
}

impl SyncOrchestrator {
    pub fn new(
        targets: Vec<Target>,
        thresholds: FilterThresholds,
        session: SessionConfig,
        deadline: Duration,
        resolver: Box<dyn ZoneResolver + Send + Sync>,
    ) -> Self {
        let accepted = AcceptedPosition::sentinel(Utc::now(), thresholds.staleness_days);
        Self {
            targets,
            thresholds,
            session,
            deadline,
            resolver,
            accepted,
        }
    }

    /// Build an orchestrator from file configuration, with the production
    /// timezone resolver.
    pub fn from_config(config: &ConfigFile) -> Self {
        Self::new(
            config.targets.clone(),
            config.thresholds(),
            config.session_config(),
            config.sync.deadline,
            Box::new(GeoZoneResolver::new()),
        )
    }

    /// The last position successfully pushed to every controller.
    pub fn accepted(&self) -> &AcceptedPosition {
        &self.accepted
    }

    /// Process one incoming fix to completion.
    pub async fn handle_fix(&mut self, fix: PositionFix) -> SyncOutcome {
        let decision = decide(
            &fix,
            &self.accepted,
            Utc::now(),
            self.resolver.as_ref(),
            &self.thresholds,
        );

        let plan = match decision {
            Decision::Skip => {
                trace!(lat = fix.latitude, lon = fix.longitude, "Fix skipped");
                return SyncOutcome::Skipped;
            }
            Decision::Resync(plan) => plan,
        };

        info!(
            lat = plan.latitude,
            lon = plan.longitude,
            utc_offset_minutes = plan.utc_offset_minutes,
            targets = self.targets.len(),
            "Deviation detected, syncing controllers"
        );

        let batch = CommandBatch::resync(&plan);
        let deliveries = self
            .targets
            .iter()
            .map(|target| deliver(target, &batch, self.deadline, &self.session));
        let results = join_all(deliveries).await;

        for result in &results {
            if result.success {
                debug!(target = %result.target, "Controller synced");
            } else {
                warn!(target = %result.target, "Controller sync failed");
            }
        }

        if results.iter().all(|result| result.success) {
            self.accepted = AcceptedPosition {
                latitude: plan.latitude,
                longitude: plan.longitude,
                accepted_at: Utc::now(),
            };
            info!("Synced new coordinates with all controllers");
            SyncOutcome::Synced
        } else {
            warn!("Sync incomplete, keeping previous accepted position");
            SyncOutcome::Failed
        }
    }

    /// Consume fixes from the receiver channel until it closes.
    pub async fn run(mut self, mut fix_rx: mpsc::Receiver<PositionFix>) {
        while let Some(fix) = fix_rx.recv().await {
            self.handle_fix(fix).await;
        }
        debug!("Fix channel closed, orchestrator stopping");
    }
}
