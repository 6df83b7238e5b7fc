use std::sync::Arc;

use skylane_sim::{SettlementEngine, SettlementError};
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{error, info, warn};

/// In-process stand-in for the external cron: runs the settlement batch on a
/// fixed interval. Deployments with a real scheduler leave this disabled and
/// hit the cron route instead.
pub async fn start_settlement_worker(engine: Arc<SettlementEngine>, interval_secs: u64) {
    let mut ticker = interval(Duration::from_secs(interval_secs));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(interval_secs, "settlement worker started");

    loop {
        ticker.tick().await;
        match engine.run().await {
            Ok(summary) => {
                info!(
                    processed = summary.processed,
                    total_pending = summary.total_pending,
                    "scheduled settlement run complete"
                );
            }
            Err(SettlementError::AlreadyRunning) => {
                warn!("skipping settlement tick; previous run still in flight");
            }
            Err(err) => {
                error!(error = %err, "settlement run failed");
            }
        }
    }
}
