use crate::device::HungerReport;
use crate::state::AppState;
use std::time::Duration;
use tokio::{
    task::JoinHandle,
    time::{MissedTickBehavior, interval},
};
use tracing::{debug, info, warn};

/// Polls the device hunger level on a fixed period.
///
/// Each poll finishes before the next tick is awaited and late ticks are
/// skipped, so requests never pile up behind a slow device.
pub fn spawn_hunger_poller(state: AppState, period: Duration) -> JoinHandle<()> {
    info!(period_ms = period.as_millis() as u64, "hunger poller started");
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            poll_hunger_once(&state).await;
        }
    })
}

/// On failure the last known report is kept.
pub async fn poll_hunger_once(state: &AppState) -> Option<HungerReport> {
    match state.device.hunger().await {
        Ok(report) => {
            let mut slot = state.hunger.write().await;
            if *slot != Some(report) {
                debug!(hunger = report.hunger, critical = report.critical, "hunger changed");
            }
            *slot = Some(report);
            Some(report)
        }
        Err(err) => {
            warn!("hunger poll failed: {err}");
            None
        }
    }
}
