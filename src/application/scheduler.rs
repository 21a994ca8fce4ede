// Server-side timer that drives live generation without client polling
use crate::application::live_controller::{GenerateOutcome, LiveController};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Periodically asks the live controller for the next tick of every live
/// monitor. Ticks still go through the controller's interval gate, so running
/// the scheduler next to polling clients cannot double the rate.
pub struct LiveScheduler {
    controller: LiveController,
    period: Duration,
}

/// Shortest period accepted by [`LiveScheduler::new`]
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

impl LiveScheduler {
    /// A zero period is raised to [`MIN_PERIOD`]
    pub fn new(controller: LiveController, period: Duration) -> Self {
        Self {
            controller,
            period: period.max(MIN_PERIOD),
        }
    }

    /// One pass over the live monitors; returns how many ticks were generated
    pub async fn sweep(&self) -> usize {
        let live = match self.controller.list_live_monitors().await {
            Ok(live) => live,
            Err(e) => {
                tracing::warn!("Scheduler could not list live monitors: {}", e);
                return 0;
            }
        };

        let mut generated = 0;
        for monitor in live {
            match self.controller.generate_next(monitor.id).await {
                Ok(GenerateOutcome::Generated { total_ticks }) => {
                    tracing::debug!("Scheduler generated tick {} for monitor {}", total_ticks, monitor.id);
                    generated += 1;
                }
                Ok(GenerateOutcome::TooSoon { .. }) | Ok(GenerateOutcome::NotLive) => {}
                Ok(GenerateOutcome::Failed { message }) => {
                    tracing::warn!("Scheduler tick failed for monitor {}: {}", monitor.id, message);
                }
                // Deleted between listing and generating
                Err(e) => tracing::debug!("Scheduler skipped monitor {}: {}", monitor.id, e),
            }
        }
        generated
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tracing::info!("Live scheduler running every {:?}", self.period);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                self.sweep().await;
            }
        })
    }
}
