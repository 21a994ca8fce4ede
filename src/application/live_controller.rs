//! Live mode: a per-monitor Stopped/Live flag plus a rate-limited
//! "generate the next tick" operation driven by external polling.
//!
//! Every state change runs under the monitor's lock from [`MonitorLocks`], so
//! the interval check, the generation and the counter update form one
//! critical section.

use crate::application::clock::Clock;
use crate::application::cycle_generator::CycleGenerator;
use crate::application::errors::{ServiceError, ServiceResult};
use crate::application::monitor_locks::MonitorLocks;
use crate::application::telemetry_repository::TelemetryRepository;
use crate::domain::frequency::FrequencyVariant;
use crate::domain::monitor::{Monitor, MonitorId};
use crate::domain::notification::{ClientAction, NotificationLevel};
use crate::domain::telemetry::TickEvent;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

const FEED_CAPACITY: usize = 256;

/// What starting live mode does to existing history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartPolicy {
    /// Wipe logs and aggregates and restart tick numbering at 1
    ResetHistory,
    /// Only flip the live flag
    #[default]
    KeepHistory,
}

#[derive(Debug, Clone, Copy)]
pub struct LiveSettings {
    pub start_policy: StartPolicy,
    pub min_interval: Duration,
}

impl Default for LiveSettings {
    fn default() -> Self {
        Self {
            start_policy: StartPolicy::default(),
            min_interval: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GenerateOutcome {
    Generated { total_ticks: u64 },
    TooSoon { wait_seconds: f64 },
    NotLive,
    Failed { message: String },
}

impl GenerateOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, GenerateOutcome::Generated { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiveStatus {
    pub is_live: bool,
    pub total_ticks: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiveMonitor {
    pub id: MonitorId,
    pub frequency: FrequencyVariant,
    pub total_ticks: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToggleResult {
    pub is_live: bool,
    pub action: ClientAction,
}

#[derive(Clone)]
pub struct LiveController {
    repository: Arc<dyn TelemetryRepository>,
    generator: CycleGenerator,
    clock: Arc<dyn Clock>,
    locks: MonitorLocks,
    settings: LiveSettings,
    events: broadcast::Sender<TickEvent>,
}

impl LiveController {
    pub fn new(
        repository: Arc<dyn TelemetryRepository>,
        generator: CycleGenerator,
        clock: Arc<dyn Clock>,
        locks: MonitorLocks,
        settings: LiveSettings,
    ) -> Self {
        let (events, _) = broadcast::channel(FEED_CAPACITY);
        Self {
            repository,
            generator,
            clock,
            locks,
            settings,
            events,
        }
    }

    /// Subscribe to ticks generated in live mode
    pub fn subscribe(&self) -> broadcast::Receiver<TickEvent> {
        self.events.subscribe()
    }

    async fn load(&self, id: MonitorId) -> ServiceResult<Monitor> {
        self.repository
            .get_monitor(id)
            .await?
            .ok_or(ServiceError::MonitorNotFound(id))
    }

    pub async fn start(&self, id: MonitorId) -> ServiceResult<Monitor> {
        let _guard = self.locks.acquire(id).await;
        let mut monitor = self.load(id).await?;
        if !monitor.is_live {
            self.apply_start(&mut monitor).await?;
        }
        Ok(monitor)
    }

    pub async fn stop(&self, id: MonitorId) -> ServiceResult<Monitor> {
        let _guard = self.locks.acquire(id).await;
        let mut monitor = self.load(id).await?;
        if monitor.is_live {
            self.apply_stop(&mut monitor).await?;
        }
        Ok(monitor)
    }

    pub async fn toggle_live(&self, id: MonitorId) -> ServiceResult<ToggleResult> {
        let _guard = self.locks.acquire(id).await;
        let mut monitor = self.load(id).await?;

        let action = if monitor.is_live {
            self.apply_stop(&mut monitor).await?;
            ClientAction::notify("Live mode stopped.", NotificationLevel::Info)
        } else {
            self.apply_start(&mut monitor).await?;
            ClientAction::notify(
                "Live mode started. Data will be generated via polling.",
                NotificationLevel::Success,
            )
        };

        Ok(ToggleResult {
            is_live: monitor.is_live,
            action,
        })
    }

    async fn apply_start(&self, monitor: &mut Monitor) -> ServiceResult<()> {
        if self.settings.start_policy == StartPolicy::ResetHistory {
            self.repository.clear_history(monitor.id).await?;
            monitor.total_ticks_generated = 0;
            monitor.last_generation_time = None;
        }
        monitor.is_live = true;
        monitor.last_update = self.clock.now();
        self.repository.save_monitor(monitor).await?;

        tracing::info!(
            "Live mode started for monitor {} ({}, policy {:?})",
            monitor.id,
            monitor.variant,
            self.settings.start_policy
        );
        Ok(())
    }

    async fn apply_stop(&self, monitor: &mut Monitor) -> ServiceResult<()> {
        monitor.is_live = false;
        monitor.last_update = self.clock.now();
        self.repository.save_monitor(monitor).await?;

        tracing::info!(
            "Live mode stopped for monitor {} after {} ticks",
            monitor.id,
            monitor.total_ticks_generated
        );
        Ok(())
    }

    /// Generate the next tick if the monitor is live and the minimum interval
    /// has elapsed since the last successful generation.
    ///
    /// Only an unknown or unreadable monitor is an error; failures while
    /// generating are reported as [`GenerateOutcome::Failed`].
    pub async fn generate_next(&self, id: MonitorId) -> ServiceResult<GenerateOutcome> {
        let _guard = self.locks.acquire(id).await;
        let mut monitor = self.load(id).await?;

        if !monitor.is_live {
            return Ok(GenerateOutcome::NotLive);
        }

        if let Some(last) = monitor.last_generation_time {
            // A clock that went backwards counts as no time elapsed
            let elapsed = (self.clock.now() - last).to_std().unwrap_or(Duration::ZERO);
            if elapsed < self.settings.min_interval {
                let wait = self.settings.min_interval - elapsed;
                tracing::debug!("Monitor {} polled too soon, wait {:?}", id, wait);
                return Ok(GenerateOutcome::TooSoon {
                    wait_seconds: wait.as_secs_f64(),
                });
            }
        }

        let tick_number = monitor.next_tick_number();
        let batch = match self.generator.generate_tick(&monitor, tick_number).await {
            Ok(batch) => batch,
            Err(e) => {
                tracing::warn!("Tick generation failed for monitor {}: {}", id, e);
                return Ok(GenerateOutcome::Failed { message: e.to_string() });
            }
        };

        let now = self.clock.now();
        monitor.total_ticks_generated = tick_number;
        monitor.last_generation_time = Some(now);
        monitor.last_update = now;
        if let Err(e) = self.repository.save_monitor(&monitor).await {
            tracing::warn!("Failed to record tick {} for monitor {}: {}", tick_number, id, e);
            return Ok(GenerateOutcome::Failed { message: e.to_string() });
        }

        // Nobody listening is fine
        let _ = self.events.send(TickEvent {
            monitor_id: monitor.id,
            frequency: monitor.variant,
            tick_number,
            total_ticks: monitor.total_ticks_generated,
            timestamp: batch.aggregate.timestamp,
            samples: batch.samples,
        });

        Ok(GenerateOutcome::Generated {
            total_ticks: tick_number,
        })
    }

    pub async fn check_live_status(&self, id: MonitorId) -> ServiceResult<LiveStatus> {
        let monitor = self.load(id).await?;
        Ok(LiveStatus {
            is_live: monitor.is_live,
            total_ticks: monitor.total_ticks_generated,
        })
    }

    pub async fn list_live_monitors(&self) -> ServiceResult<Vec<LiveMonitor>> {
        let monitors = self.repository.list_monitors().await?;
        Ok(monitors
            .into_iter()
            .filter(|m| m.is_live)
            .map(|m| LiveMonitor {
                id: m.id,
                frequency: m.variant,
                total_ticks: m.total_ticks_generated,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::clock::ManualClock;
    use crate::application::noise::FixedNoise;
    use crate::infrastructure::memory_repository::InMemoryRepository;
    use chrono::Utc;

    struct Fixture {
        repo: Arc<InMemoryRepository>,
        clock: Arc<ManualClock>,
        locks: MonitorLocks,
        controller: LiveController,
    }

    fn fixture(start_policy: StartPolicy) -> Fixture {
        let repo = Arc::new(InMemoryRepository::new());
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let generator = CycleGenerator::new(repo.clone(), Arc::new(FixedNoise(1.0)), clock.clone());
        let locks = MonitorLocks::default();
        let controller = LiveController::new(
            repo.clone(),
            generator,
            clock.clone(),
            locks.clone(),
            LiveSettings {
                start_policy,
                min_interval: Duration::from_secs(1),
            },
        );
        Fixture {
            repo,
            clock,
            locks,
            controller,
        }
    }

    async fn monitor(f: &Fixture, variant: FrequencyVariant) -> Monitor {
        f.repo.create_monitor(variant, f.clock.now()).await.unwrap()
    }

    #[tokio::test]
    async fn test_stopped_monitor_is_rejected_without_side_effects() {
        let f = fixture(StartPolicy::KeepHistory);
        let m = monitor(&f, FrequencyVariant::Hz2).await;

        assert_eq!(f.controller.generate_next(m.id).await.unwrap(), GenerateOutcome::NotLive);

        let stored = f.repo.get_monitor(m.id).await.unwrap().unwrap();
        assert_eq!(stored, m);
        assert_eq!(f.repo.history_counts(m.id).await.unwrap().data_logs, 0);
    }

    #[tokio::test]
    async fn test_ticks_are_sequential() {
        let f = fixture(StartPolicy::KeepHistory);
        let m = monitor(&f, FrequencyVariant::Hz2).await;
        f.controller.start(m.id).await.unwrap();

        for expected in 1..=5 {
            let outcome = f.controller.generate_next(m.id).await.unwrap();
            assert_eq!(outcome, GenerateOutcome::Generated { total_ticks: expected });
            f.clock.advance(Duration::from_secs(1));
        }

        let status = f.controller.check_live_status(m.id).await.unwrap();
        assert_eq!(status, LiveStatus { is_live: true, total_ticks: 5 });
        let ticks: Vec<u64> = f
            .repo
            .cycle_aggregates(m.id)
            .await
            .unwrap()
            .iter()
            .map(|a| a.tick_number)
            .collect();
        assert_eq!(ticks, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_second_call_within_interval_is_rate_limited() {
        let f = fixture(StartPolicy::KeepHistory);
        let m = monitor(&f, FrequencyVariant::Hz2).await;
        f.controller.start(m.id).await.unwrap();

        assert!(f.controller.generate_next(m.id).await.unwrap().is_success());
        f.clock.advance(Duration::from_millis(400));

        match f.controller.generate_next(m.id).await.unwrap() {
            GenerateOutcome::TooSoon { wait_seconds } => {
                assert!(wait_seconds > 0.0);
                assert!((wait_seconds - 0.6).abs() < 1e-6);
            }
            other => panic!("expected rate limit, got {:?}", other),
        }

        let counts = f.repo.history_counts(m.id).await.unwrap();
        assert_eq!(counts.data_logs, 18);
        assert_eq!(counts.cycle_aggregates, 1);

        f.clock.advance(Duration::from_millis(600));
        assert_eq!(
            f.controller.generate_next(m.id).await.unwrap(),
            GenerateOutcome::Generated { total_ticks: 2 }
        );
    }

    #[tokio::test]
    async fn test_concurrent_polls_generate_one_tick() {
        let f = fixture(StartPolicy::KeepHistory);
        let m = monitor(&f, FrequencyVariant::Hz7).await;
        f.controller.start(m.id).await.unwrap();

        let (a, b, c) = tokio::join!(
            f.controller.generate_next(m.id),
            f.controller.generate_next(m.id),
            f.controller.generate_next(m.id),
        );
        let generated = [a, b, c].iter().filter(|o| o.as_ref().unwrap().is_success()).count();
        assert_eq!(generated, 1);
        assert_eq!(f.repo.history_counts(m.id).await.unwrap().cycle_aggregates, 1);
    }

    #[tokio::test]
    async fn test_keep_history_start_preserves_ticks() {
        let f = fixture(StartPolicy::KeepHistory);
        let m = monitor(&f, FrequencyVariant::Hz3).await;
        f.controller.start(m.id).await.unwrap();
        f.controller.generate_next(m.id).await.unwrap();
        f.controller.stop(m.id).await.unwrap();

        f.clock.advance(Duration::from_secs(2));
        f.controller.start(m.id).await.unwrap();

        assert_eq!(
            f.controller.generate_next(m.id).await.unwrap(),
            GenerateOutcome::Generated { total_ticks: 2 }
        );
        assert_eq!(f.repo.history_counts(m.id).await.unwrap().cycle_aggregates, 2);
    }

    #[tokio::test]
    async fn test_reset_history_start_wipes_ticks() {
        let f = fixture(StartPolicy::ResetHistory);
        let m = monitor(&f, FrequencyVariant::Hz3).await;
        f.controller.start(m.id).await.unwrap();
        f.controller.generate_next(m.id).await.unwrap();
        f.controller.stop(m.id).await.unwrap();

        let restarted = f.controller.start(m.id).await.unwrap();
        assert_eq!(restarted.total_ticks_generated, 0);
        assert_eq!(restarted.last_generation_time, None);
        assert_eq!(f.repo.history_counts(m.id).await.unwrap().data_logs, 0);

        // No interval to wait out after a reset
        assert_eq!(
            f.controller.generate_next(m.id).await.unwrap(),
            GenerateOutcome::Generated { total_ticks: 1 }
        );
    }

    #[tokio::test]
    async fn test_toggle_reports_state_and_notification() {
        let f = fixture(StartPolicy::KeepHistory);
        let m = monitor(&f, FrequencyVariant::Hz5).await;

        let started = f.controller.toggle_live(m.id).await.unwrap();
        assert!(started.is_live);
        assert_eq!(
            started.action,
            ClientAction::notify(
                "Live mode started. Data will be generated via polling.",
                NotificationLevel::Success
            )
        );

        let stopped = f.controller.toggle_live(m.id).await.unwrap();
        assert!(!stopped.is_live);
        assert_eq!(
            stopped.action,
            ClientAction::notify("Live mode stopped.", NotificationLevel::Info)
        );
    }

    #[tokio::test]
    async fn test_list_live_monitors() {
        let f = fixture(StartPolicy::KeepHistory);
        let two = monitor(&f, FrequencyVariant::Hz2).await;
        let seven = monitor(&f, FrequencyVariant::Hz7).await;
        f.controller.start(seven.id).await.unwrap();
        f.controller.generate_next(seven.id).await.unwrap();

        let live = f.controller.list_live_monitors().await.unwrap();
        assert_eq!(
            live,
            vec![LiveMonitor {
                id: seven.id,
                frequency: FrequencyVariant::Hz7,
                total_ticks: 1,
            }]
        );
        assert!(!f.controller.check_live_status(two.id).await.unwrap().is_live);
    }

    #[tokio::test]
    async fn test_unknown_monitor_is_not_found() {
        let f = fixture(StartPolicy::KeepHistory);
        assert!(matches!(
            f.controller.generate_next(99).await,
            Err(ServiceError::MonitorNotFound(99))
        ));
        assert!(matches!(
            f.controller.start(99).await,
            Err(ServiceError::MonitorNotFound(99))
        ));
    }

    #[tokio::test]
    async fn test_polling_unknown_ids_does_not_grow_lock_table() {
        let f = fixture(StartPolicy::KeepHistory);
        for id in 1_000..11_000 {
            assert!(f.controller.generate_next(id).await.is_err());
        }
        assert!(f.locks.tracked() <= 1);
    }

    #[tokio::test]
    async fn test_generated_ticks_are_published() {
        let f = fixture(StartPolicy::KeepHistory);
        let m = monitor(&f, FrequencyVariant::Hz2).await;
        let mut feed = f.controller.subscribe();
        f.controller.start(m.id).await.unwrap();
        f.controller.generate_next(m.id).await.unwrap();

        let event = feed.recv().await.unwrap();
        assert_eq!(event.monitor_id, m.id);
        assert_eq!(event.tick_number, 1);
        assert_eq!(event.samples.len(), 18);
    }
}
