// Repository trait for the monitor registry and telemetry record store
use crate::domain::frequency::FrequencyVariant;
use crate::domain::monitor::{Monitor, MonitorId};
use crate::domain::telemetry::{CycleAggregate, DataLogEntry, TickBatch};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("a monitor for {0} is already registered")]
    DuplicateVariant(FrequencyVariant),
    #[error("monitor {0} not found")]
    MonitorNotFound(MonitorId),
    #[error("tick {tick_number} already recorded for monitor {monitor_id}")]
    DuplicateTick { monitor_id: MonitorId, tick_number: u64 },
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Row counts of a monitor's history
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistoryCounts {
    pub data_logs: usize,
    pub cycle_aggregates: usize,
}

#[async_trait]
pub trait TelemetryRepository: Send + Sync {
    /// Register a monitor; at most one monitor may exist per variant
    async fn create_monitor(
        &self,
        variant: FrequencyVariant,
        now: DateTime<Utc>,
    ) -> RepositoryResult<Monitor>;

    async fn get_monitor(&self, id: MonitorId) -> RepositoryResult<Option<Monitor>>;

    async fn find_monitor_by_variant(
        &self,
        variant: FrequencyVariant,
    ) -> RepositoryResult<Option<Monitor>>;

    /// All monitors ordered by id
    async fn list_monitors(&self) -> RepositoryResult<Vec<Monitor>>;

    /// Persist the mutable state of an existing monitor
    async fn save_monitor(&self, monitor: &Monitor) -> RepositoryResult<()>;

    /// Remove a monitor together with its logs and aggregates
    async fn delete_monitor(&self, id: MonitorId) -> RepositoryResult<()>;

    /// Append one tick's logs and aggregate as a single atomic write
    async fn append_tick(&self, batch: &TickBatch) -> RepositoryResult<()>;

    /// Bulk-delete every log and aggregate of a monitor
    async fn clear_history(&self, monitor_id: MonitorId) -> RepositoryResult<()>;

    /// Data logs ordered by tick, then time within the tick
    async fn data_logs(&self, monitor_id: MonitorId) -> RepositoryResult<Vec<DataLogEntry>>;

    /// Aggregates ordered by tick
    async fn cycle_aggregates(&self, monitor_id: MonitorId)
        -> RepositoryResult<Vec<CycleAggregate>>;

    async fn history_counts(&self, monitor_id: MonitorId) -> RepositoryResult<HistoryCounts>;
}
