// In-memory record store implementation
use crate::application::telemetry_repository::{
    HistoryCounts, RepositoryError, RepositoryResult, TelemetryRepository,
};
use crate::domain::frequency::FrequencyVariant;
use crate::domain::monitor::{Monitor, MonitorId};
use crate::domain::telemetry::{CycleAggregate, DataLogEntry, TickBatch};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct History {
    logs: Vec<DataLogEntry>,
    aggregates: BTreeMap<u64, CycleAggregate>,
}

#[derive(Debug, Default)]
struct StoreState {
    next_id: MonitorId,
    monitors: BTreeMap<MonitorId, Monitor>,
    /// Registry enforcing one monitor per variant
    by_variant: HashMap<FrequencyVariant, MonitorId>,
    history: HashMap<MonitorId, History>,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    state: Arc<RwLock<StoreState>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TelemetryRepository for InMemoryRepository {
    async fn create_monitor(
        &self,
        variant: FrequencyVariant,
        now: DateTime<Utc>,
    ) -> RepositoryResult<Monitor> {
        let mut state = self.state.write().await;
        if state.by_variant.contains_key(&variant) {
            return Err(RepositoryError::DuplicateVariant(variant));
        }

        state.next_id += 1;
        let monitor = Monitor::new(state.next_id, variant, now);
        state.by_variant.insert(variant, monitor.id);
        state.monitors.insert(monitor.id, monitor.clone());
        state.history.insert(monitor.id, History::default());
        Ok(monitor)
    }

    async fn get_monitor(&self, id: MonitorId) -> RepositoryResult<Option<Monitor>> {
        Ok(self.state.read().await.monitors.get(&id).cloned())
    }

    async fn find_monitor_by_variant(
        &self,
        variant: FrequencyVariant,
    ) -> RepositoryResult<Option<Monitor>> {
        let state = self.state.read().await;
        Ok(state
            .by_variant
            .get(&variant)
            .and_then(|id| state.monitors.get(id))
            .cloned())
    }

    async fn list_monitors(&self) -> RepositoryResult<Vec<Monitor>> {
        Ok(self.state.read().await.monitors.values().cloned().collect())
    }

    async fn save_monitor(&self, monitor: &Monitor) -> RepositoryResult<()> {
        let mut state = self.state.write().await;
        let stored = state
            .monitors
            .get_mut(&monitor.id)
            .ok_or(RepositoryError::MonitorNotFound(monitor.id))?;
        if stored.variant != monitor.variant {
            return Err(RepositoryError::Backend(anyhow::anyhow!(
                "frequency variant of monitor {} is immutable",
                monitor.id
            )));
        }
        *stored = monitor.clone();
        Ok(())
    }

    async fn delete_monitor(&self, id: MonitorId) -> RepositoryResult<()> {
        let mut state = self.state.write().await;
        let monitor = state
            .monitors
            .remove(&id)
            .ok_or(RepositoryError::MonitorNotFound(id))?;
        state.by_variant.remove(&monitor.variant);
        state.history.remove(&id);
        Ok(())
    }

    async fn append_tick(&self, batch: &TickBatch) -> RepositoryResult<()> {
        let monitor_id = batch.aggregate.monitor_id;
        let tick_number = batch.aggregate.tick_number;

        let mut state = self.state.write().await;
        let history = state
            .history
            .get_mut(&monitor_id)
            .ok_or(RepositoryError::MonitorNotFound(monitor_id))?;
        if history.aggregates.contains_key(&tick_number) {
            return Err(RepositoryError::DuplicateTick {
                monitor_id,
                tick_number,
            });
        }

        history.logs.extend(batch.logs.iter().cloned());
        history.aggregates.insert(tick_number, batch.aggregate.clone());
        Ok(())
    }

    async fn clear_history(&self, monitor_id: MonitorId) -> RepositoryResult<()> {
        let mut state = self.state.write().await;
        let history = state
            .history
            .get_mut(&monitor_id)
            .ok_or(RepositoryError::MonitorNotFound(monitor_id))?;
        history.logs.clear();
        history.aggregates.clear();
        Ok(())
    }

    async fn data_logs(&self, monitor_id: MonitorId) -> RepositoryResult<Vec<DataLogEntry>> {
        let state = self.state.read().await;
        let mut logs = state
            .history
            .get(&monitor_id)
            .map(|h| h.logs.clone())
            .unwrap_or_default();
        // Stable sort keeps generation order for equal timestamps at sub-cycle boundaries
        logs.sort_by(|a, b| {
            a.tick_number
                .cmp(&b.tick_number)
                .then(a.time_in_tick.total_cmp(&b.time_in_tick))
        });
        Ok(logs)
    }

    async fn cycle_aggregates(
        &self,
        monitor_id: MonitorId,
    ) -> RepositoryResult<Vec<CycleAggregate>> {
        let state = self.state.read().await;
        Ok(state
            .history
            .get(&monitor_id)
            .map(|h| h.aggregates.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn history_counts(&self, monitor_id: MonitorId) -> RepositoryResult<HistoryCounts> {
        let state = self.state.read().await;
        Ok(state
            .history
            .get(&monitor_id)
            .map(|h| HistoryCounts {
                data_logs: h.logs.len(),
                cycle_aggregates: h.aggregates.len(),
            })
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::cycle_generator::build_tick;
    use crate::application::noise::FixedNoise;

    async fn seeded(repo: &InMemoryRepository, variant: FrequencyVariant) -> Monitor {
        repo.create_monitor(variant, Utc::now()).await.unwrap()
    }

    #[tokio::test]
    async fn test_registry_is_keyed_by_variant() {
        let repo = InMemoryRepository::new();
        let a = seeded(&repo, FrequencyVariant::Hz2).await;
        let b = seeded(&repo, FrequencyVariant::Hz7).await;
        assert_ne!(a.id, b.id);

        let err = repo.create_monitor(FrequencyVariant::Hz2, Utc::now()).await.unwrap_err();
        assert!(matches!(err, RepositoryError::DuplicateVariant(FrequencyVariant::Hz2)));

        let found = repo.find_monitor_by_variant(FrequencyVariant::Hz7).await.unwrap();
        assert_eq!(found.map(|m| m.id), Some(b.id));
        assert!(repo.find_monitor_by_variant(FrequencyVariant::Hz3).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_append_rejects_duplicate_tick() {
        let repo = InMemoryRepository::new();
        let monitor = seeded(&repo, FrequencyVariant::Hz2).await;
        let batch = build_tick(&monitor, 1, Utc::now(), &FixedNoise(1.0)).unwrap();

        repo.append_tick(&batch).await.unwrap();
        let err = repo.append_tick(&batch).await.unwrap_err();
        assert!(matches!(err, RepositoryError::DuplicateTick { tick_number: 1, .. }));

        // Rejected batch left nothing behind
        let counts = repo.history_counts(monitor.id).await.unwrap();
        assert_eq!(counts, HistoryCounts { data_logs: 18, cycle_aggregates: 1 });
    }

    #[tokio::test]
    async fn test_logs_ordered_by_tick_then_time() {
        let repo = InMemoryRepository::new();
        let monitor = seeded(&repo, FrequencyVariant::Hz3).await;
        for tick in [2, 1] {
            let batch = build_tick(&monitor, tick, Utc::now(), &FixedNoise(1.0)).unwrap();
            repo.append_tick(&batch).await.unwrap();
        }

        let logs = repo.data_logs(monitor.id).await.unwrap();
        assert_eq!(logs.len(), 54);
        assert!(logs[..27].iter().all(|l| l.tick_number == 1));
        assert!(logs[27..].iter().all(|l| l.tick_number == 2));
        assert!(logs[..27].windows(2).all(|w| w[1].time_in_tick >= w[0].time_in_tick));

        let ticks: Vec<u64> = repo
            .cycle_aggregates(monitor.id)
            .await
            .unwrap()
            .iter()
            .map(|a| a.tick_number)
            .collect();
        assert_eq!(ticks, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_save_rejects_variant_change() {
        let repo = InMemoryRepository::new();
        let mut monitor = seeded(&repo, FrequencyVariant::Hz5).await;
        monitor.variant = FrequencyVariant::Hz2;
        assert!(repo.save_monitor(&monitor).await.is_err());

        monitor.variant = FrequencyVariant::Hz5;
        monitor.is_live = true;
        repo.save_monitor(&monitor).await.unwrap();
        assert!(repo.get_monitor(monitor.id).await.unwrap().unwrap().is_live);
    }

    #[tokio::test]
    async fn test_delete_cascades() {
        let repo = InMemoryRepository::new();
        let monitor = seeded(&repo, FrequencyVariant::Hz2).await;
        let batch = build_tick(&monitor, 1, Utc::now(), &FixedNoise(1.0)).unwrap();
        repo.append_tick(&batch).await.unwrap();

        repo.delete_monitor(monitor.id).await.unwrap();

        assert!(repo.get_monitor(monitor.id).await.unwrap().is_none());
        assert_eq!(repo.history_counts(monitor.id).await.unwrap(), HistoryCounts::default());
        assert!(matches!(
            repo.append_tick(&batch).await,
            Err(RepositoryError::MonitorNotFound(_))
        ));
        seeded(&repo, FrequencyVariant::Hz2).await;
    }
}
