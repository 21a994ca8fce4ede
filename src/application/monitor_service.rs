// Monitor service - Fleet registry, simulated PLC link and history read-back
use crate::application::clock::Clock;
use crate::application::cycle_generator::CycleGenerator;
use crate::application::errors::{ServiceError, ServiceResult};
use crate::application::monitor_locks::MonitorLocks;
use crate::application::telemetry_repository::{RepositoryError, TelemetryRepository};
use crate::domain::chart::ChartPayload;
use crate::domain::frequency::FrequencyVariant;
use crate::domain::monitor::{Monitor, MonitorId, MonitorSummary, DEFAULT_PLC_PORT};
use crate::domain::notification::{ClientAction, NotificationLevel};
use crate::domain::telemetry::{CycleAggregate, DataLogEntry};
use serde::Serialize;
use std::sync::Arc;

/// An aggregate together with the chart reconstructed from its payload
#[derive(Debug, Clone, Serialize)]
pub struct CycleView {
    #[serde(flatten)]
    pub aggregate: CycleAggregate,
    pub chart: ChartPayload,
}

#[derive(Clone)]
pub struct MonitorService {
    repository: Arc<dyn TelemetryRepository>,
    generator: CycleGenerator,
    clock: Arc<dyn Clock>,
    locks: MonitorLocks,
}

impl MonitorService {
    pub fn new(
        repository: Arc<dyn TelemetryRepository>,
        generator: CycleGenerator,
        clock: Arc<dyn Clock>,
        locks: MonitorLocks,
    ) -> Self {
        Self {
            repository,
            generator,
            clock,
            locks,
        }
    }

    async fn load(&self, id: MonitorId) -> ServiceResult<Monitor> {
        self.repository
            .get_monitor(id)
            .await?
            .ok_or(ServiceError::MonitorNotFound(id))
    }

    /// Make sure one monitor exists for every frequency variant
    pub async fn seed_fleet(&self) -> ServiceResult<Vec<Monitor>> {
        let mut fleet = Vec::with_capacity(FrequencyVariant::ALL.len());
        for variant in FrequencyVariant::ALL {
            let monitor = match self.repository.find_monitor_by_variant(variant).await? {
                Some(existing) => existing,
                None => self.register(variant).await?,
            };
            fleet.push(monitor);
        }
        tracing::info!("Fleet ready with {} monitors", fleet.len());
        Ok(fleet)
    }

    pub async fn register(&self, variant: FrequencyVariant) -> ServiceResult<Monitor> {
        let monitor = self.repository.create_monitor(variant, self.clock.now()).await?;
        tracing::info!("Registered monitor {} for {}", monitor.id, variant);
        Ok(monitor)
    }

    pub async fn delete(&self, id: MonitorId) -> ServiceResult<()> {
        let _guard = self.locks.acquire(id).await;
        match self.repository.delete_monitor(id).await {
            Ok(()) => {}
            Err(RepositoryError::MonitorNotFound(id)) => return Err(ServiceError::MonitorNotFound(id)),
            Err(e) => return Err(e.into()),
        }
        tracing::info!("Deleted monitor {} and its history", id);
        Ok(())
    }

    pub async fn list_summaries(&self) -> ServiceResult<Vec<MonitorSummary>> {
        let monitors = self.repository.list_monitors().await?;
        let mut summaries = Vec::with_capacity(monitors.len());
        for monitor in &monitors {
            summaries.push(self.summarize(monitor).await?);
        }
        Ok(summaries)
    }

    pub async fn summary(&self, id: MonitorId) -> ServiceResult<MonitorSummary> {
        let monitor = self.load(id).await?;
        self.summarize(&monitor).await
    }

    async fn summarize(&self, monitor: &Monitor) -> ServiceResult<MonitorSummary> {
        let counts = self.repository.history_counts(monitor.id).await?;
        Ok(MonitorSummary::new(
            monitor,
            counts.data_logs,
            counts.cycle_aggregates,
        ))
    }

    /// Wipe the monitor's history and rebuild it as a single simulated tick
    pub async fn regenerate_simulated(&self, id: MonitorId) -> ServiceResult<ClientAction> {
        let _guard = self.locks.acquire(id).await;
        let mut monitor = self.load(id).await?;

        self.generator.reset_and_bulk_generate(&monitor).await?;

        // Keep live numbering contiguous with the regenerated tick
        monitor.total_ticks_generated = 1;
        monitor.last_update = self.clock.now();
        self.repository.save_monitor(&monitor).await?;

        tracing::info!("Regenerated simulated data for monitor {} ({})", id, monitor.variant);
        Ok(ClientAction::Reload)
    }

    pub async fn data_logs(&self, id: MonitorId) -> ServiceResult<Vec<DataLogEntry>> {
        self.load(id).await?;
        Ok(self.repository.data_logs(id).await?)
    }

    pub async fn cycles(&self, id: MonitorId) -> ServiceResult<Vec<CycleView>> {
        self.load(id).await?;
        let aggregates = self.repository.cycle_aggregates(id).await?;
        Ok(aggregates
            .into_iter()
            .map(|aggregate| {
                let chart = ChartPayload::for_tick(&aggregate);
                CycleView { aggregate, chart }
            })
            .collect())
    }

    pub async fn set_plc_endpoint(
        &self,
        id: MonitorId,
        address: Option<String>,
        port: Option<u16>,
    ) -> ServiceResult<Monitor> {
        let _guard = self.locks.acquire(id).await;
        let mut monitor = self.load(id).await?;
        monitor.plc.address = address;
        monitor.plc.port = port.unwrap_or(DEFAULT_PLC_PORT);
        monitor.last_update = self.clock.now();
        self.repository.save_monitor(&monitor).await?;
        Ok(monitor)
    }

    /// Simulated PLC connect; no traffic leaves the process
    pub async fn connect_plc(&self, id: MonitorId) -> ServiceResult<ClientAction> {
        let _guard = self.locks.acquire(id).await;
        let mut monitor = self.load(id).await?;
        self.apply_connect(&mut monitor).await
    }

    pub async fn disconnect_plc(&self, id: MonitorId) -> ServiceResult<ClientAction> {
        let _guard = self.locks.acquire(id).await;
        let mut monitor = self.load(id).await?;
        self.apply_disconnect(&mut monitor).await
    }

    pub async fn toggle_connection(&self, id: MonitorId) -> ServiceResult<ClientAction> {
        let _guard = self.locks.acquire(id).await;
        let mut monitor = self.load(id).await?;
        if monitor.is_connected {
            self.apply_disconnect(&mut monitor).await
        } else {
            self.apply_connect(&mut monitor).await
        }
    }

    async fn apply_connect(&self, monitor: &mut Monitor) -> ServiceResult<ClientAction> {
        let address = monitor
            .plc
            .configured_address()
            .ok_or(ServiceError::MissingPlcAddress)?
            .to_string();

        monitor.is_connected = true;
        monitor.last_update = self.clock.now();
        self.repository.save_monitor(monitor).await?;

        tracing::info!("Monitor {} connected to PLC at {}:{} (simulated)", monitor.id, address, monitor.plc.port);
        Ok(ClientAction::notify(
            format!("Connected to PLC at {} (Simulated)", address),
            NotificationLevel::Info,
        ))
    }

    async fn apply_disconnect(&self, monitor: &mut Monitor) -> ServiceResult<ClientAction> {
        monitor.is_connected = false;
        monitor.last_update = self.clock.now();
        self.repository.save_monitor(monitor).await?;

        tracing::info!("Monitor {} disconnected from PLC", monitor.id);
        Ok(ClientAction::notify("Disconnected from PLC", NotificationLevel::Info))
    }
}
