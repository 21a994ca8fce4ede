// Dashboard service - Frequency selection and cumulative chart assembly
use crate::application::errors::{ServiceError, ServiceResult};
use crate::application::telemetry_repository::TelemetryRepository;
use crate::domain::chart::ChartPayload;
use crate::domain::dashboard::{Dashboard, DashboardRefresh, DashboardSnapshot, FrequencyBreakdown};
use crate::domain::frequency::FrequencyVariant;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone)]
pub struct DashboardService {
    repository: Arc<dyn TelemetryRepository>,
    dashboard: Arc<RwLock<Dashboard>>,
}

impl DashboardService {
    pub fn new(repository: Arc<dyn TelemetryRepository>) -> Self {
        Self {
            repository,
            dashboard: Arc::new(RwLock::new(Dashboard::default())),
        }
    }

    pub async fn snapshot(&self) -> ServiceResult<DashboardSnapshot> {
        let dashboard = self.dashboard.read().await.clone();
        let (breakdown, is_any_monitor_live) = self.fleet_overview().await?;
        let chart = match dashboard.selected_frequency {
            Some(variant) => self.chart_or_empty(variant).await?,
            None => ChartPayload::default(),
        };

        Ok(DashboardSnapshot {
            name: dashboard.name,
            selected_frequency: dashboard.selected_frequency,
            breakdown,
            is_any_monitor_live,
            chart,
        })
    }

    /// Select a variant and return its cumulative chart as JSON text.
    ///
    /// The selection is left untouched when no monitor serves the variant.
    pub async fn select_frequency(&self, variant: FrequencyVariant) -> ServiceResult<String> {
        let chart = self.chart_for(variant).await?;
        self.dashboard.write().await.selected_frequency = Some(variant);
        if chart.is_empty() {
            tracing::debug!("Dashboard selected {} with no history yet", variant);
        } else {
            tracing::debug!("Dashboard selected {} ({} points)", variant, chart.planned.len());
        }
        Ok(chart.to_json())
    }

    pub async fn clear_selection(&self) {
        self.dashboard.write().await.selected_frequency = None;
    }

    /// All ticks of the variant's monitor laid out on one time axis
    pub async fn chart_for(&self, variant: FrequencyVariant) -> ServiceResult<ChartPayload> {
        let monitor = self
            .repository
            .find_monitor_by_variant(variant)
            .await?
            .ok_or(ServiceError::NoMonitorForVariant(variant))?;
        let aggregates = self.repository.cycle_aggregates(monitor.id).await?;
        Ok(ChartPayload::cumulative(&aggregates))
    }

    async fn chart_or_empty(&self, variant: FrequencyVariant) -> ServiceResult<ChartPayload> {
        match self.chart_for(variant).await {
            Ok(chart) => Ok(chart),
            // The monitor may have been deleted after it was selected
            Err(ServiceError::NoMonitorForVariant(_)) => Ok(ChartPayload::default()),
            Err(e) => Err(e),
        }
    }

    pub async fn refresh(&self) -> ServiceResult<DashboardRefresh> {
        let selected = self.dashboard.read().await.selected_frequency;
        let (_, is_any_monitor_live) = self.fleet_overview().await?;

        let (chart, cycle_count) = match selected {
            Some(variant) => match self.repository.find_monitor_by_variant(variant).await? {
                Some(monitor) => {
                    let aggregates = self.repository.cycle_aggregates(monitor.id).await?;
                    (ChartPayload::cumulative(&aggregates), aggregates.len())
                }
                None => (ChartPayload::default(), 0),
            },
            None => (ChartPayload::default(), 0),
        };

        Ok(DashboardRefresh {
            chart_data: chart.to_json(),
            cycle_count,
            is_any_monitor_live,
        })
    }

    async fn fleet_overview(&self) -> ServiceResult<(FrequencyBreakdown, bool)> {
        let monitors = self.repository.list_monitors().await?;
        let mut breakdown = FrequencyBreakdown::default();
        for monitor in &monitors {
            breakdown.count(monitor.variant);
        }
        Ok((breakdown, monitors.iter().any(|m| m.is_live)))
    }
}
