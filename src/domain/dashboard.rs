// Dashboard domain model
use super::chart::ChartPayload;
use super::frequency::FrequencyVariant;
use serde::Serialize;

pub const DEFAULT_DASHBOARD_NAME: &str = "Vibration Dashboard";

#[derive(Debug, Clone)]
pub struct Dashboard {
    pub name: String,
    pub selected_frequency: Option<FrequencyVariant>,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self {
            name: DEFAULT_DASHBOARD_NAME.to_string(),
            selected_frequency: None,
        }
    }
}

/// Monitor count per frequency variant
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FrequencyBreakdown {
    pub monitors_2hz: usize,
    pub monitors_3hz: usize,
    pub monitors_5hz: usize,
    pub monitors_7hz: usize,
}

impl FrequencyBreakdown {
    pub fn count(&mut self, variant: FrequencyVariant) {
        match variant {
            FrequencyVariant::Hz2 => self.monitors_2hz += 1,
            FrequencyVariant::Hz3 => self.monitors_3hz += 1,
            FrequencyVariant::Hz5 => self.monitors_5hz += 1,
            FrequencyVariant::Hz7 => self.monitors_7hz += 1,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub name: String,
    pub selected_frequency: Option<FrequencyVariant>,
    pub breakdown: FrequencyBreakdown,
    pub is_any_monitor_live: bool,
    pub chart: ChartPayload,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardRefresh {
    /// Chart payload encoded as JSON text
    pub chart_data: String,
    pub cycle_count: usize,
    pub is_any_monitor_live: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breakdown_counts() {
        let mut breakdown = FrequencyBreakdown::default();
        for v in [FrequencyVariant::Hz2, FrequencyVariant::Hz7, FrequencyVariant::Hz7] {
            breakdown.count(v);
        }
        assert_eq!(breakdown.monitors_2hz, 1);
        assert_eq!(breakdown.monitors_3hz, 0);
        assert_eq!(breakdown.monitors_7hz, 2);
    }
}
