// Telemetry records produced by the cycle generator
use super::frequency::FrequencyVariant;
use super::monitor::MonitorId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One sample as embedded in an aggregate's payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplePoint {
    #[serde(alias = "cycle")]
    pub sub_cycle: u32,
    pub degree: u32,
    /// Seconds since the start of the tick
    pub time: f64,
    pub planned: f64,
    pub actual: f64,
}

/// Fine-grained per-sample log row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataLogEntry {
    pub monitor_id: MonitorId,
    pub tick_number: u64,
    pub sub_cycle: u32,
    pub degree: u32,
    pub planned: f64,
    pub actual: f64,
    pub timestamp: DateTime<Utc>,
    pub time_in_cycle: f64,
    pub time_in_tick: f64,
}

/// First-sub-cycle mirror kept for consumers of the single-cycle record layout
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegacyAngleSample {
    pub degree: u32,
    pub planned: f64,
    pub actual: f64,
    pub planned_time: f64,
    pub actual_time: f64,
}

/// Per-tick rollup row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleAggregate {
    pub monitor_id: MonitorId,
    pub tick_number: u64,
    pub timestamp: DateTime<Utc>,
    /// JSON array of [`SamplePoint`]s in generation order
    pub all_data_points: String,
    pub legacy: Vec<LegacyAngleSample>,
}

impl CycleAggregate {
    pub fn samples(&self) -> Result<Vec<SamplePoint>, serde_json::Error> {
        serde_json::from_str(&self.all_data_points)
    }

    #[cfg(test)]
    pub fn legacy_for(&self, degree: u32) -> Option<&LegacyAngleSample> {
        self.legacy.iter().find(|s| s.degree == degree)
    }
}

/// Everything one tick writes to the record store
#[derive(Debug, Clone)]
pub struct TickBatch {
    pub logs: Vec<DataLogEntry>,
    pub aggregate: CycleAggregate,
    pub samples: Vec<SamplePoint>,
}

/// Published on the live feed after every successful live generation
#[derive(Debug, Clone, Serialize)]
pub struct TickEvent {
    pub monitor_id: MonitorId,
    pub frequency: FrequencyVariant,
    pub tick_number: u64,
    pub total_ticks: u64,
    pub timestamp: DateTime<Utc>,
    pub samples: Vec<SamplePoint>,
}
