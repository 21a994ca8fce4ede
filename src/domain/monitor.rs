// Monitor domain model - one simulated rig per frequency variant
use super::frequency::FrequencyVariant;
use super::waveform;
use chrono::{DateTime, Utc};
use serde::Serialize;

pub type MonitorId = u64;

/// Default EtherNet/IP port
pub const DEFAULT_PLC_PORT: u16 = 44818;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlcEndpoint {
    pub address: Option<String>,
    pub port: u16,
}

impl Default for PlcEndpoint {
    fn default() -> Self {
        Self {
            address: None,
            port: DEFAULT_PLC_PORT,
        }
    }
}

impl PlcEndpoint {
    /// Address with surrounding whitespace removed, if one is configured
    pub fn configured_address(&self) -> Option<&str> {
        self.address
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LiveState {
    Stopped,
    Live,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Monitor {
    pub id: MonitorId,
    pub variant: FrequencyVariant,
    pub is_live: bool,
    pub total_ticks_generated: u64,
    pub last_generation_time: Option<DateTime<Utc>>,
    pub last_update: DateTime<Utc>,
    pub plc: PlcEndpoint,
    pub is_connected: bool,
}

impl Monitor {
    pub fn new(id: MonitorId, variant: FrequencyVariant, now: DateTime<Utc>) -> Self {
        Self {
            id,
            variant,
            is_live: false,
            total_ticks_generated: 0,
            last_generation_time: None,
            last_update: now,
            plc: PlcEndpoint::default(),
            is_connected: false,
        }
    }

    pub fn live_state(&self) -> LiveState {
        if self.is_live {
            LiveState::Live
        } else {
            LiveState::Stopped
        }
    }

    pub fn amplitude(&self) -> f64 {
        waveform::amplitude_for(self.variant)
    }

    pub fn cycle_count(&self) -> u32 {
        waveform::cycle_count_for(self.variant)
    }

    /// Tick number the next generation will be assigned
    pub fn next_tick_number(&self) -> u64 {
        self.total_ticks_generated + 1
    }
}

/// Read model combining a monitor with its derived labels and record counts
#[derive(Debug, Clone, Serialize)]
pub struct MonitorSummary {
    pub id: MonitorId,
    pub frequency: FrequencyVariant,
    pub frequency_value: u32,
    pub label: String,
    pub amplitude_threshold: &'static str,
    pub dimension_range: &'static str,
    pub movement_cycles: u64,
    pub state: LiveState,
    pub total_ticks: u64,
    pub last_generation_time: Option<DateTime<Utc>>,
    pub last_update: DateTime<Utc>,
    pub plc: PlcEndpoint,
    pub is_connected: bool,
    pub data_log_count: usize,
    pub cycle_data_count: usize,
}

impl MonitorSummary {
    pub fn new(monitor: &Monitor, data_log_count: usize, cycle_data_count: usize) -> Self {
        Self {
            id: monitor.id,
            frequency: monitor.variant,
            frequency_value: monitor.variant.frequency_value(),
            label: monitor.variant.label(),
            amplitude_threshold: monitor.variant.amplitude_threshold(),
            dimension_range: monitor.variant.dimension_range(),
            movement_cycles: monitor.variant.movement_cycles(),
            state: monitor.live_state(),
            total_ticks: monitor.total_ticks_generated,
            last_generation_time: monitor.last_generation_time,
            last_update: monitor.last_update,
            plc: monitor.plc.clone(),
            is_connected: monitor.is_connected,
            data_log_count,
            cycle_data_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_monitor_is_stopped() {
        let monitor = Monitor::new(1, FrequencyVariant::Hz3, Utc::now());
        assert_eq!(monitor.live_state(), LiveState::Stopped);
        assert_eq!(monitor.next_tick_number(), 1);
        assert_eq!(monitor.cycle_count(), 3);
        assert_eq!(monitor.amplitude(), 25.0);
        assert_eq!(monitor.plc.port, DEFAULT_PLC_PORT);
    }

    #[test]
    fn test_configured_address() {
        let mut plc = PlcEndpoint::default();
        assert_eq!(plc.configured_address(), None);
        plc.address = Some("   ".to_string());
        assert_eq!(plc.configured_address(), None);
        plc.address = Some(" 10.0.0.5 ".to_string());
        assert_eq!(plc.configured_address(), Some("10.0.0.5"));
    }
}
