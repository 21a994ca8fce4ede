//! Tick generation: one second of samples across every sub-cycle of a rig.
//!
//! Each tick holds `cycle_count` sub-cycles and each sub-cycle is sampled at
//! the nine angles of [`waveform::SAMPLE_ANGLES`]. The planned value is the
//! pure sine displacement; the actual value is the planned value scaled by the
//! injected [`NoiseSource`].

use crate::application::clock::Clock;
use crate::application::errors::ServiceResult;
use crate::application::noise::NoiseSource;
use crate::application::telemetry_repository::TelemetryRepository;
use crate::domain::chart::TICK_SECONDS;
use crate::domain::monitor::Monitor;
use crate::domain::telemetry::{
    CycleAggregate, DataLogEntry, LegacyAngleSample, SamplePoint, TickBatch,
};
use crate::domain::waveform::{self, round_to};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Build one tick's records without touching storage.
///
/// The time offsets assume the nine-point angle table; the last angle lands
/// exactly on the end of its sub-cycle.
pub fn build_tick(
    monitor: &Monitor,
    tick_number: u64,
    started_at: DateTime<Utc>,
    noise: &dyn NoiseSource,
) -> Result<TickBatch, serde_json::Error> {
    let amplitude = monitor.amplitude();
    let cycle_count = monitor.cycle_count();
    let angles = waveform::sample_angles();
    let sub_cycle_duration = TICK_SECONDS / cycle_count as f64;
    let last_index = (angles.len() - 1) as f64;

    let capacity = cycle_count as usize * angles.len();
    let mut samples = Vec::with_capacity(capacity);
    let mut logs = Vec::with_capacity(capacity);

    for cycle in 0..cycle_count {
        for (i, &degree) in angles.iter().enumerate() {
            // Fraction of the sub-cycle elapsed at this angle
            let phase = i as f64 / last_index;
            let time_in_cycle = phase * sub_cycle_duration;
            // Divide once so sub-cycle boundaries coincide and the tick ends at exactly 1 s
            let time_in_tick = (cycle as f64 + phase) / cycle_count as f64 * TICK_SECONDS;
            let planned = waveform::displacement(degree as f64, amplitude);
            let actual = planned * noise.multiplier();

            samples.push(SamplePoint {
                sub_cycle: cycle + 1,
                degree,
                time: time_in_tick,
                planned,
                actual,
            });

            logs.push(DataLogEntry {
                monitor_id: monitor.id,
                tick_number,
                sub_cycle: cycle + 1,
                degree,
                planned: round_to(planned, 2),
                actual: round_to(actual, 2),
                timestamp: started_at + offset(time_in_tick),
                time_in_cycle: round_to(time_in_cycle, 4),
                time_in_tick: round_to(time_in_tick, 4),
            });
        }
    }

    let legacy = samples
        .iter()
        .take(angles.len())
        .map(|s| LegacyAngleSample {
            degree: s.degree,
            planned: round_to(s.planned, 2),
            actual: round_to(s.actual, 2),
            planned_time: round_to(s.time, 4),
            actual_time: round_to(s.time, 4),
        })
        .collect();

    let aggregate = CycleAggregate {
        monitor_id: monitor.id,
        tick_number,
        timestamp: started_at,
        all_data_points: serde_json::to_string(&samples)?,
        legacy,
    };

    Ok(TickBatch {
        logs,
        aggregate,
        samples,
    })
}

fn offset(seconds: f64) -> chrono::Duration {
    chrono::Duration::microseconds((seconds * 1_000_000.0).round() as i64)
}

#[derive(Clone)]
pub struct CycleGenerator {
    repository: Arc<dyn TelemetryRepository>,
    noise: Arc<dyn NoiseSource>,
    clock: Arc<dyn Clock>,
}

impl CycleGenerator {
    pub fn new(
        repository: Arc<dyn TelemetryRepository>,
        noise: Arc<dyn NoiseSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            noise,
            clock,
        }
    }

    /// Generate and persist tick `tick_number` for the monitor.
    ///
    /// The caller owns tick numbering and must pass the next unused number.
    pub async fn generate_tick(&self, monitor: &Monitor, tick_number: u64) -> ServiceResult<TickBatch> {
        let batch = build_tick(monitor, tick_number, self.clock.now(), self.noise.as_ref())?;
        self.repository.append_tick(&batch).await?;

        tracing::debug!(
            "Generated tick {} for monitor {} ({}): {} samples",
            tick_number,
            monitor.id,
            monitor.variant,
            batch.logs.len()
        );
        Ok(batch)
    }

    /// Discard the monitor's history and regenerate it as a single tick numbered 1
    pub async fn reset_and_bulk_generate(&self, monitor: &Monitor) -> ServiceResult<TickBatch> {
        self.repository.clear_history(monitor.id).await?;
        self.generate_tick(monitor, 1).await
    }
}
