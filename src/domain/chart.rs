// Chart-ready series reshaped from cycle aggregates
use super::telemetry::{CycleAggregate, SamplePoint};
use serde::{Deserialize, Serialize};

/// Simulated seconds covered by one tick
pub const TICK_SECONDS: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub degree: u32,
    pub value: f64,
    pub time: f64,
    /// Tick number the sample belongs to
    pub cycle: u64,
    pub sub_cycle: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartPayload {
    pub planned: Vec<ChartPoint>,
    pub actual: Vec<ChartPoint>,
}

impl ChartPayload {
    /// Chart of a single tick on its local time axis.
    ///
    /// A payload that fails to decode yields empty series.
    pub fn for_tick(aggregate: &CycleAggregate) -> Self {
        let mut chart = Self::default();
        chart.extend_from(aggregate, 0.0);
        chart
    }

    /// Concatenates ticks onto one time axis, shifting the k-th aggregate by
    /// `k * TICK_SECONDS`. Aggregates are expected in tick order.
    pub fn cumulative<'a, I>(aggregates: I) -> Self
    where
        I: IntoIterator<Item = &'a CycleAggregate>,
    {
        let mut chart = Self::default();
        for (index, aggregate) in aggregates.into_iter().enumerate() {
            // A malformed tick still occupies its slot on the axis
            chart.extend_from(aggregate, index as f64 * TICK_SECONDS);
        }
        chart
    }

    fn extend_from(&mut self, aggregate: &CycleAggregate, offset: f64) {
        match aggregate.samples() {
            Ok(samples) => {
                for sample in &samples {
                    self.push_sample(aggregate.tick_number, sample, offset);
                }
            }
            Err(e) => {
                tracing::warn!(
                    "Skipping malformed payload for monitor {} tick {}: {}",
                    aggregate.monitor_id,
                    aggregate.tick_number,
                    e
                );
            }
        }
    }

    fn push_sample(&mut self, tick_number: u64, sample: &SamplePoint, offset: f64) {
        let point = |value: f64| ChartPoint {
            degree: sample.degree,
            value,
            time: sample.time + offset,
            cycle: tick_number,
            sub_cycle: sample.sub_cycle,
        };
        self.planned.push(point(sample.planned));
        self.actual.push(point(sample.actual));
    }

    pub fn is_empty(&self) -> bool {
        self.planned.is_empty() && self.actual.is_empty()
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"planned":[],"actual":[]}"#.to_string())
    }
}
