// Domain layer - Rig models, waveform math and chart shapes
pub mod chart;
pub mod dashboard;
pub mod frequency;
pub mod monitor;
pub mod notification;
pub mod telemetry;
pub mod waveform;
