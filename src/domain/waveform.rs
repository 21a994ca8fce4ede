//! Sinusoidal displacement model shared by every rig.
//!
//! A rig completes `frequency_value` sine periods per second and each period is
//! sampled at nine evenly spaced angles, 0° and 360° included.

use super::frequency::FrequencyVariant;

/// Sample points per period. The duplicate 0°/360° boundary is intentional.
pub const SAMPLE_ANGLES: [u32; 9] = [0, 45, 90, 135, 180, 225, 270, 315, 360];

/// Peak displacement in millimetres for a variant.
pub fn amplitude_for(variant: FrequencyVariant) -> f64 {
    match variant {
        FrequencyVariant::Hz2 => 50.0,
        FrequencyVariant::Hz3 => 25.0,
        FrequencyVariant::Hz5 => 12.5,
        FrequencyVariant::Hz7 => 8.3,
    }
}

/// Amplitude used when a variant code cannot be resolved
#[cfg(test)]
pub const DEFAULT_AMPLITUDE: f64 = 50.0;

/// Amplitude for a raw variant code, falling back to [`DEFAULT_AMPLITUDE`].
#[cfg(test)]
pub fn amplitude_for_code(code: &str) -> f64 {
    code.parse::<FrequencyVariant>()
        .map(amplitude_for)
        .unwrap_or(DEFAULT_AMPLITUDE)
}

/// Number of sub-cycles in one tick.
pub fn cycle_count_for(variant: FrequencyVariant) -> u32 {
    variant.frequency_value()
}

pub fn sample_angles() -> &'static [u32] {
    &SAMPLE_ANGLES
}

/// Planned (noise-free) displacement at an angle.
pub fn displacement(angle_degrees: f64, amplitude: f64) -> f64 {
    amplitude * angle_degrees.to_radians().sin()
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
