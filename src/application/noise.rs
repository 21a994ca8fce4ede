// Simulated sensor noise applied to planned displacements
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Mutex, PoisonError};

pub const NOISE_LOW: f64 = 0.95;
pub const NOISE_HIGH: f64 = 1.05;

/// Source of the multiplicative error applied to each planned value.
pub trait NoiseSource: Send + Sync {
    /// A multiplier in `[NOISE_LOW, NOISE_HIGH]`
    fn multiplier(&self) -> f64;
}

/// Unseeded noise drawn from the thread-local RNG
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRngNoise;

impl NoiseSource for ThreadRngNoise {
    fn multiplier(&self) -> f64 {
        rand::thread_rng().gen_range(NOISE_LOW..=NOISE_HIGH)
    }
}

/// Reproducible noise for demos and replays
#[derive(Debug)]
pub struct SeededNoise {
    rng: Mutex<StdRng>,
}

impl SeededNoise {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl NoiseSource for SeededNoise {
    fn multiplier(&self) -> f64 {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        rng.gen_range(NOISE_LOW..=NOISE_HIGH)
    }
}

#[cfg(test)]
pub struct FixedNoise(pub f64);

#[cfg(test)]
impl NoiseSource for FixedNoise {
    fn multiplier(&self) -> f64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_noise_in_range() {
        let noise = ThreadRngNoise;
        for _ in 0..1000 {
            let m = noise.multiplier();
            assert!((NOISE_LOW..=NOISE_HIGH).contains(&m), "multiplier {} out of range", m);
        }
    }

    #[test]
    fn test_seeded_noise_is_reproducible() {
        let a = SeededNoise::new(42);
        let b = SeededNoise::new(42);
        let xs: Vec<f64> = (0..16).map(|_| a.multiplier()).collect();
        let ys: Vec<f64> = (0..16).map(|_| b.multiplier()).collect();
        assert_eq!(xs, ys);
        assert!(xs.iter().all(|m| (NOISE_LOW..=NOISE_HIGH).contains(m)));
    }
}
