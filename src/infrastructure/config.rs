use crate::application::live_controller::{LiveSettings, StartPolicy};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub simulation: SimulationSettings,
    #[serde(default)]
    pub live: LiveConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SimulationSettings {
    /// Create one monitor per frequency variant at startup
    #[serde(default = "default_true")]
    pub seed_fleet: bool,
    /// Switches sensor noise to a reproducible seeded generator
    #[serde(default)]
    pub noise_seed: Option<u64>,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            seed_fleet: true,
            noise_seed: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LiveConfig {
    #[serde(default)]
    pub start_policy: StartPolicy,
    #[serde(default = "default_interval_ms")]
    pub min_interval_ms: u64,
    #[serde(default)]
    pub scheduler: SchedulerSettings,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            start_policy: StartPolicy::default(),
            min_interval_ms: default_interval_ms(),
            scheduler: SchedulerSettings::default(),
        }
    }
}

impl LiveConfig {
    pub fn settings(&self) -> LiveSettings {
        LiveSettings {
            start_policy: self.start_policy,
            min_interval: Duration::from_millis(self.min_interval_ms),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SchedulerSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_interval_ms")]
    pub period_ms: u64,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            period_ms: default_interval_ms(),
        }
    }
}

impl SchedulerSettings {
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_true() -> bool {
    true
}

fn default_interval_ms() -> u64 {
    1000
}

/// Load `config/server.*` (optional) overlaid with `VIBRATION__SECTION__KEY`
/// environment variables
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/server").required(false))
        .add_source(
            config::Environment::with_prefix("VIBRATION")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize::<AppConfig>()?.validated()
}

impl AppConfig {
    /// Reject settings that would disable the generation floor or stall the
    /// scheduler's timer
    pub fn validated(self) -> anyhow::Result<Self> {
        anyhow::ensure!(
            self.live.min_interval_ms > 0,
            "live.min_interval_ms must be greater than zero"
        );
        anyhow::ensure!(
            self.live.scheduler.period_ms > 0,
            "live.scheduler.period_ms must be greater than zero"
        );
        Ok(self)
    }
}
