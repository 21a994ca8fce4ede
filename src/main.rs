// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use tracing_subscriber::EnvFilter;

use crate::application::clock::{Clock, SystemClock};
use crate::application::cycle_generator::CycleGenerator;
use crate::application::dashboard_service::DashboardService;
use crate::application::live_controller::LiveController;
use crate::application::monitor_locks::MonitorLocks;
use crate::application::monitor_service::MonitorService;
use crate::application::noise::{NoiseSource, SeededNoise, ThreadRngNoise};
use crate::application::scheduler::LiveScheduler;
use crate::application::telemetry_repository::TelemetryRepository;
use crate::infrastructure::config::load_app_config;
use crate::infrastructure::memory_repository::InMemoryRepository;
use crate::presentation::app_state::AppState;
use crate::presentation::router::build_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing, RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = load_app_config()?;

    // Create repository (infrastructure layer)
    let repository: Arc<dyn TelemetryRepository> = Arc::new(InMemoryRepository::new());
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let noise: Arc<dyn NoiseSource> = match config.simulation.noise_seed {
        Some(seed) => {
            tracing::info!("Using seeded noise source (seed {})", seed);
            Arc::new(SeededNoise::new(seed))
        }
        None => Arc::new(ThreadRngNoise),
    };

    // Create services (application layer)
    let locks = MonitorLocks::default();
    let generator = CycleGenerator::new(repository.clone(), noise, clock.clone());
    let monitor_service = MonitorService::new(
        repository.clone(),
        generator.clone(),
        clock.clone(),
        locks.clone(),
    );
    let live_controller = LiveController::new(
        repository.clone(),
        generator,
        clock,
        locks,
        config.live.settings(),
    );
    let dashboard_service = DashboardService::new(repository);

    if config.simulation.seed_fleet {
        let fleet = monitor_service.seed_fleet().await?;
        tracing::info!("Seeded {} monitors", fleet.len());
    }

    if config.live.scheduler.enabled {
        let period = config.live.scheduler.period();
        tracing::info!("Starting live scheduler every {:?}", period);
        LiveScheduler::new(live_controller.clone(), period).spawn();
    }

    let state = Arc::new(AppState {
        monitor_service,
        live_controller,
        dashboard_service,
    });

    // Build router (presentation layer)
    let router = build_router(state);

    let addr: SocketAddr = config.server.bind.parse()?;
    tracing::info!("Starting vibration-telemetry service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
