// Application layer - Use cases over the record store
pub mod clock;
pub mod cycle_generator;
pub mod dashboard_service;
pub mod errors;
pub mod live_controller;
pub mod monitor_locks;
pub mod monitor_service;
pub mod noise;
pub mod scheduler;
pub mod telemetry_repository;
