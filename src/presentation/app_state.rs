// Application state for HTTP handlers
use crate::application::dashboard_service::DashboardService;
use crate::application::live_controller::LiveController;
use crate::application::monitor_service::MonitorService;

#[derive(Clone)]
pub struct AppState {
    pub monitor_service: MonitorService,
    pub live_controller: LiveController,
    pub dashboard_service: DashboardService,
}
