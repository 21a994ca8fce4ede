// Route table
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::*;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn build_router(state: Arc<AppState>) -> Router {
    // Compression is handled per response, so no CompressionLayer here
    Router::new()
        .route("/healthz", get(health_check))
        .route("/monitors", get(list_monitors).post(create_monitor))
        .route("/monitors/:id", get(get_monitor).delete(delete_monitor))
        .route("/monitors/:id/live", get(check_live_status))
        .route("/monitors/:id/live/toggle", post(toggle_live))
        .route("/monitors/:id/live/start", post(start_live))
        .route("/monitors/:id/live/stop", post(stop_live))
        .route("/monitors/:id/live/next", post(generate_next_tick))
        .route("/monitors/:id/simulate", post(regenerate_simulated))
        .route("/monitors/:id/logs", get(data_logs))
        .route("/monitors/:id/cycles", get(cycles))
        .route("/monitors/:id/feed", get(live_feed))
        .route("/monitors/:id/plc", axum::routing::put(set_plc_endpoint))
        .route("/monitors/:id/plc/connect", post(connect_plc))
        .route("/monitors/:id/plc/disconnect", post(disconnect_plc))
        .route("/monitors/:id/plc/toggle", post(toggle_plc))
        .route("/live-monitors", get(list_live_monitors))
        .route("/dashboard", get(dashboard))
        .route("/dashboard/select/:frequency", post(select_frequency))
        .route("/dashboard/clear", post(clear_selection))
        .route("/dashboard/refresh", get(dashboard_refresh))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
