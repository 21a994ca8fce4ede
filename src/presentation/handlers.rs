// HTTP request handlers
use crate::application::errors::ServiceError;
use crate::application::live_controller::{GenerateOutcome, LiveMonitor, LiveStatus, ToggleResult};
use crate::application::telemetry_repository::RepositoryError;
use crate::domain::dashboard::{DashboardRefresh, DashboardSnapshot};
use crate::domain::frequency::FrequencyVariant;
use crate::domain::monitor::{MonitorId, MonitorSummary};
use crate::domain::notification::ClientAction;
use crate::infrastructure::chunked_json::stream_from_receiver;
use crate::infrastructure::http_response::{accepts_brotli, json_response, json_text_response};
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Service errors rendered as a warning notification
pub struct ApiError(ServiceError);

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        Self(err)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            ServiceError::MonitorNotFound(_)
            | ServiceError::NoMonitorForVariant(_)
            | ServiceError::Repository(RepositoryError::MonitorNotFound(_)) => StatusCode::NOT_FOUND,
            ServiceError::MissingPlcAddress => StatusCode::UNPROCESSABLE_ENTITY,
            ServiceError::Repository(RepositoryError::DuplicateVariant(_)) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if !self.0.is_configuration() {
            tracing::error!("Request failed: {}", self.0);
        }
        (self.status(), Json(ClientAction::warning(self.0.to_string()))).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

fn encoded(result: Result<Response, StatusCode>) -> Response {
    match result {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

#[derive(Debug, Serialize, PartialEq)]
pub struct GenerateNextResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_ticks: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait_seconds: Option<f64>,
    pub message: String,
}

impl From<GenerateOutcome> for GenerateNextResponse {
    fn from(outcome: GenerateOutcome) -> Self {
        let success = outcome.is_success();
        match outcome {
            GenerateOutcome::Generated { total_ticks } => Self {
                success,
                total_ticks: Some(total_ticks),
                wait_seconds: None,
                message: "Tick generated".to_string(),
            },
            GenerateOutcome::TooSoon { wait_seconds } => Self {
                success,
                total_ticks: None,
                wait_seconds: Some(wait_seconds),
                message: "Too soon".to_string(),
            },
            GenerateOutcome::NotLive => Self {
                success,
                total_ticks: None,
                wait_seconds: None,
                message: "Live mode is not active".to_string(),
            },
            GenerateOutcome::Failed { message } => Self {
                success,
                total_ticks: None,
                wait_seconds: None,
                message,
            },
        }
    }
}

#[derive(Deserialize)]
pub struct CreateMonitorRequest {
    pub frequency: FrequencyVariant,
}

#[derive(Deserialize)]
pub struct PlcEndpointRequest {
    pub address: Option<String>,
    pub port: Option<u16>,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

pub async fn list_monitors(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<MonitorSummary>>> {
    Ok(Json(state.monitor_service.list_summaries().await?))
}

pub async fn create_monitor(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateMonitorRequest>,
) -> ApiResult<(StatusCode, Json<MonitorSummary>)> {
    let monitor = state.monitor_service.register(request.frequency).await?;
    let summary = state.monitor_service.summary(monitor.id).await?;
    Ok((StatusCode::CREATED, Json(summary)))
}

pub async fn get_monitor(
    Path(id): Path<MonitorId>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<MonitorSummary>> {
    Ok(Json(state.monitor_service.summary(id).await?))
}

pub async fn delete_monitor(
    Path(id): Path<MonitorId>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<StatusCode> {
    state.monitor_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn toggle_live(
    Path(id): Path<MonitorId>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<ToggleResult>> {
    Ok(Json(state.live_controller.toggle_live(id).await?))
}

pub async fn start_live(
    Path(id): Path<MonitorId>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<LiveStatus>> {
    let monitor = state.live_controller.start(id).await?;
    Ok(Json(LiveStatus {
        is_live: monitor.is_live,
        total_ticks: monitor.total_ticks_generated,
    }))
}

pub async fn stop_live(
    Path(id): Path<MonitorId>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<LiveStatus>> {
    let monitor = state.live_controller.stop(id).await?;
    Ok(Json(LiveStatus {
        is_live: monitor.is_live,
        total_ticks: monitor.total_ticks_generated,
    }))
}

/// Polled by clients roughly once per second while live
pub async fn generate_next_tick(
    Path(id): Path<MonitorId>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<GenerateNextResponse>> {
    let outcome = state.live_controller.generate_next(id).await?;
    Ok(Json(outcome.into()))
}

pub async fn check_live_status(
    Path(id): Path<MonitorId>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<LiveStatus>> {
    Ok(Json(state.live_controller.check_live_status(id).await?))
}

pub async fn list_live_monitors(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<LiveMonitor>>> {
    Ok(Json(state.live_controller.list_live_monitors().await?))
}

pub async fn regenerate_simulated(
    Path(id): Path<MonitorId>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<ClientAction>> {
    Ok(Json(state.monitor_service.regenerate_simulated(id).await?))
}

pub async fn data_logs(
    Path(id): Path<MonitorId>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Response> {
    let logs = state.monitor_service.data_logs(id).await?;
    Ok(encoded(json_response(&logs, accepts_brotli(&headers)).await))
}

pub async fn cycles(
    Path(id): Path<MonitorId>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Response> {
    let cycles = state.monitor_service.cycles(id).await?;
    Ok(encoded(json_response(&cycles, accepts_brotli(&headers)).await))
}

/// Stream ticks of one monitor as they are generated
pub async fn live_feed(
    Path(id): Path<MonitorId>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Response> {
    // Reject unknown monitors before opening a stream that would never yield
    state.live_controller.check_live_status(id).await?;
    let rx = state.live_controller.subscribe();
    Ok(stream_from_receiver(rx, id, accepts_brotli(&headers)).into_response())
}

pub async fn set_plc_endpoint(
    Path(id): Path<MonitorId>,
    State(state): State<Arc<AppState>>,
    Json(request): Json<PlcEndpointRequest>,
) -> ApiResult<Json<MonitorSummary>> {
    state
        .monitor_service
        .set_plc_endpoint(id, request.address, request.port)
        .await?;
    Ok(Json(state.monitor_service.summary(id).await?))
}

pub async fn connect_plc(
    Path(id): Path<MonitorId>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<ClientAction>> {
    Ok(Json(state.monitor_service.connect_plc(id).await?))
}

pub async fn disconnect_plc(
    Path(id): Path<MonitorId>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<ClientAction>> {
    Ok(Json(state.monitor_service.disconnect_plc(id).await?))
}

pub async fn toggle_plc(
    Path(id): Path<MonitorId>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<ClientAction>> {
    Ok(Json(state.monitor_service.toggle_connection(id).await?))
}

pub async fn dashboard(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Response> {
    let snapshot: DashboardSnapshot = state.dashboard_service.snapshot().await?;
    Ok(encoded(json_response(&snapshot, accepts_brotli(&headers)).await))
}

/// Select a frequency and answer with its chart as JSON text
pub async fn select_frequency(
    Path(frequency): Path<FrequencyVariant>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Response> {
    let chart_json = state.dashboard_service.select_frequency(frequency).await?;
    Ok(encoded(json_text_response(chart_json, accepts_brotli(&headers)).await))
}

pub async fn clear_selection(State(state): State<Arc<AppState>>) -> StatusCode {
    state.dashboard_service.clear_selection().await;
    StatusCode::NO_CONTENT
}

pub async fn dashboard_refresh(State(state): State<Arc<AppState>>) -> ApiResult<Json<DashboardRefresh>> {
    Ok(Json(state.dashboard_service.refresh().await?))
}
