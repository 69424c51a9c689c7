use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dsar::{DsarStatus, DsarSummary, DsarView};
use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::security::login_guard::LockoutEntry;

#[derive(Serialize, Deserialize)]
pub struct SystemStatus {
    pub version: String,
    pub status: String,
    pub tracked_clients: usize,
    pub active_lockouts: usize,
    pub dsar_requests: usize,
    pub websites: usize,
}

#[derive(Serialize, Deserialize)]
pub struct UnlockRequest {
    pub email: String,
    pub ip: String,
}

#[derive(Serialize, Deserialize)]
pub struct UnlockResponse {
    pub unlocked: bool,
}

#[derive(Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: DsarStatus,
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "operational".to_string(),
        tracked_clients: state.throttle.tracked(),
        active_lockouts: state.login_guard.active_lockouts().len(),
        dsar_requests: state.dsar.len(),
        websites: state.websites.len(),
    })
}

pub async fn get_lockouts(State(state): State<AppState>) -> Json<Vec<LockoutEntry>> {
    Json(state.login_guard.active_lockouts())
}

pub async fn unlock(
    State(state): State<AppState>,
    Json(request): Json<UnlockRequest>,
) -> Json<UnlockResponse> {
    Json(UnlockResponse {
        unlocked: state.login_guard.unlock(&request.email, &request.ip),
    })
}

pub async fn list_dsar(State(state): State<AppState>) -> Json<Vec<DsarView>> {
    Json(state.dsar.list())
}

pub async fn update_dsar(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(update): Json<StatusUpdate>,
) -> Result<Json<DsarView>, ApiError> {
    let view = state.dsar.update_status(id, update.status)?;
    tracing::info!(dsar_id = %id, status = update.status.as_str(), "DSAR status updated");
    Ok(Json(view))
}

pub async fn dsar_summary(State(state): State<AppState>) -> Json<DsarSummary> {
    Json(state.dsar.summary(state.config.dsar.due_soon_days))
}
