//! Operator API, mounted under `/admin` when enabled.

pub mod auth;
pub mod handlers;

use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};

use self::auth::admin_auth_middleware;
use self::handlers::*;
use crate::http::server::AppState;

pub fn setup_admin_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/lockouts", get(get_lockouts))
        .route("/admin/lockouts/unlock", post(unlock))
        .route("/admin/dsar", get(list_dsar))
        .route("/admin/dsar/summary", get(dsar_summary))
        .route("/admin/dsar/{id}", patch(update_dsar))
        .route_layer(middleware::from_fn_with_state(state, admin_auth_middleware))
}
