//! Cross-origin endpoints called by the embedded widget.
//!
//! Every response, errors included, carries the CORS header set for the
//! website the request names, so the widget can read what went wrong. Form
//! bodies are read as raw bytes for that reason: a body that does not fit
//! the expected shape is still searched for its `website_id` and answered
//! with a 400 under that site's headers.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::consent::{ConsentReceipt, ConsentSubmission};
use crate::dsar::{DsarRequestType, DsarStatus, NewDsar};
use crate::http::error::ApiError;
use crate::http::response::with_cors;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::security::cors::{self, CorsDecision};
use crate::websites::{BannerSettings, Website, CONSENT_CATEGORIES};

#[derive(Debug, Serialize, Deserialize)]
pub struct WidgetConfig {
    pub website_id: String,
    pub name: String,
    pub banner: BannerSettings,
    pub categories: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DsarReceipt {
    pub id: Uuid,
    pub status: DsarStatus,
    pub request_type: DsarRequestType,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub due_date: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Deserialize)]
pub struct PreflightQuery {
    pub website_id: Option<String>,
}

fn cors_for(state: &AppState, headers: &HeaderMap, site: Option<&Website>) -> CorsDecision {
    let origin = headers.get(header::ORIGIN).and_then(|v| v.to_str().ok());
    cors::resolve(
        origin,
        site.map(|s| s.domain.as_str()),
        &state.config.listener.app_origin,
    )
}

/// Parse a form body, returning the `website_id` it names even when the
/// rest of the body is rejected.
fn parse_form<T: DeserializeOwned>(body: &[u8]) -> (Option<String>, Result<T, ApiError>) {
    let value: Value = match serde_json::from_slice(body) {
        Ok(value) => value,
        Err(e) => {
            return (
                None,
                Err(ApiError::Validation(format!("request body is not valid JSON: {e}"))),
            )
        }
    };
    let website_id = value
        .get("website_id")
        .and_then(Value::as_str)
        .map(str::to_owned);
    let parsed = serde_json::from_value(value)
        .map_err(|e| ApiError::Validation(format!("invalid request: {e}")));
    (website_id, parsed)
}

fn unknown_website(id: &str) -> ApiError {
    ApiError::NotFound(format!("website '{id}' is not registered"))
}

pub async fn widget_config(
    State(state): State<AppState>,
    Path(website_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let site = state.websites.get(&website_id);
    let cors = cors_for(&state, &headers, site);

    let result = site
        .map(|site| {
            Json(WidgetConfig {
                website_id: site.id.clone(),
                name: site.name.clone(),
                banner: site.banner.clone(),
                categories: CONSENT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
            })
        })
        .ok_or_else(|| unknown_website(&website_id));

    with_cors(result.into_response(), &cors)
}

pub async fn widget_preflight(
    State(state): State<AppState>,
    Path(website_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let cors = cors_for(&state, &headers, state.websites.get(&website_id));
    with_cors(StatusCode::NO_CONTENT.into_response(), &cors)
}

/// Preflight for the form endpoints. The body is not available yet, so the
/// widget passes its website id as a query parameter.
pub async fn form_preflight(
    State(state): State<AppState>,
    Query(query): Query<PreflightQuery>,
    headers: HeaderMap,
) -> Response {
    let site = query
        .website_id
        .as_deref()
        .and_then(|id| state.websites.get(id));
    let cors = cors_for(&state, &headers, site);
    with_cors(StatusCode::NO_CONTENT.into_response(), &cors)
}

pub async fn submit_consent(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let (website_id, parsed) = parse_form::<ConsentSubmission>(&body);
    let site = website_id.as_deref().and_then(|id| state.websites.get(id));
    let cors = cors_for(&state, &headers, site);

    let result = parsed.and_then(|submission| match site {
        None => Err(unknown_website(&submission.website_id)),
        Some(_) => record_consent(&state, submission),
    });

    with_cors(result.into_response(), &cors)
}

fn record_consent(
    state: &AppState,
    submission: ConsentSubmission,
) -> Result<(StatusCode, Json<ConsentReceipt>), ApiError> {
    submission.validate().map_err(ApiError::Validation)?;

    let receipt = ConsentReceipt {
        consent_id: Uuid::new_v4(),
        categories: submission.categories.effective(submission.action),
        website_id: submission.website_id,
        action: submission.action,
        recorded_at: state.clock.now(),
    };

    tracing::info!(
        consent_id = %receipt.consent_id,
        website_id = %receipt.website_id,
        action = receipt.action.as_str(),
        "Consent recorded"
    );
    metrics::record_consent(receipt.action.as_str());

    Ok((StatusCode::CREATED, Json(receipt)))
}

pub async fn submit_dsar(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let (website_id, parsed) = parse_form::<NewDsar>(&body);
    let site = website_id.as_deref().and_then(|id| state.websites.get(id));
    let cors = cors_for(&state, &headers, site);

    let result = parsed.and_then(|request| match site {
        None => Err(unknown_website(&request.website_id)),
        Some(_) => state
            .dsar
            .submit(request)
            .map_err(ApiError::from)
            .map(|record| {
                tracing::info!(
                    dsar_id = %record.id,
                    website_id = %record.website_id,
                    request_type = record.request_type.as_str(),
                    due_date = %record.due_date,
                    "DSAR submitted"
                );
                metrics::record_dsar_submitted(record.request_type.as_str());
                (
                    StatusCode::CREATED,
                    Json(DsarReceipt {
                        id: record.id,
                        status: record.status,
                        request_type: record.request_type,
                        created_at: record.created_at,
                        due_date: record.due_date,
                    }),
                )
            }),
    });

    with_cors(result.into_response(), &cors)
}
