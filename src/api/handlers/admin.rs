use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    api::{
        handlers::{enrollments::EnrollmentDto, parse_kind},
        state::AppState,
    },
    error::{AppError, Result},
    repository::SubjectRepository,
    service::RevenueSummary,
};

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default = "default_limit")]
    limit: i64,
    #[serde(default)]
    offset: i64,
}

fn default_limit() -> i64 {
    50
}

#[derive(Debug, Serialize)]
pub struct ReconciliationResponse {
    pub pending: Vec<EnrollmentDto>,
    pub total: usize,
}

/// The reconciliation queue: pending rows from all three collections in
/// one view, oldest first.
pub async fn pending_enrollments(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ReconciliationResponse>> {
    let queue = state
        .service_context
        .enrollment_service
        .reconciliation_queue(params.limit, params.offset)
        .await?;

    let pending: Vec<EnrollmentDto> = queue
        .into_iter()
        .map(|p| EnrollmentDto::from_enrollment(p.kind, p.enrollment))
        .collect();
    let total = pending.len();

    Ok(Json(ReconciliationResponse { pending, total }))
}

/// The version the admin saw when the queue was rendered; the transition
/// fails explicitly if someone else acted in between.
#[derive(Debug, Deserialize)]
pub struct TransitionRequest {
    pub version: i64,
}

pub async fn confirm_enrollment(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, Uuid)>,
    Json(request): Json<TransitionRequest>,
) -> Result<Json<EnrollmentDto>> {
    let kind = parse_kind(&kind)?;

    let enrollment = state
        .service_context
        .enrollment_service
        .confirm(kind, id, request.version)
        .await?;

    Ok(Json(EnrollmentDto::from_enrollment(kind, enrollment)))
}

pub async fn cancel_enrollment(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, Uuid)>,
    Json(request): Json<TransitionRequest>,
) -> Result<Json<EnrollmentDto>> {
    let kind = parse_kind(&kind)?;

    let enrollment = state
        .service_context
        .enrollment_service
        .cancel(kind, id, request.version)
        .await?;

    Ok(Json(EnrollmentDto::from_enrollment(kind, enrollment)))
}

pub async fn stats(State(state): State<AppState>) -> Result<Json<RevenueSummary>> {
    let summary = state.service_context.stats_service.revenue_summary().await?;

    Ok(Json(summary))
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePriceRequest {
    #[validate(range(min = 0))]
    pub price_kwanzas: i64,
}

/// List-price changes never touch existing enrollment snapshots.
pub async fn update_price(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, Uuid)>,
    Json(request): Json<UpdatePriceRequest>,
) -> Result<Json<serde_json::Value>> {
    let kind = parse_kind(&kind)?;
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    state
        .service_context
        .subject_repo
        .update_price(kind, id, request.price_kwanzas)
        .await?;

    Ok(Json(serde_json::json!({ "updated": true })))
}
