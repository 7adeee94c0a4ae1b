use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    api::{handlers::parse_kind, middleware::auth::CurrentUser, state::AppState},
    domain::{Enrollment, SubjectKind},
    error::Result,
    repository::EnrollmentRepository,
    service::EnrollmentSubmission,
};

#[derive(Debug, Serialize)]
pub struct EnrollmentDto {
    pub id: Uuid,
    pub kind: SubjectKind,
    pub subject_id: Uuid,
    /// Wire label: "pending" | "cancelled" | "paid" (classes, courses) or
    /// "confirmed" (mentorships).
    pub status: String,
    pub payment_reference: String,
    pub amount_kwanzas: i64,
    pub payment_method: String,
    pub version: i64,
    pub enrolled_at: String,
    pub paid_at: Option<String>,
}

impl EnrollmentDto {
    pub fn from_enrollment(kind: SubjectKind, enrollment: Enrollment) -> Self {
        Self {
            id: enrollment.id,
            kind,
            subject_id: enrollment.subject_id,
            status: enrollment.status.wire_label(kind).to_string(),
            payment_reference: enrollment.payment_reference,
            amount_kwanzas: enrollment.amount_kwanzas,
            payment_method: enrollment.payment_method,
            version: enrollment.version,
            enrolled_at: enrollment.enrolled_at.to_rfc3339(),
            paid_at: enrollment.paid_at.map(|dt| dt.to_rfc3339()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EnrollmentReceiptDto {
    pub enrollment: EnrollmentDto,
    pub instructions: String,
}

/// Member enrolls themselves; the target row is always keyed by the
/// session identity, never by an id in the payload.
pub async fn enroll(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(kind): Path<String>,
    Json(submission): Json<EnrollmentSubmission>,
) -> Result<(StatusCode, Json<EnrollmentReceiptDto>)> {
    let kind = parse_kind(&kind)?;

    let receipt = state
        .service_context
        .enrollment_service
        .enroll(kind, user.member.id, submission)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(EnrollmentReceiptDto {
            enrollment: EnrollmentDto::from_enrollment(kind, receipt.enrollment),
            instructions: receipt.instructions,
        }),
    ))
}

pub async fn list_own(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<Vec<EnrollmentDto>>> {
    let mut enrollments = Vec::new();

    for kind in SubjectKind::ALL {
        let rows = state
            .service_context
            .enrollment_repo
            .list_by_user(kind, user.member.id)
            .await?;
        enrollments.extend(
            rows.into_iter()
                .map(|e| EnrollmentDto::from_enrollment(kind, e)),
        );
    }

    enrollments.sort_by(|a, b| b.enrolled_at.cmp(&a.enrolled_at));

    Ok(Json(enrollments))
}

#[derive(Debug, Serialize)]
pub struct AccessDto {
    pub has_access: bool,
}

pub async fn subject_access(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path((kind, subject_id)): Path<(String, Uuid)>,
) -> Result<Json<AccessDto>> {
    let kind = parse_kind(&kind)?;

    let has_access = state
        .service_context
        .access_service
        .subject_access(kind, user.member.id, subject_id)
        .await?;

    Ok(Json(AccessDto { has_access }))
}

pub async fn lesson_access(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(lesson_id): Path<Uuid>,
) -> Result<Json<AccessDto>> {
    let has_access = state
        .service_context
        .access_service
        .lesson_access(user.member.id, lesson_id)
        .await?;

    Ok(Json(AccessDto { has_access }))
}
