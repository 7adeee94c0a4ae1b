use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    api::{handlers::parse_kind, state::AppState},
    domain::Certificate,
    error::{AppError, Result},
};

#[derive(Debug, Serialize)]
pub struct CertificateDto {
    pub code: String,
    pub holder_name: String,
    pub subject_title: String,
    pub issued_at: String,
}

impl From<Certificate> for CertificateDto {
    fn from(certificate: Certificate) -> Self {
        Self {
            code: certificate.code,
            holder_name: certificate.holder_name,
            subject_title: certificate.subject_title,
            issued_at: certificate.issued_at.to_rfc3339(),
        }
    }
}

/// Public lookup: anyone holding a code can verify it.
pub async fn verify(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<CertificateDto>> {
    let certificate = state
        .service_context
        .certificate_service
        .verify(&code)
        .await?
        .ok_or_else(|| AppError::NotFound("Certificate not found".to_string()))?;

    Ok(Json(certificate.into()))
}

pub async fn issue(
    State(state): State<AppState>,
    Path((kind, enrollment_id)): Path<(String, Uuid)>,
) -> Result<(StatusCode, Json<CertificateDto>)> {
    let kind = parse_kind(&kind)?;

    let certificate = state
        .service_context
        .certificate_service
        .issue(kind, enrollment_id)
        .await?;

    Ok((StatusCode::CREATED, Json(certificate.into())))
}
