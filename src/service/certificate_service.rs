use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    domain::{generate_certificate_code, Certificate, PaymentStatus, SubjectKind},
    error::{AppError, Result},
    repository::{CertificateRepository, EnrollmentRepository, ProfileRepository, SubjectRepository},
};

pub struct CertificateService {
    certificates: Arc<dyn CertificateRepository>,
    enrollments: Arc<dyn EnrollmentRepository>,
    profiles: Arc<dyn ProfileRepository>,
    subjects: Arc<dyn SubjectRepository>,
}

impl CertificateService {
    pub fn new(
        certificates: Arc<dyn CertificateRepository>,
        enrollments: Arc<dyn EnrollmentRepository>,
        profiles: Arc<dyn ProfileRepository>,
        subjects: Arc<dyn SubjectRepository>,
    ) -> Self {
        Self {
            certificates,
            enrollments,
            profiles,
            subjects,
        }
    }

    /// Issue a certificate for a confirmed enrollment. One per
    /// enrollment; the store's unique index backs the pre-check.
    pub async fn issue(&self, kind: SubjectKind, enrollment_id: Uuid) -> Result<Certificate> {
        let enrollment = self
            .enrollments
            .find_by_id(kind, enrollment_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Enrollment not found".to_string()))?;

        if enrollment.status != PaymentStatus::Paid {
            return Err(AppError::Conflict(
                "Certificates can only be issued for confirmed enrollments".to_string(),
            ));
        }

        if self
            .certificates
            .find_by_enrollment(kind, enrollment_id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(
                "Certificate already issued for this enrollment".to_string(),
            ));
        }

        let holder_name = self
            .profiles
            .find_by_user(enrollment.user_id)
            .await?
            .map(|p| p.full_name)
            .ok_or_else(|| AppError::NotFound("Member profile not found".to_string()))?;

        let subject_title = self
            .subjects
            .find_title(kind, enrollment.subject_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Subject not found".to_string()))?;

        let certificate = Certificate {
            id: Uuid::new_v4(),
            code: generate_certificate_code(),
            kind,
            enrollment_id,
            holder_name,
            subject_title,
            issued_at: Utc::now(),
        };

        let created = self.certificates.create(certificate).await?;

        tracing::info!(code = %created.code, kind = kind.as_path(), "certificate issued");

        Ok(created)
    }

    pub async fn verify(&self, code: &str) -> Result<Option<Certificate>> {
        self.certificates.find_by_code(code).await
    }
}
