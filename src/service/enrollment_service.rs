use std::sync::Arc;

use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    domain::{Enrollment, NewEnrollment, PaymentStatus, ProfileUpsert, SubjectKind},
    error::{AppError, Result},
    payments,
    repository::{EnrollmentRepository, ProfileRepository},
};

/// What a member submits to enroll: the target subject plus the full
/// profile. Profile fields are required on every submission even when a
/// stored profile exists.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EnrollmentSubmission {
    pub subject_id: Uuid,
    #[validate(nested)]
    pub profile: ProfileUpsert,
}

/// Returned to the member right after creation: the pending enrollment
/// and the manual payment instructions carrying the reference.
#[derive(Debug, Clone)]
pub struct EnrollmentReceipt {
    pub enrollment: Enrollment,
    pub instructions: String,
}

/// A pending row tagged with the collection it came from, for the
/// polymorphic admin reconciliation view.
#[derive(Debug, Clone)]
pub struct PendingEnrollment {
    pub kind: SubjectKind,
    pub enrollment: Enrollment,
}

pub struct EnrollmentService {
    enrollments: Arc<dyn EnrollmentRepository>,
    profiles: Arc<dyn ProfileRepository>,
    payment_method: String,
    payment_instructions: String,
}

impl EnrollmentService {
    pub fn new(
        enrollments: Arc<dyn EnrollmentRepository>,
        profiles: Arc<dyn ProfileRepository>,
        payment_method: String,
        payment_instructions: String,
    ) -> Self {
        Self {
            enrollments,
            profiles,
            payment_method,
            payment_instructions,
        }
    }

    /// Create exactly one pending enrollment for the caller.
    ///
    /// The profile is upserted first (idempotent, keyed by user), then the
    /// enrollment row is inserted with a fresh reference; the price
    /// snapshot is read by the repository inside the insert transaction.
    /// A duplicate (user, subject) surfaces as a conflict and nothing is
    /// retried.
    pub async fn enroll(
        &self,
        kind: SubjectKind,
        user_id: Uuid,
        submission: EnrollmentSubmission,
    ) -> Result<EnrollmentReceipt> {
        submission
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        self.profiles.upsert(user_id, submission.profile).await?;

        let reference = payments::generate_reference();
        let enrollment = self
            .enrollments
            .create_pending(
                kind,
                NewEnrollment {
                    user_id,
                    subject_id: submission.subject_id,
                    payment_reference: reference,
                    payment_method: self.payment_method.clone(),
                },
            )
            .await?;

        tracing::info!(
            kind = kind.as_path(),
            enrollment_id = %enrollment.id,
            reference = %enrollment.payment_reference,
            "enrollment created"
        );

        let instructions = format!(
            "{} Referência: {}. Montante: {} AOA.",
            self.payment_instructions, enrollment.payment_reference, enrollment.amount_kwanzas
        );

        Ok(EnrollmentReceipt {
            enrollment,
            instructions,
        })
    }

    /// Admin reconciliation: Pending -> Paid at the observed version.
    pub async fn confirm(
        &self,
        kind: SubjectKind,
        id: Uuid,
        expected_version: i64,
    ) -> Result<Enrollment> {
        let enrollment = self.enrollments.confirm(kind, id, expected_version).await?;

        tracing::info!(
            kind = kind.as_path(),
            enrollment_id = %enrollment.id,
            reference = %enrollment.payment_reference,
            "payment confirmed"
        );

        Ok(enrollment)
    }

    /// Admin reconciliation: Pending -> Cancelled at the observed version.
    pub async fn cancel(
        &self,
        kind: SubjectKind,
        id: Uuid,
        expected_version: i64,
    ) -> Result<Enrollment> {
        let enrollment = self.enrollments.cancel(kind, id, expected_version).await?;

        tracing::info!(
            kind = kind.as_path(),
            enrollment_id = %enrollment.id,
            "enrollment cancelled"
        );

        Ok(enrollment)
    }

    /// All pending rows across the three collections, oldest first. Three
    /// independent reads merged client-side; not a snapshot.
    pub async fn reconciliation_queue(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PendingEnrollment>> {
        let mut queue = Vec::new();

        for kind in SubjectKind::ALL {
            let pending = self
                .enrollments
                .list_by_status(kind, PaymentStatus::Pending, limit, offset)
                .await?;
            queue.extend(
                pending
                    .into_iter()
                    .map(|enrollment| PendingEnrollment { kind, enrollment }),
            );
        }

        queue.sort_by_key(|p| p.enrollment.enrolled_at);
        Ok(queue)
    }
}
