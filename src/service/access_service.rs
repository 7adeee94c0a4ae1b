use std::sync::Arc;

use uuid::Uuid;

use crate::{
    domain::{has_access, SubjectKind},
    error::{AppError, Result},
    repository::{EnrollmentRepository, SubjectRepository},
};

/// Answers "may this member view paid content?". Each check re-queries
/// the enrollment row; nothing is cached, so staleness is bounded by
/// query latency.
pub struct AccessService {
    enrollments: Arc<dyn EnrollmentRepository>,
    subjects: Arc<dyn SubjectRepository>,
}

impl AccessService {
    pub fn new(
        enrollments: Arc<dyn EnrollmentRepository>,
        subjects: Arc<dyn SubjectRepository>,
    ) -> Self {
        Self {
            enrollments,
            subjects,
        }
    }

    pub async fn subject_access(
        &self,
        kind: SubjectKind,
        user_id: Uuid,
        subject_id: Uuid,
    ) -> Result<bool> {
        let enrollment = self
            .enrollments
            .find_by_user_and_subject(kind, user_id, subject_id)
            .await?;

        Ok(has_access(enrollment.as_ref()))
    }

    /// Free-preview lessons are open to everyone; the rest require a
    /// confirmed course enrollment.
    pub async fn lesson_access(&self, user_id: Uuid, lesson_id: Uuid) -> Result<bool> {
        let lesson = self
            .subjects
            .find_lesson(lesson_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Lesson not found".to_string()))?;

        if lesson.free_preview {
            return Ok(true);
        }

        self.subject_access(SubjectKind::Course, user_id, lesson.course_id)
            .await
    }
}
