use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::*;
use crate::error::{AppError, Result};

pub mod certificate_repository;
pub mod enrollment_repository;
pub mod event_repository;
pub mod member_repository;
pub mod profile_repository;
pub mod subject_repository;

pub use certificate_repository::SqliteCertificateRepository;
pub use enrollment_repository::SqliteEnrollmentRepository;
pub use event_repository::SqliteEventRepository;
pub use member_repository::SqliteMemberRepository;
pub use profile_repository::SqliteProfileRepository;
pub use subject_repository::SqliteSubjectRepository;

/// Map a failed insert to a conflict when the store reports a unique
/// violation, keyed on the error kind rather than message text.
pub(crate) fn conflict_on_unique(err: sqlx::Error, message: &str) -> AppError {
    match &err {
        sqlx::Error::Database(db)
            if matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation) =>
        {
            AppError::Conflict(message.to_string())
        }
        _ => AppError::Database(err.to_string()),
    }
}

#[async_trait]
pub trait MemberRepository: Send + Sync {
    async fn create(&self, request: CreateMemberRequest, role: Role) -> Result<Member>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Member>>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Member>>;
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Member>>;
}

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Idempotent upsert keyed by user_id; enrollment re-submits the whole
    /// profile every time.
    async fn upsert(&self, user_id: Uuid, profile: ProfileUpsert) -> Result<Profile>;
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<Profile>>;
}

#[async_trait]
pub trait SubjectRepository: Send + Sync {
    async fn create_class_group(&self, new: NewClassGroup) -> Result<ClassGroup>;
    async fn list_class_groups(&self) -> Result<Vec<ClassGroup>>;
    async fn find_class_group(&self, id: Uuid) -> Result<Option<ClassGroup>>;

    async fn create_course(&self, new: NewCourse) -> Result<Course>;
    async fn list_published_courses(&self) -> Result<Vec<Course>>;
    async fn find_course(&self, id: Uuid) -> Result<Option<Course>>;
    async fn add_lesson(&self, course_id: Uuid, new: NewLesson) -> Result<Lesson>;
    async fn list_lessons(&self, course_id: Uuid) -> Result<Vec<Lesson>>;
    async fn find_lesson(&self, id: Uuid) -> Result<Option<Lesson>>;

    async fn create_mentorship(&self, new: NewMentorship) -> Result<Mentorship>;
    async fn list_mentorships(&self) -> Result<Vec<Mentorship>>;
    async fn find_mentorship(&self, id: Uuid) -> Result<Option<Mentorship>>;

    async fn find_title(&self, kind: SubjectKind, id: Uuid) -> Result<Option<String>>;
    async fn update_price(&self, kind: SubjectKind, id: Uuid, price_kwanzas: i64) -> Result<()>;
}

#[async_trait]
pub trait EnrollmentRepository: Send + Sync {
    /// Insert a pending enrollment. The subject's current price is re-read
    /// inside the same transaction and becomes the snapshot; the caller
    /// never supplies an amount. A (user, subject) duplicate surfaces as a
    /// conflict.
    async fn create_pending(&self, kind: SubjectKind, new: NewEnrollment) -> Result<Enrollment>;
    async fn find_by_id(&self, kind: SubjectKind, id: Uuid) -> Result<Option<Enrollment>>;
    async fn find_by_user_and_subject(
        &self,
        kind: SubjectKind,
        user_id: Uuid,
        subject_id: Uuid,
    ) -> Result<Option<Enrollment>>;
    async fn list_by_user(&self, kind: SubjectKind, user_id: Uuid) -> Result<Vec<Enrollment>>;
    async fn list_by_status(
        &self,
        kind: SubjectKind,
        status: PaymentStatus,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Enrollment>>;
    /// Pending -> Paid, guarded by the version the admin observed.
    async fn confirm(&self, kind: SubjectKind, id: Uuid, expected_version: i64)
        -> Result<Enrollment>;
    /// Pending -> Cancelled, same guard. Terminal; there is no un-cancel.
    async fn cancel(&self, kind: SubjectKind, id: Uuid, expected_version: i64)
        -> Result<Enrollment>;
    async fn count_by_status(
        &self,
        kind: SubjectKind,
        subject_id: Uuid,
        status: PaymentStatus,
    ) -> Result<i64>;
    async fn count_all_by_status(&self, kind: SubjectKind, status: PaymentStatus) -> Result<i64>;
    async fn revenue_confirmed(&self, kind: SubjectKind) -> Result<i64>;
}

#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn create(&self, new: NewEvent) -> Result<Event>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Event>>;
    async fn list_upcoming(&self) -> Result<Vec<Event>>;
    async fn register_external(
        &self,
        event_id: Uuid,
        request: RegisterParticipantRequest,
    ) -> Result<ExternalParticipant>;
    async fn list_participants(&self, event_id: Uuid) -> Result<Vec<ExternalParticipant>>;
    async fn count_participants(&self, event_id: Uuid) -> Result<i64>;
}

#[async_trait]
pub trait CertificateRepository: Send + Sync {
    async fn create(&self, certificate: Certificate) -> Result<Certificate>;
    async fn find_by_code(&self, code: &str) -> Result<Option<Certificate>>;
    async fn find_by_enrollment(
        &self,
        kind: SubjectKind,
        enrollment_id: Uuid,
    ) -> Result<Option<Certificate>>;
}
