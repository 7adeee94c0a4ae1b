pub mod access_service;
pub mod certificate_service;
pub mod enrollment_service;
pub mod stats_service;

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::AuthService;
use crate::config::PaymentConfig;
use crate::repository::*;

pub use access_service::AccessService;
pub use certificate_service::CertificateService;
pub use enrollment_service::{
    EnrollmentReceipt, EnrollmentService, EnrollmentSubmission, PendingEnrollment,
};
pub use stats_service::{KindStats, RevenueSummary, StatsService};

pub struct ServiceContext {
    pub member_repo: Arc<dyn MemberRepository>,
    pub profile_repo: Arc<dyn ProfileRepository>,
    pub subject_repo: Arc<dyn SubjectRepository>,
    pub enrollment_repo: Arc<dyn EnrollmentRepository>,
    pub event_repo: Arc<dyn EventRepository>,
    pub certificate_repo: Arc<dyn CertificateRepository>,
    pub auth_service: Arc<AuthService>,
    pub enrollment_service: Arc<EnrollmentService>,
    pub access_service: Arc<AccessService>,
    pub stats_service: Arc<StatsService>,
    pub certificate_service: Arc<CertificateService>,
    pub db_pool: SqlitePool,
}

impl ServiceContext {
    pub fn new(
        member_repo: Arc<dyn MemberRepository>,
        profile_repo: Arc<dyn ProfileRepository>,
        subject_repo: Arc<dyn SubjectRepository>,
        enrollment_repo: Arc<dyn EnrollmentRepository>,
        event_repo: Arc<dyn EventRepository>,
        certificate_repo: Arc<dyn CertificateRepository>,
        auth_service: Arc<AuthService>,
        payment: PaymentConfig,
        db_pool: SqlitePool,
    ) -> Self {
        let enrollment_service = Arc::new(EnrollmentService::new(
            enrollment_repo.clone(),
            profile_repo.clone(),
            payment.method,
            payment.instructions,
        ));
        let access_service = Arc::new(AccessService::new(
            enrollment_repo.clone(),
            subject_repo.clone(),
        ));
        let stats_service = Arc::new(StatsService::new(enrollment_repo.clone()));
        let certificate_service = Arc::new(CertificateService::new(
            certificate_repo.clone(),
            enrollment_repo.clone(),
            profile_repo.clone(),
            subject_repo.clone(),
        ));

        Self {
            member_repo,
            profile_repo,
            subject_repo,
            enrollment_repo,
            event_repo,
            certificate_repo,
            auth_service,
            enrollment_service,
            access_service,
            stats_service,
            certificate_service,
            db_pool,
        }
    }
}
