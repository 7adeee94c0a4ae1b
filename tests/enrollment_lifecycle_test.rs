use std::sync::Arc;

use chrono::{Duration, Utc};
use sqlx::sqlite::SqlitePoolOptions;
use uuid::Uuid;

use matricula::{
    domain::{
        has_access, CreateMemberRequest, NewClassGroup, PaymentStatus, ProfileUpsert, Role,
        SubjectKind,
    },
    error::AppError,
    repository::{
        EnrollmentRepository, MemberRepository, ProfileRepository, SqliteEnrollmentRepository,
        SqliteMemberRepository, SqliteProfileRepository, SqliteSubjectRepository,
        SubjectRepository,
    },
    service::{EnrollmentService, EnrollmentSubmission},
};

struct Fixture {
    members: SqliteMemberRepository,
    subjects: SqliteSubjectRepository,
    enrollments: Arc<dyn EnrollmentRepository>,
    service: EnrollmentService,
}

async fn setup() -> anyhow::Result<Fixture> {
    // A single connection keeps the in-memory database alive and shared
    // across all queries in the test.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let enrollments: Arc<dyn EnrollmentRepository> =
        Arc::new(SqliteEnrollmentRepository::new(pool.clone()));
    let profiles: Arc<dyn ProfileRepository> = Arc::new(SqliteProfileRepository::new(pool.clone()));

    let service = EnrollmentService::new(
        enrollments.clone(),
        profiles,
        "multicaixa_express".to_string(),
        "Pague por referência no Multicaixa Express.".to_string(),
    );

    Ok(Fixture {
        members: SqliteMemberRepository::new(pool.clone()),
        subjects: SqliteSubjectRepository::new(pool.clone()),
        enrollments,
        service,
    })
}

async fn create_member(fixture: &Fixture, email: &str) -> anyhow::Result<Uuid> {
    let member = fixture
        .members
        .create(
            CreateMemberRequest {
                email: email.to_string(),
                full_name: "Joana Manuel".to_string(),
                password: "password123".to_string(),
            },
            Role::Member,
        )
        .await?;
    Ok(member.id)
}

async fn create_class_group(fixture: &Fixture, price_kwanzas: i64) -> anyhow::Result<Uuid> {
    let group = fixture
        .subjects
        .create_class_group(NewClassGroup {
            name: "Turma de Inglês B1".to_string(),
            description: String::new(),
            price_kwanzas,
            capacity: 20,
            starts_at: Utc::now() + Duration::days(14),
        })
        .await?;
    Ok(group.id)
}

fn submission(subject_id: Uuid) -> EnrollmentSubmission {
    EnrollmentSubmission {
        subject_id,
        profile: ProfileUpsert {
            full_name: "Joana Manuel".to_string(),
            phone: "+244923000000".to_string(),
            id_number: "004567890LA042".to_string(),
            birth_date: chrono::NaiveDate::from_ymd_opt(1998, 4, 12).unwrap(),
            address: "Rua Amílcar Cabral 15".to_string(),
            province: "Luanda".to_string(),
        },
    }
}

fn assert_reference_shape(reference: &str) {
    let parts: Vec<&str> = reference.split('-').collect();
    assert_eq!(parts.len(), 3, "reference was {}", reference);
    assert_eq!(parts[0], "JU10");
    assert!(!parts[1].is_empty());
    assert_eq!(parts[2].len(), 6);
    for part in &parts[1..] {
        assert!(
            part.chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()),
            "reference was {}",
            reference
        );
    }
}

#[tokio::test]
async fn fresh_enrollment_is_pending_with_price_snapshot() -> anyhow::Result<()> {
    let fixture = setup().await?;
    let user_id = create_member(&fixture, "joana@example.com").await?;
    let subject_id = create_class_group(&fixture, 100_000).await?;

    let receipt = fixture
        .service
        .enroll(SubjectKind::ClassGroup, user_id, submission(subject_id))
        .await?;

    let enrollment = &receipt.enrollment;
    assert_eq!(enrollment.status, PaymentStatus::Pending);
    assert_eq!(enrollment.amount_kwanzas, 100_000);
    assert_eq!(enrollment.payment_method, "multicaixa_express");
    assert!(enrollment.paid_at.is_none());
    assert_reference_shape(&enrollment.payment_reference);
    assert!(receipt.instructions.contains(&enrollment.payment_reference));

    Ok(())
}

#[tokio::test]
async fn duplicate_enrollment_is_a_conflict_and_leaves_one_row() -> anyhow::Result<()> {
    let fixture = setup().await?;
    let user_id = create_member(&fixture, "joana@example.com").await?;
    let subject_id = create_class_group(&fixture, 100_000).await?;

    let first = fixture
        .service
        .enroll(SubjectKind::ClassGroup, user_id, submission(subject_id))
        .await?;

    let second = fixture
        .service
        .enroll(SubjectKind::ClassGroup, user_id, submission(subject_id))
        .await;
    assert!(matches!(second, Err(AppError::Conflict(_))));

    let rows = fixture
        .enrollments
        .list_by_user(SubjectKind::ClassGroup, user_id)
        .await?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, first.enrollment.id);
    assert_eq!(
        rows[0].payment_reference,
        first.enrollment.payment_reference
    );
    assert_eq!(rows[0].status, PaymentStatus::Pending);

    Ok(())
}

#[tokio::test]
async fn confirm_stamps_paid_at_and_unlocks_access() -> anyhow::Result<()> {
    let fixture = setup().await?;
    let user_id = create_member(&fixture, "joana@example.com").await?;
    let subject_id = create_class_group(&fixture, 100_000).await?;

    let receipt = fixture
        .service
        .enroll(SubjectKind::ClassGroup, user_id, submission(subject_id))
        .await?;

    let before = fixture
        .enrollments
        .find_by_user_and_subject(SubjectKind::ClassGroup, user_id, subject_id)
        .await?;
    assert!(!has_access(before.as_ref()));

    let confirmed = fixture
        .service
        .confirm(
            SubjectKind::ClassGroup,
            receipt.enrollment.id,
            receipt.enrollment.version,
        )
        .await?;
    assert_eq!(confirmed.status, PaymentStatus::Paid);
    assert!(confirmed.paid_at.is_some());

    let after = fixture
        .enrollments
        .find_by_user_and_subject(SubjectKind::ClassGroup, user_id, subject_id)
        .await?;
    assert!(has_access(after.as_ref()));

    Ok(())
}

#[tokio::test]
async fn list_price_changes_do_not_touch_snapshots() -> anyhow::Result<()> {
    let fixture = setup().await?;
    let user_id = create_member(&fixture, "joana@example.com").await?;
    let other_id = create_member(&fixture, "paulo@example.com").await?;
    let subject_id = create_class_group(&fixture, 100_000).await?;

    let first = fixture
        .service
        .enroll(SubjectKind::ClassGroup, user_id, submission(subject_id))
        .await?;

    fixture
        .subjects
        .update_price(SubjectKind::ClassGroup, subject_id, 150_000)
        .await?;

    let unchanged = fixture
        .enrollments
        .find_by_id(SubjectKind::ClassGroup, first.enrollment.id)
        .await?
        .unwrap();
    assert_eq!(unchanged.amount_kwanzas, 100_000);

    // A later enrollment snapshots the new authoritative price.
    let second = fixture
        .service
        .enroll(SubjectKind::ClassGroup, other_id, submission(subject_id))
        .await?;
    assert_eq!(second.enrollment.amount_kwanzas, 150_000);

    Ok(())
}

#[tokio::test]
async fn cancelled_enrollments_are_terminal() -> anyhow::Result<()> {
    let fixture = setup().await?;
    let user_id = create_member(&fixture, "joana@example.com").await?;
    let subject_id = create_class_group(&fixture, 100_000).await?;

    let receipt = fixture
        .service
        .enroll(SubjectKind::ClassGroup, user_id, submission(subject_id))
        .await?;

    let cancelled = fixture
        .service
        .cancel(
            SubjectKind::ClassGroup,
            receipt.enrollment.id,
            receipt.enrollment.version,
        )
        .await?;
    assert_eq!(cancelled.status, PaymentStatus::Cancelled);

    // A confirm attempt afterwards fails and the row stays cancelled.
    let confirm = fixture
        .service
        .confirm(SubjectKind::ClassGroup, receipt.enrollment.id, cancelled.version)
        .await;
    assert!(matches!(confirm, Err(AppError::Conflict(_))));

    let row = fixture
        .enrollments
        .find_by_id(SubjectKind::ClassGroup, receipt.enrollment.id)
        .await?
        .unwrap();
    assert_eq!(row.status, PaymentStatus::Cancelled);
    assert!(row.paid_at.is_none());

    Ok(())
}

#[tokio::test]
async fn stale_version_loses_the_transition_race() -> anyhow::Result<()> {
    let fixture = setup().await?;
    let user_id = create_member(&fixture, "joana@example.com").await?;
    let subject_id = create_class_group(&fixture, 100_000).await?;

    let receipt = fixture
        .service
        .enroll(SubjectKind::ClassGroup, user_id, submission(subject_id))
        .await?;

    // Wrong token: nobody has bumped the version yet, so version+1 is stale
    // in the other direction.
    let stale = fixture
        .service
        .confirm(
            SubjectKind::ClassGroup,
            receipt.enrollment.id,
            receipt.enrollment.version + 1,
        )
        .await;
    assert!(matches!(stale, Err(AppError::Conflict(_))));

    // The observed version still wins.
    let confirmed = fixture
        .service
        .confirm(
            SubjectKind::ClassGroup,
            receipt.enrollment.id,
            receipt.enrollment.version,
        )
        .await?;
    assert_eq!(confirmed.status, PaymentStatus::Paid);

    // A second admin acting on the now-stale pending view gets an explicit
    // conflict instead of silently re-winning.
    let replay = fixture
        .service
        .confirm(
            SubjectKind::ClassGroup,
            receipt.enrollment.id,
            receipt.enrollment.version,
        )
        .await;
    assert!(matches!(replay, Err(AppError::Conflict(_))));

    Ok(())
}

#[tokio::test]
async fn reconciliation_queue_merges_all_collections() -> anyhow::Result<()> {
    let fixture = setup().await?;
    let user_id = create_member(&fixture, "joana@example.com").await?;
    let subject_id = create_class_group(&fixture, 100_000).await?;

    let course = fixture
        .subjects
        .create_course(matricula::domain::NewCourse {
            title: "Excel do Zero ao Avançado".to_string(),
            description: String::new(),
            price_kwanzas: 45_000,
            published: true,
        })
        .await?;

    fixture
        .service
        .enroll(SubjectKind::ClassGroup, user_id, submission(subject_id))
        .await?;
    fixture
        .service
        .enroll(SubjectKind::Course, user_id, submission(course.id))
        .await?;

    let queue = fixture.service.reconciliation_queue(50, 0).await?;
    assert_eq!(queue.len(), 2);
    let kinds: Vec<SubjectKind> = queue.iter().map(|p| p.kind).collect();
    assert!(kinds.contains(&SubjectKind::ClassGroup));
    assert!(kinds.contains(&SubjectKind::Course));

    // Oldest first
    assert!(queue[0].enrollment.enrolled_at <= queue[1].enrollment.enrolled_at);

    Ok(())
}
