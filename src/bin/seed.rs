use chrono::{Duration, Utc};
use clap::Parser;
use fake::faker::address::en::StreetName;
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use fake::faker::phone_number::en::PhoneNumber;
use fake::Fake;
use sqlx::sqlite::SqlitePoolOptions;

use matricula::{
    domain::{
        CreateMemberRequest, NewClassGroup, NewCourse, NewEnrollment, NewEvent, NewLesson,
        NewMentorship, ProfileUpsert, Role, SubjectKind,
    },
    payments,
    repository::{
        EnrollmentRepository, EventRepository, MemberRepository, ProfileRepository,
        SqliteEnrollmentRepository, SqliteEventRepository, SqliteMemberRepository,
        SqliteProfileRepository, SqliteSubjectRepository, SubjectRepository,
    },
};

#[derive(Parser)]
#[command(about = "Seed the matricula database with demo data")]
struct Args {
    /// Database URL (falls back to DATABASE_URL, then a local file)
    #[arg(long)]
    database_url: Option<String>,

    /// Number of demo members to create
    #[arg(long, default_value_t = 5)]
    members: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let database_url = args
        .database_url
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .unwrap_or_else(|| "sqlite:matricula.db".to_string());

    println!("Seeding {}...", database_url);

    let db_pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    println!("Running migrations...");
    sqlx::migrate!("./migrations").run(&db_pool).await?;

    let member_repo = SqliteMemberRepository::new(db_pool.clone());
    let profile_repo = SqliteProfileRepository::new(db_pool.clone());
    let subject_repo = SqliteSubjectRepository::new(db_pool.clone());
    let enrollment_repo = SqliteEnrollmentRepository::new(db_pool.clone());
    let event_repo = SqliteEventRepository::new(db_pool.clone());

    println!("Creating members...");
    let admin = member_repo
        .create(
            CreateMemberRequest {
                email: "admin@matricula.local".to_string(),
                full_name: "Admin".to_string(),
                password: "admin123!".to_string(),
            },
            Role::Admin,
        )
        .await?;
    println!("  created admin ({} / admin123!)", admin.email);

    let mut members = Vec::new();
    for i in 0..args.members {
        let member = member_repo
            .create(
                CreateMemberRequest {
                    email: format!("member{}@example.com", i + 1),
                    full_name: Name().fake(),
                    password: "password123".to_string(),
                },
                Role::Member,
            )
            .await?;

        profile_repo
            .upsert(
                member.id,
                ProfileUpsert {
                    full_name: member.full_name.clone(),
                    phone: PhoneNumber().fake(),
                    id_number: format!("00{}467890LA0{}", i, i),
                    birth_date: chrono::NaiveDate::from_ymd_opt(1995, 1, 1).unwrap(),
                    address: StreetName().fake(),
                    province: "Luanda".to_string(),
                },
            )
            .await?;

        members.push(member);
    }
    println!("  created {} members", members.len());

    println!("Creating catalog...");
    let group = subject_repo
        .create_class_group(NewClassGroup {
            name: "Turma de Inglês B1 - Manhã".to_string(),
            description: "Aulas presenciais, três vezes por semana.".to_string(),
            price_kwanzas: 100_000,
            capacity: 20,
            starts_at: Utc::now() + Duration::days(14),
        })
        .await?;

    let course = subject_repo
        .create_course(NewCourse {
            title: "Excel do Zero ao Avançado".to_string(),
            description: "Curso gravado com acesso vitalício.".to_string(),
            price_kwanzas: 45_000,
            published: true,
        })
        .await?;

    for (i, title) in ["Introdução", "Fórmulas", "Tabelas dinâmicas"].iter().enumerate() {
        subject_repo
            .add_lesson(
                course.id,
                NewLesson {
                    title: title.to_string(),
                    position: i as i64 + 1,
                    free_preview: i == 0,
                },
            )
            .await?;
    }

    let mentorship = subject_repo
        .create_mentorship(NewMentorship {
            title: "Mentoria de Carreira em TI".to_string(),
            description: "Sessões individuais quinzenais.".to_string(),
            price_kwanzas: 250_000,
            mentor_name: Name().fake(),
        })
        .await?;

    println!("Creating enrollments...");
    let targets = [
        (SubjectKind::ClassGroup, group.id),
        (SubjectKind::Course, course.id),
        (SubjectKind::Mentorship, mentorship.id),
    ];
    let mut confirmed = 0;
    for (i, member) in members.iter().enumerate() {
        let (kind, subject_id) = targets[i % targets.len()];
        let enrollment = enrollment_repo
            .create_pending(
                kind,
                NewEnrollment {
                    user_id: member.id,
                    subject_id,
                    payment_reference: payments::generate_reference(),
                    payment_method: "multicaixa_express".to_string(),
                },
            )
            .await?;

        // Confirm every other enrollment so the admin view shows both states
        if i % 2 == 0 {
            enrollment_repo
                .confirm(kind, enrollment.id, enrollment.version)
                .await?;
            confirmed += 1;
        }
    }
    println!(
        "  created {} enrollments ({} confirmed)",
        members.len(),
        confirmed
    );

    println!("Creating events...");
    let event = event_repo
        .create(NewEvent {
            title: "Workshop aberto: preparação para entrevistas".to_string(),
            description: "Evento gratuito e aberto ao público.".to_string(),
            starts_at: Utc::now() + Duration::days(7),
            location: Some("Luanda".to_string()),
            capacity: Some(100),
        })
        .await?;

    for _ in 0..3 {
        event_repo
            .register_external(
                event.id,
                matricula::domain::RegisterParticipantRequest {
                    full_name: Name().fake(),
                    email: SafeEmail().fake(),
                    phone: PhoneNumber().fake(),
                },
            )
            .await?;
    }

    println!("Done.");

    Ok(())
}
