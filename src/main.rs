use std::sync::Arc;

use sqlx::sqlite::SqlitePoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use matricula::{
    api,
    auth::AuthService,
    config::Settings,
    repository::{
        SqliteCertificateRepository, SqliteEnrollmentRepository, SqliteEventRepository,
        SqliteMemberRepository, SqliteProfileRepository, SqliteSubjectRepository,
    },
    service::ServiceContext,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "matricula=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let settings = Settings::new().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config: {}. Using defaults.", e);
        Settings::default()
    });

    tracing::info!(
        "Starting matricula server on {}:{}",
        settings.server.host,
        settings.server.port
    );

    // Initialize database
    let db_pool = SqlitePoolOptions::new()
        .max_connections(settings.database.max_connections)
        .connect(&settings.database.url)
        .await?;

    // Run migrations
    sqlx::migrate!("./migrations").run(&db_pool).await?;

    // Initialize auth service
    let auth_service = Arc::new(AuthService::new(db_pool.clone()));

    // Initialize repositories
    let member_repo = Arc::new(SqliteMemberRepository::new(db_pool.clone()));
    let profile_repo = Arc::new(SqliteProfileRepository::new(db_pool.clone()));
    let subject_repo = Arc::new(SqliteSubjectRepository::new(db_pool.clone()));
    let enrollment_repo = Arc::new(SqliteEnrollmentRepository::new(db_pool.clone()));
    let event_repo = Arc::new(SqliteEventRepository::new(db_pool.clone()));
    let certificate_repo = Arc::new(SqliteCertificateRepository::new(db_pool.clone()));

    // Create service context
    let service_context = Arc::new(ServiceContext::new(
        member_repo,
        profile_repo,
        subject_repo,
        enrollment_repo,
        event_repo,
        certificate_repo,
        auth_service,
        settings.payment.clone(),
        db_pool.clone(),
    ));

    let app = api::create_app(service_context, Arc::new(settings.clone()));

    let listener = tokio::net::TcpListener::bind(format!(
        "{}:{}",
        settings.server.host, settings.server.port
    ))
    .await?;

    tracing::info!(
        "Server listening on http://{}:{}",
        settings.server.host,
        settings.server.port
    );

    axum::serve(listener, app).await?;

    Ok(())
}
