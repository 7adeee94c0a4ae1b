pub mod handlers;
pub mod middleware;
pub mod state;

use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::{config::Settings, service::ServiceContext};
use state::AppState;

pub fn create_app(service_context: Arc<ServiceContext>, settings: Arc<Settings>) -> Router {
    let app_state = AppState::new(service_context, settings);

    Router::new()
        // Root and health endpoints
        .route("/", get(handlers::root::root))
        .route("/health", get(handlers::root::health_check))
        // Auth routes
        .route("/auth/signup", post(handlers::auth::signup))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/logout", post(handlers::auth::logout))
        // Member-facing routes (session required)
        .nest("/api", member_routes(app_state.clone()))
        // Public routes: catalog, events, certificate verification
        .nest("/public", public_routes())
        // Admin back-office
        .nest("/admin", admin_routes(app_state.clone()))
        .with_state(app_state)
        // Middleware
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive()) // Configure properly for production
        .layer(TraceLayer::new_for_http())
}

fn member_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/profile", get(handlers::profile::get_own))
        .route("/profile", put(handlers::profile::update_own))
        .route("/enrollments", get(handlers::enrollments::list_own))
        .route("/enrollments/:kind", post(handlers::enrollments::enroll))
        .route(
            "/access/:kind/:subject_id",
            get(handlers::enrollments::subject_access),
        )
        .route(
            "/lessons/:id/access",
            get(handlers::enrollments::lesson_access),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::require_auth,
        ))
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/catalog/classes", get(handlers::subjects::list_class_groups))
        .route("/catalog/courses", get(handlers::subjects::list_courses))
        .route(
            "/catalog/courses/:id/lessons",
            get(handlers::subjects::list_lessons),
        )
        .route(
            "/catalog/mentorships",
            get(handlers::subjects::list_mentorships),
        )
        .route("/events", get(handlers::events::list_upcoming))
        .route("/events/:id/register", post(handlers::events::register))
        .route("/certificates/:code", get(handlers::certificates::verify))
}

fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Reconciliation across the three enrollment collections
        .route(
            "/enrollments/pending",
            get(handlers::admin::pending_enrollments),
        )
        .route(
            "/enrollments/:kind/:id/confirm",
            post(handlers::admin::confirm_enrollment),
        )
        .route(
            "/enrollments/:kind/:id/cancel",
            post(handlers::admin::cancel_enrollment),
        )
        .route(
            "/enrollments/:kind/:id/certificate",
            post(handlers::certificates::issue),
        )
        .route("/stats", get(handlers::admin::stats))
        // Catalog management
        .route("/classes", post(handlers::subjects::create_class_group))
        .route("/courses", post(handlers::subjects::create_course))
        .route("/courses/:id/lessons", post(handlers::subjects::add_lesson))
        .route("/mentorships", post(handlers::subjects::create_mentorship))
        .route(
            "/subjects/:kind/:id/price",
            put(handlers::admin::update_price),
        )
        // Events management
        .route("/events", post(handlers::events::create))
        .route(
            "/events/:id/participants",
            get(handlers::events::list_participants),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::require_admin,
        ))
}
