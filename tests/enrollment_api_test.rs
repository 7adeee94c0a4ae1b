use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

use matricula::{
    api,
    auth::AuthService,
    config::Settings,
    domain::{CreateMemberRequest, Role},
    repository::{
        MemberRepository, SqliteCertificateRepository, SqliteEnrollmentRepository,
        SqliteEventRepository, SqliteMemberRepository, SqliteProfileRepository,
        SqliteSubjectRepository,
    },
    service::ServiceContext,
};

async fn build_app() -> anyhow::Result<Router> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let member_repo = Arc::new(SqliteMemberRepository::new(pool.clone()));

    // Seed an admin account; everything else goes through the API.
    member_repo
        .create(
            CreateMemberRequest {
                email: "admin@matricula.local".to_string(),
                full_name: "Admin".to_string(),
                password: "admin123!".to_string(),
            },
            Role::Admin,
        )
        .await?;

    let settings = Settings::default();
    let service_context = Arc::new(ServiceContext::new(
        member_repo,
        Arc::new(SqliteProfileRepository::new(pool.clone())),
        Arc::new(SqliteSubjectRepository::new(pool.clone())),
        Arc::new(SqliteEnrollmentRepository::new(pool.clone())),
        Arc::new(SqliteEventRepository::new(pool.clone())),
        Arc::new(SqliteCertificateRepository::new(pool.clone())),
        Arc::new(AuthService::new(pool.clone())),
        settings.payment.clone(),
        pool,
    ));

    Ok(api::create_app(service_context, Arc::new(settings)))
}

fn json_request(method: &str, uri: &str, cookie: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie.to_string());
    }
    builder
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie.to_string());
    }
    builder.body(Body::empty()).unwrap()
}

async fn response_json(response: axum::response::Response) -> anyhow::Result<Value> {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Log in and return the session cookie pair ("session=<token>").
async fn login(app: &Router, email: &str, password: &str) -> anyhow::Result<String> {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/login",
            None,
            json!({ "email": email, "password": password }),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("login sets a session cookie")
        .to_str()?;
    let pair = set_cookie
        .split(';')
        .next()
        .expect("cookie has a name=value pair");

    Ok(pair.to_string())
}

fn profile_json() -> Value {
    json!({
        "full_name": "Joana Manuel",
        "phone": "+244923000000",
        "id_number": "004567890LA042",
        "birth_date": "1998-04-12",
        "address": "Rua Amílcar Cabral 15",
        "province": "Luanda"
    })
}

#[tokio::test]
async fn enrollment_flow_over_http() -> anyhow::Result<()> {
    let app = build_app().await?;

    // Member signs up and logs in
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/signup",
            None,
            json!({
                "email": "joana@example.com",
                "full_name": "Joana Manuel",
                "password": "password123"
            }),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);

    let member_cookie = login(&app, "joana@example.com", "password123").await?;
    let admin_cookie = login(&app, "admin@matricula.local", "admin123!").await?;

    // Admin publishes a class group
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/admin/classes",
            Some(&admin_cookie),
            json!({
                "name": "Turma de Inglês B1",
                "description": "Aulas presenciais",
                "price_kwanzas": 100000,
                "capacity": 20,
                "starts_at": "2026-09-01T09:00:00Z"
            }),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let group = response_json(response).await?;
    let group_id = group["id"].as_str().unwrap().to_string();

    // Member enrolls; the receipt carries the manual payment reference
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/enrollments/classes",
            Some(&member_cookie),
            json!({ "subject_id": group_id, "profile": profile_json() }),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let receipt = response_json(response).await?;
    let enrollment = &receipt["enrollment"];
    assert_eq!(enrollment["status"], "pending");
    assert_eq!(enrollment["amount_kwanzas"], 100000);
    assert!(enrollment["paid_at"].is_null());
    let reference = enrollment["payment_reference"].as_str().unwrap();
    assert!(reference.starts_with("JU10-"));
    assert!(receipt["instructions"].as_str().unwrap().contains(reference));
    let enrollment_id = enrollment["id"].as_str().unwrap().to_string();
    let version = enrollment["version"].as_i64().unwrap();

    // Second submission for the same (user, class) pair: conflict
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/enrollments/classes",
            Some(&member_cookie),
            json!({ "subject_id": group_id, "profile": profile_json() }),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // No access while pending
    let response = app
        .clone()
        .oneshot(get_request(
            &format!("/api/access/classes/{}", group_id),
            Some(&member_cookie),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let access = response_json(response).await?;
    assert_eq!(access["has_access"], false);

    // Members cannot reach the reconciliation surface
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/admin/enrollments/classes/{}/confirm", enrollment_id),
            Some(&member_cookie),
            json!({ "version": version }),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Admin confirms the payment
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/admin/enrollments/classes/{}/confirm", enrollment_id),
            Some(&admin_cookie),
            json!({ "version": version }),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let confirmed = response_json(response).await?;
    assert_eq!(confirmed["status"], "paid");
    assert!(!confirmed["paid_at"].is_null());

    // Access flips on
    let response = app
        .clone()
        .oneshot(get_request(
            &format!("/api/access/classes/{}", group_id),
            Some(&member_cookie),
        ))
        .await?;
    let access = response_json(response).await?;
    assert_eq!(access["has_access"], true);

    // Replaying the stale confirm loses explicitly
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/admin/enrollments/classes/{}/confirm", enrollment_id),
            Some(&admin_cookie),
            json!({ "version": version }),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    Ok(())
}

#[tokio::test]
async fn enrollment_requires_a_session() -> anyhow::Result<()> {
    let app = build_app().await?;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/enrollments/classes",
            None,
            json!({
                "subject_id": "00000000-0000-0000-0000-000000000000",
                "profile": profile_json()
            }),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn mentorship_confirmation_uses_the_confirmed_label() -> anyhow::Result<()> {
    let app = build_app().await?;

    let admin_cookie = login(&app, "admin@matricula.local", "admin123!").await?;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/signup",
            None,
            json!({
                "email": "paulo@example.com",
                "full_name": "Paulo Neto",
                "password": "password123"
            }),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let member_cookie = login(&app, "paulo@example.com", "password123").await?;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/admin/mentorships",
            Some(&admin_cookie),
            json!({
                "title": "Mentoria de Carreira em TI",
                "price_kwanzas": 250000,
                "mentor_name": "Esperança dos Santos"
            }),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let mentorship = response_json(response).await?;
    let mentorship_id = mentorship["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/enrollments/mentorships",
            Some(&member_cookie),
            json!({ "subject_id": mentorship_id, "profile": profile_json() }),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let receipt = response_json(response).await?;
    let enrollment_id = receipt["enrollment"]["id"].as_str().unwrap().to_string();
    let version = receipt["enrollment"]["version"].as_i64().unwrap();
    assert_eq!(receipt["enrollment"]["status"], "pending");

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/admin/enrollments/mentorships/{}/confirm", enrollment_id),
            Some(&admin_cookie),
            json!({ "version": version }),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let confirmed = response_json(response).await?;

    // Mentorships surface the historic "confirmed" label on the wire
    assert_eq!(confirmed["status"], "confirmed");

    Ok(())
}
