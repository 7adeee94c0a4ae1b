use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    api::state::AppState,
    auth,
    domain::{CreateMemberRequest, Role},
    error::{AppError, Result},
    repository::MemberRepository,
};

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub member_id: Uuid,
    pub message: String,
}

pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<CreateMemberRequest>,
) -> Result<(StatusCode, Json<SignupResponse>)> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let member = state
        .service_context
        .member_repo
        .create(request, Role::Member)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            member_id: member.id,
            message: "Registration successful".to_string(),
        }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>)> {
    // Get password hash from database
    let password_hash = auth::get_password_hash(&state.service_context.db_pool, &req.email)
        .await?
        .ok_or(AppError::Unauthorized)?;

    // Verify password
    if !auth::AuthService::verify_password(&req.password, &password_hash).await? {
        return Err(AppError::Unauthorized);
    }

    let member = state
        .service_context
        .member_repo
        .find_by_email(&req.email)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let (_session, token) = state
        .service_context
        .auth_service
        .create_session(member.id, state.settings.auth.session_duration_hours)
        .await?;

    let cookie = state
        .service_context
        .auth_service
        .create_session_cookie(&token, false);

    Ok((
        jar.add(cookie),
        Json(LoginResponse {
            message: "Login successful".to_string(),
        }),
    ))
}

pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, StatusCode)> {
    if let Some(session_cookie) = jar.get("session") {
        // Invalidate session in database
        let _ = state
            .service_context
            .auth_service
            .invalidate_session(session_cookie.value())
            .await;
    }

    let jar = jar.add(auth::AuthService::create_logout_cookie());

    Ok((jar, StatusCode::NO_CONTENT))
}
