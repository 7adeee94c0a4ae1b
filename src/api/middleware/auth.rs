use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;

use crate::{
    api::state::AppState,
    domain::{Member, Role},
    error::AppError,
    repository::MemberRepository,
};

#[derive(Clone)]
pub struct CurrentUser {
    pub member: Member,
}

async fn resolve_member(state: &AppState, jar: &CookieJar) -> Result<Member, AppError> {
    let session_cookie = jar.get("session").ok_or(AppError::Unauthorized)?;

    let session = state
        .service_context
        .auth_service
        .validate_session(session_cookie.value())
        .await?
        .ok_or(AppError::Unauthorized)?;

    state
        .service_context
        .member_repo
        .find_by_id(session.member_id)
        .await?
        .ok_or(AppError::Unauthorized)
}

pub async fn require_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let member = resolve_member(&state, &jar).await?;

    request.extensions_mut().insert(CurrentUser { member });

    Ok(next.run(request).await)
}

/// Only the admin role may transition payment status or touch the
/// back-office surface.
pub async fn require_admin(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let member = resolve_member(&state, &jar).await?;

    if member.role != Role::Admin {
        return Err(AppError::Forbidden);
    }

    request.extensions_mut().insert(CurrentUser { member });

    Ok(next.run(request).await)
}
