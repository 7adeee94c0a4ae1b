use axum::{
    extract::{Extension, State},
    Json,
};
use chrono::NaiveDate;
use serde::Serialize;
use validator::Validate;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::{Profile, ProfileUpsert},
    error::{AppError, Result},
    repository::ProfileRepository,
};

#[derive(Debug, Serialize)]
pub struct ProfileDto {
    pub full_name: String,
    pub phone: String,
    pub id_number: String,
    pub birth_date: NaiveDate,
    pub address: String,
    pub province: String,
    pub complete: bool,
}

impl From<Profile> for ProfileDto {
    fn from(profile: Profile) -> Self {
        let complete = profile.is_complete();
        Self {
            full_name: profile.full_name,
            phone: profile.phone,
            id_number: profile.id_number,
            birth_date: profile.birth_date,
            address: profile.address,
            province: profile.province,
            complete,
        }
    }
}

pub async fn get_own(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<Option<ProfileDto>>> {
    let profile = state
        .service_context
        .profile_repo
        .find_by_user(user.member.id)
        .await?;

    Ok(Json(profile.map(Into::into)))
}

pub async fn update_own(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(request): Json<ProfileUpsert>,
) -> Result<Json<ProfileDto>> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let profile = state
        .service_context
        .profile_repo
        .upsert(user.member.id, request)
        .await?;

    Ok(Json(profile.into()))
}
