use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    api::state::AppState,
    domain::{
        ClassGroup, Course, Lesson, Mentorship, NewClassGroup, NewCourse, NewLesson,
        NewMentorship, PaymentStatus, SubjectKind,
    },
    error::{AppError, Result},
    repository::{EnrollmentRepository, SubjectRepository},
};

#[derive(Debug, Serialize)]
pub struct ClassGroupDto {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price_kwanzas: i64,
    pub capacity: i64,
    pub occupancy: i64,
    pub starts_at: String,
}

/// Class-group listings show occupancy next to capacity; the count is a
/// live query over confirmed enrollments.
pub async fn list_class_groups(
    State(state): State<AppState>,
) -> Result<Json<Vec<ClassGroupDto>>> {
    let groups = state.service_context.subject_repo.list_class_groups().await?;

    let mut dtos = Vec::with_capacity(groups.len());
    for group in groups {
        let occupancy = state
            .service_context
            .enrollment_repo
            .count_by_status(SubjectKind::ClassGroup, group.id, PaymentStatus::Paid)
            .await?;
        dtos.push(ClassGroupDto {
            id: group.id,
            name: group.name,
            description: group.description,
            price_kwanzas: group.price_kwanzas,
            capacity: group.capacity,
            occupancy,
            starts_at: group.starts_at.to_rfc3339(),
        });
    }

    Ok(Json(dtos))
}

pub async fn list_courses(State(state): State<AppState>) -> Result<Json<Vec<Course>>> {
    let courses = state
        .service_context
        .subject_repo
        .list_published_courses()
        .await?;

    Ok(Json(courses))
}

pub async fn list_lessons(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> Result<Json<Vec<Lesson>>> {
    state
        .service_context
        .subject_repo
        .find_course(course_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Course not found".to_string()))?;

    let lessons = state
        .service_context
        .subject_repo
        .list_lessons(course_id)
        .await?;

    Ok(Json(lessons))
}

pub async fn list_mentorships(State(state): State<AppState>) -> Result<Json<Vec<Mentorship>>> {
    let mentorships = state.service_context.subject_repo.list_mentorships().await?;

    Ok(Json(mentorships))
}

pub async fn create_class_group(
    State(state): State<AppState>,
    Json(new): Json<NewClassGroup>,
) -> Result<(StatusCode, Json<ClassGroup>)> {
    new.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let group = state
        .service_context
        .subject_repo
        .create_class_group(new)
        .await?;

    Ok((StatusCode::CREATED, Json(group)))
}

pub async fn create_course(
    State(state): State<AppState>,
    Json(new): Json<NewCourse>,
) -> Result<(StatusCode, Json<Course>)> {
    new.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let course = state.service_context.subject_repo.create_course(new).await?;

    Ok((StatusCode::CREATED, Json(course)))
}

pub async fn add_lesson(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
    Json(new): Json<NewLesson>,
) -> Result<(StatusCode, Json<Lesson>)> {
    new.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    state
        .service_context
        .subject_repo
        .find_course(course_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Course not found".to_string()))?;

    let lesson = state
        .service_context
        .subject_repo
        .add_lesson(course_id, new)
        .await?;

    Ok((StatusCode::CREATED, Json(lesson)))
}

pub async fn create_mentorship(
    State(state): State<AppState>,
    Json(new): Json<NewMentorship>,
) -> Result<(StatusCode, Json<Mentorship>)> {
    new.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let mentorship = state
        .service_context
        .subject_repo
        .create_mentorship(new)
        .await?;

    Ok((StatusCode::CREATED, Json(mentorship)))
}
