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
    domain::{Event, ExternalParticipant, NewEvent, RegisterParticipantRequest},
    error::{AppError, Result},
    repository::EventRepository,
};

#[derive(Debug, Serialize)]
pub struct EventDto {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub starts_at: String,
    pub location: Option<String>,
    pub capacity: Option<i64>,
    pub registered: i64,
}

pub async fn list_upcoming(State(state): State<AppState>) -> Result<Json<Vec<EventDto>>> {
    let events = state.service_context.event_repo.list_upcoming().await?;

    let mut dtos = Vec::with_capacity(events.len());
    for event in events {
        let registered = state
            .service_context
            .event_repo
            .count_participants(event.id)
            .await?;
        dtos.push(EventDto {
            id: event.id,
            title: event.title,
            description: event.description,
            starts_at: event.starts_at.to_rfc3339(),
            location: event.location,
            capacity: event.capacity,
            registered,
        });
    }

    Ok(Json(dtos))
}

/// Open to non-members: a name, email and phone are captured, nothing
/// more. Events carry no payment state.
pub async fn register(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Json(request): Json<RegisterParticipantRequest>,
) -> Result<(StatusCode, Json<ExternalParticipant>)> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let event = state
        .service_context
        .event_repo
        .find_by_id(event_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

    if let Some(capacity) = event.capacity {
        let registered = state
            .service_context
            .event_repo
            .count_participants(event_id)
            .await?;
        if registered >= capacity {
            return Err(AppError::Conflict("Event is full".to_string()));
        }
    }

    let participant = state
        .service_context
        .event_repo
        .register_external(event_id, request)
        .await?;

    Ok((StatusCode::CREATED, Json(participant)))
}

pub async fn create(
    State(state): State<AppState>,
    Json(new): Json<NewEvent>,
) -> Result<(StatusCode, Json<Event>)> {
    new.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let event = state.service_context.event_repo.create(new).await?;

    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn list_participants(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<Vec<ExternalParticipant>>> {
    state
        .service_context
        .event_repo
        .find_by_id(event_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

    let participants = state
        .service_context
        .event_repo
        .list_participants(event_id)
        .await?;

    Ok(Json(participants))
}
