use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub starts_at: DateTime<Utc>,
    pub location: Option<String>,
    pub capacity: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Event registration by a non-member. Parallel to an enrollment but
/// profile-less and with no payment state; events are free to attend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalParticipant {
    pub id: Uuid,
    pub event_id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub registered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewEvent {
    #[validate(length(min = 1))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub starts_at: DateTime<Utc>,
    pub location: Option<String>,
    pub capacity: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterParticipantRequest {
    #[validate(length(min = 1))]
    pub full_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub phone: String,
}
