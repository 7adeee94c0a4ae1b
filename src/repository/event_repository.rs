use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{Event, ExternalParticipant, NewEvent, RegisterParticipantRequest},
    error::{AppError, Result},
    repository::{conflict_on_unique, EventRepository},
};

#[derive(FromRow)]
struct EventRow {
    id: String,
    title: String,
    description: String,
    starts_at: NaiveDateTime,
    location: Option<String>,
    capacity: Option<i64>,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

#[derive(FromRow)]
struct ParticipantRow {
    id: String,
    event_id: String,
    full_name: String,
    email: String,
    phone: String,
    registered_at: NaiveDateTime,
}

pub struct SqliteEventRepository {
    pool: SqlitePool,
}

impl SqliteEventRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_event(row: EventRow) -> Result<Event> {
        Ok(Event {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            title: row.title,
            description: row.description,
            starts_at: DateTime::from_naive_utc_and_offset(row.starts_at, Utc),
            location: row.location,
            capacity: row.capacity,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }

    fn row_to_participant(row: ParticipantRow) -> Result<ExternalParticipant> {
        Ok(ExternalParticipant {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            event_id: Uuid::parse_str(&row.event_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            full_name: row.full_name,
            email: row.email,
            phone: row.phone,
            registered_at: DateTime::from_naive_utc_and_offset(row.registered_at, Utc),
        })
    }
}

#[async_trait]
impl EventRepository for SqliteEventRepository {
    async fn create(&self, new: NewEvent) -> Result<Event> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO events (id, title, description, starts_at, location, capacity, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id_str)
        .bind(&new.title)
        .bind(&new.description)
        .bind(new.starts_at.naive_utc())
        .bind(&new.location)
        .bind(new.capacity)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve created event".to_string()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Event>> {
        let id_str = id.to_string();
        let row = sqlx::query_as::<_, EventRow>(
            r#"
            SELECT id, title, description, starts_at, location, capacity, created_at, updated_at
            FROM events
            WHERE id = ?
            "#,
        )
        .bind(id_str)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_event(r)?)),
            None => Ok(None),
        }
    }

    async fn list_upcoming(&self) -> Result<Vec<Event>> {
        let now = Utc::now().naive_utc();
        let rows = sqlx::query_as::<_, EventRow>(
            r#"
            SELECT id, title, description, starts_at, location, capacity, created_at, updated_at
            FROM events
            WHERE starts_at > ?
            ORDER BY starts_at ASC
            "#,
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_event).collect()
    }

    async fn register_external(
        &self,
        event_id: Uuid,
        request: RegisterParticipantRequest,
    ) -> Result<ExternalParticipant> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let event_id_str = event_id.to_string();
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO external_participants (id, event_id, full_name, email, phone, registered_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id_str)
        .bind(&event_id_str)
        .bind(&request.full_name)
        .bind(&request.email)
        .bind(&request.phone)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "Already registered for this event"))?;

        let row = sqlx::query_as::<_, ParticipantRow>(
            r#"
            SELECT id, event_id, full_name, email, phone, registered_at
            FROM external_participants
            WHERE id = ?
            "#,
        )
        .bind(&id_str)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Self::row_to_participant(row)
    }

    async fn list_participants(&self, event_id: Uuid) -> Result<Vec<ExternalParticipant>> {
        let event_id_str = event_id.to_string();
        let rows = sqlx::query_as::<_, ParticipantRow>(
            r#"
            SELECT id, event_id, full_name, email, phone, registered_at
            FROM external_participants
            WHERE event_id = ?
            ORDER BY registered_at ASC
            "#,
        )
        .bind(event_id_str)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_participant).collect()
    }

    async fn count_participants(&self, event_id: Uuid) -> Result<i64> {
        let event_id_str = event_id.to_string();
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM external_participants WHERE event_id = ?",
        )
        .bind(event_id_str)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(count)
    }
}
