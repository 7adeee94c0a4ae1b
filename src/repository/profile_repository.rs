use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{Profile, ProfileUpsert},
    error::{AppError, Result},
    repository::ProfileRepository,
};

#[derive(FromRow)]
struct ProfileRow {
    user_id: String,
    full_name: String,
    phone: String,
    id_number: String,
    birth_date: NaiveDate,
    address: String,
    province: String,
    updated_at: NaiveDateTime,
}

pub struct SqliteProfileRepository {
    pool: SqlitePool,
}

impl SqliteProfileRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_profile(row: ProfileRow) -> Result<Profile> {
        Ok(Profile {
            user_id: Uuid::parse_str(&row.user_id).map_err(|e| AppError::Database(e.to_string()))?,
            full_name: row.full_name,
            phone: row.phone,
            id_number: row.id_number,
            birth_date: row.birth_date,
            address: row.address,
            province: row.province,
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }
}

#[async_trait]
impl ProfileRepository for SqliteProfileRepository {
    async fn upsert(&self, user_id: Uuid, profile: ProfileUpsert) -> Result<Profile> {
        let user_id_str = user_id.to_string();
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO profiles (user_id, full_name, phone, id_number, birth_date, address, province, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (user_id)
            DO UPDATE SET full_name = excluded.full_name,
                          phone = excluded.phone,
                          id_number = excluded.id_number,
                          birth_date = excluded.birth_date,
                          address = excluded.address,
                          province = excluded.province,
                          updated_at = excluded.updated_at
            "#,
        )
        .bind(&user_id_str)
        .bind(&profile.full_name)
        .bind(&profile.phone)
        .bind(&profile.id_number)
        .bind(profile.birth_date)
        .bind(&profile.address)
        .bind(&profile.province)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_user(user_id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve upserted profile".to_string()))
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<Profile>> {
        let user_id_str = user_id.to_string();
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT user_id, full_name, phone, id_number, birth_date, address, province, updated_at
            FROM profiles
            WHERE user_id = ?
            "#,
        )
        .bind(user_id_str)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_profile(r)?)),
            None => Ok(None),
        }
    }
}
