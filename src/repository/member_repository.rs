use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{CreateMemberRequest, Member, Role},
    error::{AppError, Result},
    repository::{conflict_on_unique, MemberRepository},
};

// Database row struct that matches the SQLite schema
#[derive(FromRow)]
struct MemberRow {
    id: String,
    email: String,
    full_name: String,
    role: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

pub struct SqliteMemberRepository {
    pool: SqlitePool,
}

impl SqliteMemberRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_member(row: MemberRow) -> Result<Member> {
        Ok(Member {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            email: row.email,
            full_name: row.full_name,
            role: Self::parse_role(&row.role)?,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }

    fn parse_role(s: &str) -> Result<Role> {
        match s {
            "member" => Ok(Role::Member),
            "admin" => Ok(Role::Admin),
            _ => Err(AppError::Database(format!("Invalid role: {}", s))),
        }
    }

    fn role_to_str(role: &Role) -> &'static str {
        match role {
            Role::Member => "member",
            Role::Admin => "admin",
        }
    }
}

#[async_trait]
impl MemberRepository for SqliteMemberRepository {
    async fn create(&self, request: CreateMemberRequest, role: Role) -> Result<Member> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        // Hash the password with argon2
        use argon2::password_hash::{rand_core::OsRng, SaltString};
        use argon2::{Argon2, PasswordHasher};

        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        let password_hash = argon2
            .hash_password(request.password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(e.to_string()))?
            .to_string();

        let id_str = id.to_string();
        let role_str = Self::role_to_str(&role);
        let now_naive = now.naive_utc();

        sqlx::query(
            r#"
            INSERT INTO members (id, email, full_name, password_hash, role, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id_str)
        .bind(&request.email)
        .bind(&request.full_name)
        .bind(&password_hash)
        .bind(role_str)
        .bind(now_naive)
        .bind(now_naive)
        .execute(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "Email already registered"))?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve created member".to_string()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Member>> {
        let id_str = id.to_string();
        let row = sqlx::query_as::<_, MemberRow>(
            r#"
            SELECT id, email, full_name, role, created_at, updated_at
            FROM members
            WHERE id = ?
            "#,
        )
        .bind(id_str)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_member(r)?)),
            None => Ok(None),
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Member>> {
        let row = sqlx::query_as::<_, MemberRow>(
            r#"
            SELECT id, email, full_name, role, created_at, updated_at
            FROM members
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_member(r)?)),
            None => Ok(None),
        }
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Member>> {
        let rows = sqlx::query_as::<_, MemberRow>(
            r#"
            SELECT id, email, full_name, role, created_at, updated_at
            FROM members
            ORDER BY created_at DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_member).collect()
    }
}
