use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{Enrollment, NewEnrollment, PaymentStatus, SubjectKind},
    error::{AppError, Result},
    repository::{conflict_on_unique, EnrollmentRepository},
};

#[derive(FromRow)]
struct EnrollmentRow {
    id: String,
    subject_id: String,
    user_id: String,
    status: String,
    payment_reference: String,
    amount_kwanzas: i64,
    payment_method: String,
    version: i64,
    enrolled_at: NaiveDateTime,
    paid_at: Option<NaiveDateTime>,
    updated_at: NaiveDateTime,
}

const ENROLLMENT_COLUMNS: &str = "id, subject_id, user_id, status, payment_reference, \
     amount_kwanzas, payment_method, version, enrolled_at, paid_at, updated_at";

/// One repository serves all three enrollment collections; the subject
/// kind selects the table. The collections stay physically separate but
/// share shape and lifecycle.
pub struct SqliteEnrollmentRepository {
    pool: SqlitePool,
}

impl SqliteEnrollmentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_enrollment(row: EnrollmentRow) -> Result<Enrollment> {
        Ok(Enrollment {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            subject_id: Uuid::parse_str(&row.subject_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            user_id: Uuid::parse_str(&row.user_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            status: Self::parse_status(&row.status)?,
            payment_reference: row.payment_reference,
            amount_kwanzas: row.amount_kwanzas,
            payment_method: row.payment_method,
            version: row.version,
            enrolled_at: DateTime::from_naive_utc_and_offset(row.enrolled_at, Utc),
            paid_at: row
                .paid_at
                .map(|dt| DateTime::from_naive_utc_and_offset(dt, Utc)),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }

    fn parse_status(s: &str) -> Result<PaymentStatus> {
        match s {
            "Pending" => Ok(PaymentStatus::Pending),
            "Paid" => Ok(PaymentStatus::Paid),
            "Cancelled" => Ok(PaymentStatus::Cancelled),
            _ => Err(AppError::Database(format!("Invalid payment status: {}", s))),
        }
    }

    fn status_to_str(status: &PaymentStatus) -> &'static str {
        match status {
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Paid => "Paid",
            PaymentStatus::Cancelled => "Cancelled",
        }
    }

    /// Explain a failed guarded transition. The UPDATE matched nothing, so
    /// either the row is gone, the lifecycle already moved on, or another
    /// admin got there first.
    async fn transition_conflict(&self, kind: SubjectKind, id: Uuid) -> AppError {
        match self.find_by_id(kind, id).await {
            Ok(Some(e)) if e.status != PaymentStatus::Pending => AppError::Conflict(format!(
                "Enrollment is already {}",
                e.status.wire_label(kind)
            )),
            Ok(Some(_)) => {
                AppError::Conflict("Enrollment was modified by another admin".to_string())
            }
            Ok(None) => AppError::NotFound("Enrollment not found".to_string()),
            Err(e) => e,
        }
    }
}

#[async_trait]
impl EnrollmentRepository for SqliteEnrollmentRepository {
    async fn create_pending(&self, kind: SubjectKind, new: NewEnrollment) -> Result<Enrollment> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let subject_id_str = new.subject_id.to_string();
        let user_id_str = new.user_id.to_string();
        let status_str = Self::status_to_str(&PaymentStatus::Pending);
        let now = Utc::now().naive_utc();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        // The price snapshot comes from the authoritative row inside this
        // transaction, never from anything the client already fetched.
        let price_sql = format!(
            "SELECT price_kwanzas FROM {} WHERE id = ?",
            kind.subject_table()
        );
        let price = sqlx::query_scalar::<_, i64>(&price_sql)
            .bind(&subject_id_str)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::NotFound("Subject not found".to_string()))?;

        let insert_sql = format!(
            r#"
            INSERT INTO {} (
                id, subject_id, user_id, status, payment_reference,
                amount_kwanzas, payment_method, version, enrolled_at, paid_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, 0, ?, NULL, ?)
            "#,
            kind.enrollment_table()
        );

        sqlx::query(&insert_sql)
            .bind(&id_str)
            .bind(&subject_id_str)
            .bind(&user_id_str)
            .bind(status_str)
            .bind(&new.payment_reference)
            .bind(price)
            .bind(&new.payment_method)
            .bind(now)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(|e| conflict_on_unique(e, "Already enrolled in this subject"))?;

        tx.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(kind, id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve created enrollment".to_string()))
    }

    async fn find_by_id(&self, kind: SubjectKind, id: Uuid) -> Result<Option<Enrollment>> {
        let id_str = id.to_string();
        let sql = format!(
            "SELECT {} FROM {} WHERE id = ?",
            ENROLLMENT_COLUMNS,
            kind.enrollment_table()
        );

        let row = sqlx::query_as::<_, EnrollmentRow>(&sql)
            .bind(id_str)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_enrollment(r)?)),
            None => Ok(None),
        }
    }

    async fn find_by_user_and_subject(
        &self,
        kind: SubjectKind,
        user_id: Uuid,
        subject_id: Uuid,
    ) -> Result<Option<Enrollment>> {
        let user_id_str = user_id.to_string();
        let subject_id_str = subject_id.to_string();
        let sql = format!(
            "SELECT {} FROM {} WHERE user_id = ? AND subject_id = ?",
            ENROLLMENT_COLUMNS,
            kind.enrollment_table()
        );

        let row = sqlx::query_as::<_, EnrollmentRow>(&sql)
            .bind(user_id_str)
            .bind(subject_id_str)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_enrollment(r)?)),
            None => Ok(None),
        }
    }

    async fn list_by_user(&self, kind: SubjectKind, user_id: Uuid) -> Result<Vec<Enrollment>> {
        let user_id_str = user_id.to_string();
        let sql = format!(
            "SELECT {} FROM {} WHERE user_id = ? ORDER BY enrolled_at DESC",
            ENROLLMENT_COLUMNS,
            kind.enrollment_table()
        );

        let rows = sqlx::query_as::<_, EnrollmentRow>(&sql)
            .bind(user_id_str)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_enrollment).collect()
    }

    async fn list_by_status(
        &self,
        kind: SubjectKind,
        status: PaymentStatus,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Enrollment>> {
        let status_str = Self::status_to_str(&status);
        let sql = format!(
            "SELECT {} FROM {} WHERE status = ? ORDER BY enrolled_at ASC LIMIT ? OFFSET ?",
            ENROLLMENT_COLUMNS,
            kind.enrollment_table()
        );

        let rows = sqlx::query_as::<_, EnrollmentRow>(&sql)
            .bind(status_str)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_enrollment).collect()
    }

    async fn confirm(
        &self,
        kind: SubjectKind,
        id: Uuid,
        expected_version: i64,
    ) -> Result<Enrollment> {
        let id_str = id.to_string();
        let now = Utc::now().naive_utc();

        // Compare-and-swap: only a pending row at the version the admin
        // observed moves forward. Paid and Cancelled are terminal.
        let sql = format!(
            r#"
            UPDATE {}
            SET status = 'Paid', paid_at = ?, version = version + 1, updated_at = ?
            WHERE id = ? AND status = 'Pending' AND version = ?
            "#,
            kind.enrollment_table()
        );

        let result = sqlx::query(&sql)
            .bind(now)
            .bind(now)
            .bind(&id_str)
            .bind(expected_version)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(self.transition_conflict(kind, id).await);
        }

        self.find_by_id(kind, id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve confirmed enrollment".to_string()))
    }

    async fn cancel(
        &self,
        kind: SubjectKind,
        id: Uuid,
        expected_version: i64,
    ) -> Result<Enrollment> {
        let id_str = id.to_string();
        let now = Utc::now().naive_utc();

        let sql = format!(
            r#"
            UPDATE {}
            SET status = 'Cancelled', version = version + 1, updated_at = ?
            WHERE id = ? AND status = 'Pending' AND version = ?
            "#,
            kind.enrollment_table()
        );

        let result = sqlx::query(&sql)
            .bind(now)
            .bind(&id_str)
            .bind(expected_version)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(self.transition_conflict(kind, id).await);
        }

        self.find_by_id(kind, id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve cancelled enrollment".to_string()))
    }

    async fn count_by_status(
        &self,
        kind: SubjectKind,
        subject_id: Uuid,
        status: PaymentStatus,
    ) -> Result<i64> {
        let subject_id_str = subject_id.to_string();
        let status_str = Self::status_to_str(&status);
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE subject_id = ? AND status = ?",
            kind.enrollment_table()
        );

        let count = sqlx::query_scalar::<_, i64>(&sql)
            .bind(subject_id_str)
            .bind(status_str)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(count)
    }

    async fn count_all_by_status(&self, kind: SubjectKind, status: PaymentStatus) -> Result<i64> {
        let status_str = Self::status_to_str(&status);
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE status = ?",
            kind.enrollment_table()
        );

        let count = sqlx::query_scalar::<_, i64>(&sql)
            .bind(status_str)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(count)
    }

    async fn revenue_confirmed(&self, kind: SubjectKind) -> Result<i64> {
        let sql = format!(
            "SELECT COALESCE(SUM(amount_kwanzas), 0) FROM {} WHERE status = 'Paid'",
            kind.enrollment_table()
        );

        let total = sqlx::query_scalar::<_, i64>(&sql)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(total)
    }
}
