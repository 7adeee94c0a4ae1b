use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{Certificate, SubjectKind},
    error::{AppError, Result},
    repository::{conflict_on_unique, CertificateRepository},
};

#[derive(FromRow)]
struct CertificateRow {
    id: String,
    code: String,
    kind: String,
    enrollment_id: String,
    holder_name: String,
    subject_title: String,
    issued_at: NaiveDateTime,
}

pub struct SqliteCertificateRepository {
    pool: SqlitePool,
}

impl SqliteCertificateRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_certificate(row: CertificateRow) -> Result<Certificate> {
        Ok(Certificate {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            code: row.code,
            kind: Self::parse_kind(&row.kind)?,
            enrollment_id: Uuid::parse_str(&row.enrollment_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            holder_name: row.holder_name,
            subject_title: row.subject_title,
            issued_at: DateTime::from_naive_utc_and_offset(row.issued_at, Utc),
        })
    }

    fn parse_kind(s: &str) -> Result<SubjectKind> {
        match s {
            "class_group" => Ok(SubjectKind::ClassGroup),
            "course" => Ok(SubjectKind::Course),
            "mentorship" => Ok(SubjectKind::Mentorship),
            _ => Err(AppError::Database(format!("Invalid subject kind: {}", s))),
        }
    }

    fn kind_to_str(kind: &SubjectKind) -> &'static str {
        match kind {
            SubjectKind::ClassGroup => "class_group",
            SubjectKind::Course => "course",
            SubjectKind::Mentorship => "mentorship",
        }
    }
}

#[async_trait]
impl CertificateRepository for SqliteCertificateRepository {
    async fn create(&self, certificate: Certificate) -> Result<Certificate> {
        let id_str = certificate.id.to_string();
        let enrollment_id_str = certificate.enrollment_id.to_string();
        let kind_str = Self::kind_to_str(&certificate.kind);
        let issued_at_naive = certificate.issued_at.naive_utc();

        sqlx::query(
            r#"
            INSERT INTO certificates (id, code, kind, enrollment_id, holder_name, subject_title, issued_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id_str)
        .bind(&certificate.code)
        .bind(kind_str)
        .bind(&enrollment_id_str)
        .bind(&certificate.holder_name)
        .bind(&certificate.subject_title)
        .bind(issued_at_naive)
        .execute(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "Certificate already issued for this enrollment"))?;

        Ok(certificate)
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Certificate>> {
        let row = sqlx::query_as::<_, CertificateRow>(
            r#"
            SELECT id, code, kind, enrollment_id, holder_name, subject_title, issued_at
            FROM certificates
            WHERE code = ?
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_certificate(r)?)),
            None => Ok(None),
        }
    }

    async fn find_by_enrollment(
        &self,
        kind: SubjectKind,
        enrollment_id: Uuid,
    ) -> Result<Option<Certificate>> {
        let enrollment_id_str = enrollment_id.to_string();
        let kind_str = Self::kind_to_str(&kind);

        let row = sqlx::query_as::<_, CertificateRow>(
            r#"
            SELECT id, code, kind, enrollment_id, holder_name, subject_title, issued_at
            FROM certificates
            WHERE kind = ? AND enrollment_id = ?
            "#,
        )
        .bind(kind_str)
        .bind(enrollment_id_str)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_certificate(r)?)),
            None => Ok(None),
        }
    }
}
