use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{
        ClassGroup, Course, Lesson, Mentorship, NewClassGroup, NewCourse, NewLesson,
        NewMentorship, SubjectKind,
    },
    error::{AppError, Result},
    repository::SubjectRepository,
};

#[derive(FromRow)]
struct ClassGroupRow {
    id: String,
    name: String,
    description: String,
    price_kwanzas: i64,
    capacity: i64,
    starts_at: NaiveDateTime,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

#[derive(FromRow)]
struct CourseRow {
    id: String,
    title: String,
    description: String,
    price_kwanzas: i64,
    published: i32,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

#[derive(FromRow)]
struct LessonRow {
    id: String,
    course_id: String,
    title: String,
    position: i64,
    free_preview: i32,
    created_at: NaiveDateTime,
}

#[derive(FromRow)]
struct MentorshipRow {
    id: String,
    title: String,
    description: String,
    price_kwanzas: i64,
    mentor_name: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

pub struct SqliteSubjectRepository {
    pool: SqlitePool,
}

impl SqliteSubjectRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_class_group(row: ClassGroupRow) -> Result<ClassGroup> {
        Ok(ClassGroup {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            name: row.name,
            description: row.description,
            price_kwanzas: row.price_kwanzas,
            capacity: row.capacity,
            starts_at: DateTime::from_naive_utc_and_offset(row.starts_at, Utc),
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }

    fn row_to_course(row: CourseRow) -> Result<Course> {
        Ok(Course {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            title: row.title,
            description: row.description,
            price_kwanzas: row.price_kwanzas,
            published: row.published != 0,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }

    fn row_to_lesson(row: LessonRow) -> Result<Lesson> {
        Ok(Lesson {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            course_id: Uuid::parse_str(&row.course_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            title: row.title,
            position: row.position,
            free_preview: row.free_preview != 0,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
        })
    }

    fn row_to_mentorship(row: MentorshipRow) -> Result<Mentorship> {
        Ok(Mentorship {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            title: row.title,
            description: row.description,
            price_kwanzas: row.price_kwanzas,
            mentor_name: row.mentor_name,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }

    fn title_column(kind: SubjectKind) -> &'static str {
        match kind {
            SubjectKind::ClassGroup => "name",
            SubjectKind::Course => "title",
            SubjectKind::Mentorship => "title",
        }
    }
}

#[async_trait]
impl SubjectRepository for SqliteSubjectRepository {
    async fn create_class_group(&self, new: NewClassGroup) -> Result<ClassGroup> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO class_groups (id, name, description, price_kwanzas, capacity, starts_at, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id_str)
        .bind(&new.name)
        .bind(&new.description)
        .bind(new.price_kwanzas)
        .bind(new.capacity)
        .bind(new.starts_at.naive_utc())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_class_group(id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve created class group".to_string()))
    }

    async fn list_class_groups(&self) -> Result<Vec<ClassGroup>> {
        let rows = sqlx::query_as::<_, ClassGroupRow>(
            r#"
            SELECT id, name, description, price_kwanzas, capacity, starts_at, created_at, updated_at
            FROM class_groups
            ORDER BY starts_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_class_group).collect()
    }

    async fn find_class_group(&self, id: Uuid) -> Result<Option<ClassGroup>> {
        let id_str = id.to_string();
        let row = sqlx::query_as::<_, ClassGroupRow>(
            r#"
            SELECT id, name, description, price_kwanzas, capacity, starts_at, created_at, updated_at
            FROM class_groups
            WHERE id = ?
            "#,
        )
        .bind(id_str)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_class_group(r)?)),
            None => Ok(None),
        }
    }

    async fn create_course(&self, new: NewCourse) -> Result<Course> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let published_int = if new.published { 1i32 } else { 0i32 };
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO courses (id, title, description, price_kwanzas, published, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id_str)
        .bind(&new.title)
        .bind(&new.description)
        .bind(new.price_kwanzas)
        .bind(published_int)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_course(id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve created course".to_string()))
    }

    async fn list_published_courses(&self) -> Result<Vec<Course>> {
        let rows = sqlx::query_as::<_, CourseRow>(
            r#"
            SELECT id, title, description, price_kwanzas, published, created_at, updated_at
            FROM courses
            WHERE published = 1
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_course).collect()
    }

    async fn find_course(&self, id: Uuid) -> Result<Option<Course>> {
        let id_str = id.to_string();
        let row = sqlx::query_as::<_, CourseRow>(
            r#"
            SELECT id, title, description, price_kwanzas, published, created_at, updated_at
            FROM courses
            WHERE id = ?
            "#,
        )
        .bind(id_str)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_course(r)?)),
            None => Ok(None),
        }
    }

    async fn add_lesson(&self, course_id: Uuid, new: NewLesson) -> Result<Lesson> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let course_id_str = course_id.to_string();
        let free_preview_int = if new.free_preview { 1i32 } else { 0i32 };
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO lessons (id, course_id, title, position, free_preview, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id_str)
        .bind(&course_id_str)
        .bind(&new.title)
        .bind(new.position)
        .bind(free_preview_int)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_lesson(id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve created lesson".to_string()))
    }

    async fn list_lessons(&self, course_id: Uuid) -> Result<Vec<Lesson>> {
        let course_id_str = course_id.to_string();
        let rows = sqlx::query_as::<_, LessonRow>(
            r#"
            SELECT id, course_id, title, position, free_preview, created_at
            FROM lessons
            WHERE course_id = ?
            ORDER BY position ASC
            "#,
        )
        .bind(course_id_str)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_lesson).collect()
    }

    async fn find_lesson(&self, id: Uuid) -> Result<Option<Lesson>> {
        let id_str = id.to_string();
        let row = sqlx::query_as::<_, LessonRow>(
            r#"
            SELECT id, course_id, title, position, free_preview, created_at
            FROM lessons
            WHERE id = ?
            "#,
        )
        .bind(id_str)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_lesson(r)?)),
            None => Ok(None),
        }
    }

    async fn create_mentorship(&self, new: NewMentorship) -> Result<Mentorship> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO mentorships (id, title, description, price_kwanzas, mentor_name, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id_str)
        .bind(&new.title)
        .bind(&new.description)
        .bind(new.price_kwanzas)
        .bind(&new.mentor_name)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_mentorship(id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve created mentorship".to_string()))
    }

    async fn list_mentorships(&self) -> Result<Vec<Mentorship>> {
        let rows = sqlx::query_as::<_, MentorshipRow>(
            r#"
            SELECT id, title, description, price_kwanzas, mentor_name, created_at, updated_at
            FROM mentorships
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_mentorship).collect()
    }

    async fn find_mentorship(&self, id: Uuid) -> Result<Option<Mentorship>> {
        let id_str = id.to_string();
        let row = sqlx::query_as::<_, MentorshipRow>(
            r#"
            SELECT id, title, description, price_kwanzas, mentor_name, created_at, updated_at
            FROM mentorships
            WHERE id = ?
            "#,
        )
        .bind(id_str)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_mentorship(r)?)),
            None => Ok(None),
        }
    }

    async fn find_title(&self, kind: SubjectKind, id: Uuid) -> Result<Option<String>> {
        let id_str = id.to_string();
        let sql = format!(
            "SELECT {} FROM {} WHERE id = ?",
            Self::title_column(kind),
            kind.subject_table()
        );

        let title = sqlx::query_scalar::<_, String>(&sql)
            .bind(id_str)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(title)
    }

    async fn update_price(&self, kind: SubjectKind, id: Uuid, price_kwanzas: i64) -> Result<()> {
        let id_str = id.to_string();
        let now = Utc::now().naive_utc();
        let sql = format!(
            "UPDATE {} SET price_kwanzas = ?, updated_at = ? WHERE id = ?",
            kind.subject_table()
        );

        let result = sqlx::query(&sql)
            .bind(price_kwanzas)
            .bind(now)
            .bind(&id_str)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Subject not found".to_string()));
        }

        Ok(())
    }
}
