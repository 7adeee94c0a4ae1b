use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// The three purchasable subject kinds. Enrollments for each live in a
/// physically separate table, but share one shape and one lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectKind {
    ClassGroup,
    Course,
    Mentorship,
}

impl SubjectKind {
    pub const ALL: [SubjectKind; 3] = [
        SubjectKind::ClassGroup,
        SubjectKind::Course,
        SubjectKind::Mentorship,
    ];

    pub fn enrollment_table(&self) -> &'static str {
        match self {
            SubjectKind::ClassGroup => "class_enrollments",
            SubjectKind::Course => "course_enrollments",
            SubjectKind::Mentorship => "mentorship_enrollments",
        }
    }

    pub fn subject_table(&self) -> &'static str {
        match self {
            SubjectKind::ClassGroup => "class_groups",
            SubjectKind::Course => "courses",
            SubjectKind::Mentorship => "mentorships",
        }
    }

    /// URL segment used by the API ("classes", "courses", "mentorships").
    pub fn from_path(s: &str) -> Option<SubjectKind> {
        match s {
            "classes" => Some(SubjectKind::ClassGroup),
            "courses" => Some(SubjectKind::Course),
            "mentorships" => Some(SubjectKind::Mentorship),
            _ => None,
        }
    }

    pub fn as_path(&self) -> &'static str {
        match self {
            SubjectKind::ClassGroup => "classes",
            SubjectKind::Course => "courses",
            SubjectKind::Mentorship => "mentorships",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassGroup {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price_kwanzas: i64,
    pub capacity: i64,
    pub starts_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub price_kwanzas: i64,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lesson {
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub position: i64,
    /// Free-preview lessons bypass the paid-content gate.
    pub free_preview: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mentorship {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub price_kwanzas: i64,
    pub mentor_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewClassGroup {
    #[validate(length(min = 1))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[validate(range(min = 0))]
    pub price_kwanzas: i64,
    #[validate(range(min = 1))]
    pub capacity: i64,
    pub starts_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewCourse {
    #[validate(length(min = 1))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[validate(range(min = 0))]
    pub price_kwanzas: i64,
    #[serde(default)]
    pub published: bool,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewLesson {
    #[validate(length(min = 1))]
    pub title: String,
    pub position: i64,
    #[serde(default)]
    pub free_preview: bool,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewMentorship {
    #[validate(length(min = 1))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[validate(range(min = 0))]
    pub price_kwanzas: i64,
    #[validate(length(min = 1))]
    pub mentor_name: String,
}
