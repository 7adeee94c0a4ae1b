pub mod admin;
pub mod auth;
pub mod certificates;
pub mod enrollments;
pub mod events;
pub mod profile;
pub mod root;
pub mod subjects;

use crate::{
    domain::SubjectKind,
    error::{AppError, Result},
};

/// Parse the collection segment of a URL ("classes" | "courses" |
/// "mentorships") into a subject kind.
pub(crate) fn parse_kind(segment: &str) -> Result<SubjectKind> {
    SubjectKind::from_path(segment)
        .ok_or_else(|| AppError::BadRequest(format!("Unknown enrollment collection: {}", segment)))
}
