use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Member,
    Admin,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateMemberRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub full_name: String,
    #[validate(length(min = 8))]
    pub password: String,
}

/// Identity and contact data required before a member may enroll.
/// Attached 1:1 to a member; the enrollment form re-submits every field,
/// so the stored profile is refreshed on each enrollment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: Uuid,
    pub full_name: String,
    pub phone: String,
    pub id_number: String,
    pub birth_date: NaiveDate,
    pub address: String,
    pub province: String,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    pub fn is_complete(&self) -> bool {
        !self.full_name.trim().is_empty()
            && !self.phone.trim().is_empty()
            && !self.id_number.trim().is_empty()
            && !self.address.trim().is_empty()
            && !self.province.trim().is_empty()
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProfileUpsert {
    #[validate(length(min = 1, message = "full name is required"))]
    pub full_name: String,
    #[validate(length(min = 6, message = "phone is required"))]
    pub phone: String,
    #[validate(length(min = 1, message = "id number is required"))]
    pub id_number: String,
    pub birth_date: NaiveDate,
    #[validate(length(min = 1, message = "address is required"))]
    pub address: String,
    #[validate(length(min = 1, message = "province is required"))]
    pub province: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> Profile {
        Profile {
            user_id: Uuid::new_v4(),
            full_name: "Joana Manuel".to_string(),
            phone: "+244923000000".to_string(),
            id_number: "004567890LA042".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1998, 4, 12).unwrap(),
            address: "Rua Amílcar Cabral 15".to_string(),
            province: "Luanda".to_string(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn complete_profile_passes() {
        assert!(profile().is_complete());
    }

    #[test]
    fn blank_field_fails_completeness() {
        let mut p = profile();
        p.province = "  ".to_string();
        assert!(!p.is_complete());
    }
}
