use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::SubjectKind;

/// Issued against exactly one confirmed enrollment. The code is the
/// public handle: anyone holding it can look the certificate up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Certificate {
    pub id: Uuid,
    pub code: String,
    pub kind: SubjectKind,
    pub enrollment_id: Uuid,
    pub holder_name: String,
    pub subject_title: String,
    pub issued_at: DateTime<Utc>,
}

const CODE_LEN: usize = 12;
const BASE36: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Opaque upper-case base36 verification code. Uniqueness is enforced by
/// the store; a collision would fail the insert.
pub fn generate_certificate_code() -> String {
    let mut rng = rand::thread_rng();
    (0..CODE_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_is_twelve_base36_chars() {
        let code = generate_certificate_code();
        assert_eq!(code.len(), CODE_LEN);
        assert!(code.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }
}
