use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::SubjectKind;

/// Normalized payment lifecycle. Historically the confirmed state was
/// stored as "paid" for classes/courses and "confirmed" for mentorships;
/// that split survives only as a wire label (`wire_label`), never in the
/// store or in this enum.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PaymentStatus {
    Pending,
    Paid,
    Cancelled,
}

impl PaymentStatus {
    pub fn wire_label(&self, kind: SubjectKind) -> &'static str {
        match (self, kind) {
            (PaymentStatus::Pending, _) => "pending",
            (PaymentStatus::Paid, SubjectKind::Mentorship) => "confirmed",
            (PaymentStatus::Paid, _) => "paid",
            (PaymentStatus::Cancelled, _) => "cancelled",
        }
    }

    /// Terminal states admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PaymentStatus::Paid | PaymentStatus::Cancelled)
    }
}

/// One member's enrollment in one subject. At most one row may exist per
/// (user_id, subject_id) pair within a collection; the store enforces
/// this with a unique index. `version` is bumped on every status
/// transition and guards admin actions against each other.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: Uuid,
    pub subject_id: Uuid,
    pub user_id: Uuid,
    pub status: PaymentStatus,
    pub payment_reference: String,
    /// Price snapshot taken at enrollment time, in kwanzas. Later price
    /// changes on the subject do not touch this.
    pub amount_kwanzas: i64,
    pub payment_method: String,
    pub version: i64,
    pub enrolled_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewEnrollment {
    pub user_id: Uuid,
    pub subject_id: Uuid,
    pub payment_reference: String,
    pub payment_method: String,
}

/// May this member view paid content for the subject?
///
/// Evaluated against a fresh enrollment lookup on every access check;
/// there is no caching layer, so staleness is bounded by query latency.
pub fn has_access(enrollment: Option<&Enrollment>) -> bool {
    enrollment
        .map(|e| e.status == PaymentStatus::Paid)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enrollment(status: PaymentStatus) -> Enrollment {
        Enrollment {
            id: Uuid::new_v4(),
            subject_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            status,
            payment_reference: "JU10-ABC123-X9K2PQ".to_string(),
            amount_kwanzas: 100_000,
            payment_method: "multicaixa_express".to_string(),
            version: 0,
            enrolled_at: Utc::now(),
            paid_at: None,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn access_requires_paid_status() {
        assert!(!has_access(None));
        assert!(!has_access(Some(&enrollment(PaymentStatus::Pending))));
        assert!(!has_access(Some(&enrollment(PaymentStatus::Cancelled))));
        assert!(has_access(Some(&enrollment(PaymentStatus::Paid))));
    }

    #[test]
    fn confirmed_label_differs_per_kind() {
        assert_eq!(
            PaymentStatus::Paid.wire_label(SubjectKind::ClassGroup),
            "paid"
        );
        assert_eq!(PaymentStatus::Paid.wire_label(SubjectKind::Course), "paid");
        assert_eq!(
            PaymentStatus::Paid.wire_label(SubjectKind::Mentorship),
            "confirmed"
        );
    }

    #[test]
    fn pending_and_cancelled_labels_are_uniform() {
        for kind in SubjectKind::ALL {
            assert_eq!(PaymentStatus::Pending.wire_label(kind), "pending");
            assert_eq!(PaymentStatus::Cancelled.wire_label(kind), "cancelled");
        }
    }

    #[test]
    fn terminal_states() {
        assert!(!PaymentStatus::Pending.is_terminal());
        assert!(PaymentStatus::Paid.is_terminal());
        assert!(PaymentStatus::Cancelled.is_terminal());
    }
}
