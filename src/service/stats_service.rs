use std::sync::Arc;

use serde::Serialize;

use crate::{
    domain::{PaymentStatus, SubjectKind},
    error::Result,
    repository::EnrollmentRepository,
};

#[derive(Debug, Clone, Serialize)]
pub struct KindStats {
    pub kind: SubjectKind,
    pub pending: i64,
    pub confirmed: i64,
    pub revenue_kwanzas: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RevenueSummary {
    pub kinds: Vec<KindStats>,
    pub total_revenue_kwanzas: i64,
}

pub struct StatsService {
    enrollments: Arc<dyn EnrollmentRepository>,
}

impl StatsService {
    pub fn new(enrollments: Arc<dyn EnrollmentRepository>) -> Self {
        Self { enrollments }
    }

    /// Per-collection counts and confirmed revenue, summed client-side.
    ///
    /// The per-table reads are independent queries, not one snapshot:
    /// writes landing between them can skew the totals transiently.
    pub async fn revenue_summary(&self) -> Result<RevenueSummary> {
        let mut kinds = Vec::with_capacity(SubjectKind::ALL.len());
        let mut total = 0i64;

        for kind in SubjectKind::ALL {
            let pending = self
                .enrollments
                .count_all_by_status(kind, PaymentStatus::Pending)
                .await?;
            let confirmed = self
                .enrollments
                .count_all_by_status(kind, PaymentStatus::Paid)
                .await?;
            let revenue_kwanzas = self.enrollments.revenue_confirmed(kind).await?;

            total += revenue_kwanzas;
            kinds.push(KindStats {
                kind,
                pending,
                confirmed,
                revenue_kwanzas,
            });
        }

        Ok(RevenueSummary {
            kinds,
            total_revenue_kwanzas: total,
        })
    }
}
