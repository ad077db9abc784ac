use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::DomainResult;
use crate::error::DomainError;
use crate::identity::AdminIdentity;
use crate::notify::{NotificationEvent, dispatch_best_effort};
use crate::ports::alumni::AlumniRepository;
use crate::ports::notify::NotificationDispatcher;
use crate::record::{AlumniRecord, Lifecycle, ReviewDecision};
use crate::util::now_ms;

const REJECTION_REASON_MAX_LEN: usize = 512;

/// Per-id outcome of a bulk operation. Partial failure is routine, so skips
/// are report entries rather than errors.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BulkOutcome {
    Approved { alumni_id: String },
    Skipped { alumni_id: String, kind: BulkSkipKind },
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BulkSkipKind {
    NotFound,
    EmailNotVerified,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BulkApproveReport {
    pub approved: usize,
    pub skipped: usize,
    pub outcomes: Vec<BulkOutcome>,
}

/// Enforces the approval state machine and its audit fields. Decisions are
/// mutually reversible: re-approval and re-rejection re-stamp the deciding
/// administrator and timestamp (last write wins), so approve is
/// idempotent-ish rather than exclusive.
#[derive(Clone)]
pub struct ModerationEngine {
    repository: Arc<dyn AlumniRepository>,
    dispatcher: Arc<dyn NotificationDispatcher>,
}

impl ModerationEngine {
    pub fn new(
        repository: Arc<dyn AlumniRepository>,
        dispatcher: Arc<dyn NotificationDispatcher>,
    ) -> Self {
        Self {
            repository,
            dispatcher,
        }
    }

    pub async fn approve(
        &self,
        alumni_id: &str,
        acting_admin: &AdminIdentity,
    ) -> DomainResult<AlumniRecord> {
        let record = self.decide(alumni_id, acting_admin, None).await?;
        dispatch_best_effort(&self.dispatcher, NotificationEvent::approved(&record)).await;
        Ok(record)
    }

    pub async fn reject(
        &self,
        alumni_id: &str,
        acting_admin: &AdminIdentity,
        reason: Option<String>,
    ) -> DomainResult<AlumniRecord> {
        let reason = reason.unwrap_or_default();
        if reason.len() > REJECTION_REASON_MAX_LEN {
            return Err(DomainError::Validation(format!(
                "rejection reason exceeds {REJECTION_REASON_MAX_LEN} characters"
            )));
        }
        let record = self.decide(alumni_id, acting_admin, Some(reason.clone())).await?;
        dispatch_best_effort(
            &self.dispatcher,
            NotificationEvent::rejected(&record, &reason),
        )
        .await;
        Ok(record)
    }

    /// Applies `approve` to each id independently; one id's failure never
    /// aborts the batch. Each transition is individually atomic; there is no
    /// cross-record transaction.
    pub async fn bulk_approve(
        &self,
        alumni_ids: &[String],
        acting_admin: &AdminIdentity,
    ) -> DomainResult<BulkApproveReport> {
        let mut outcomes = Vec::with_capacity(alumni_ids.len());
        let mut approved = 0usize;
        for alumni_id in alumni_ids {
            match self.approve(alumni_id, acting_admin).await {
                Ok(_) => {
                    approved += 1;
                    outcomes.push(BulkOutcome::Approved {
                        alumni_id: alumni_id.clone(),
                    });
                }
                Err(DomainError::NotFound) => outcomes.push(BulkOutcome::Skipped {
                    alumni_id: alumni_id.clone(),
                    kind: BulkSkipKind::NotFound,
                }),
                Err(DomainError::EmailNotVerified) => outcomes.push(BulkOutcome::Skipped {
                    alumni_id: alumni_id.clone(),
                    kind: BulkSkipKind::EmailNotVerified,
                }),
                Err(err) => return Err(err),
            }
        }
        let skipped = outcomes.len() - approved;
        tracing::info!(
            admin_id = %acting_admin.admin_id,
            approved,
            skipped,
            "bulk approve completed"
        );
        Ok(BulkApproveReport {
            approved,
            skipped,
            outcomes,
        })
    }

    /// Editorial highlight flip. Permitted in every state, including
    /// rejected or inactive records.
    pub async fn toggle_featured(&self, alumni_id: &str) -> DomainResult<AlumniRecord> {
        let mut record = self
            .repository
            .get(alumni_id)
            .await?
            .ok_or(DomainError::NotFound)?;
        record.is_featured = !record.is_featured;
        self.repository.update(&record).await
    }

    /// Directory visibility flip, independent of approval.
    pub async fn set_active(&self, alumni_id: &str, value: bool) -> DomainResult<AlumniRecord> {
        let mut record = self
            .repository
            .get(alumni_id)
            .await?
            .ok_or(DomainError::NotFound)?;
        record.is_active = value;
        self.repository.update(&record).await
    }

    /// Hard delete with no state precondition. The slug reservation is kept;
    /// a later registration under the same name re-disambiguates.
    pub async fn delete(
        &self,
        alumni_id: &str,
        acting_admin: &AdminIdentity,
    ) -> DomainResult<()> {
        self.repository.delete(alumni_id).await?;
        tracing::info!(
            alumni_id = %alumni_id,
            admin_id = %acting_admin.admin_id,
            "alumni record deleted"
        );
        Ok(())
    }

    /// Shared approve/reject transition. `reason: None` approves,
    /// `Some(reason)` rejects. The verification precondition cannot be
    /// bypassed: an unverified record has no timestamp to carry into the
    /// decided variants.
    async fn decide(
        &self,
        alumni_id: &str,
        acting_admin: &AdminIdentity,
        reason: Option<String>,
    ) -> DomainResult<AlumniRecord> {
        let mut record = self
            .repository
            .get(alumni_id)
            .await?
            .ok_or(DomainError::NotFound)?;

        let verified_at_ms = record
            .email_verified_at_ms()
            .ok_or(DomainError::EmailNotVerified)?;

        let decision = ReviewDecision {
            decided_by: acting_admin.admin_id.clone(),
            decided_at_ms: now_ms(),
        };
        record.lifecycle = match reason {
            None => Lifecycle::Approved {
                verified_at_ms,
                decision,
            },
            Some(reason) => Lifecycle::Rejected {
                verified_at_ms,
                decision,
                reason,
            },
        };
        let record = self.repository.update(&record).await?;
        tracing::info!(
            alumni_id = %record.alumni_id,
            admin_id = %acting_admin.admin_id,
            status = %record.approval_status(),
            "moderation decision recorded"
        );
        Ok(record)
    }
}
