use std::sync::Arc;

use crate::DomainResult;
use crate::error::DomainError;
use crate::identity::AdminIdentity;
use crate::notify::{NotificationEvent, dispatch_best_effort};
use crate::ports::alumni::AlumniRepository;
use crate::ports::notify::NotificationDispatcher;
use crate::record::{AlumniRecord, Lifecycle};
use crate::util::{now_ms, verification_token};

/// Gates entry into the moderation queue: a registration only reaches
/// `PendingApproval` through a confirmed token or an administrator override.
#[derive(Clone)]
pub struct VerificationGate {
    repository: Arc<dyn AlumniRepository>,
    dispatcher: Arc<dyn NotificationDispatcher>,
}

impl VerificationGate {
    pub fn new(
        repository: Arc<dyn AlumniRepository>,
        dispatcher: Arc<dyn NotificationDispatcher>,
    ) -> Self {
        Self {
            repository,
            dispatcher,
        }
    }

    /// Re-issues a fresh token, overwriting any unconsumed one; only the
    /// latest token is ever valid. The token stays valid regardless of
    /// delivery outcome, so a bounced email can be followed by a manual
    /// verification or a retry.
    pub async fn request_verification(&self, alumni_id: &str) -> DomainResult<AlumniRecord> {
        let mut record = self
            .repository
            .get(alumni_id)
            .await?
            .ok_or(DomainError::NotFound)?;

        if record.is_email_verified() {
            return Err(DomainError::Validation(
                "email is already verified".to_string(),
            ));
        }

        let token = verification_token();
        record.lifecycle = Lifecycle::Unverified {
            verification_token: token.clone(),
        };
        let record = self.repository.update(&record).await?;
        tracing::info!(alumni_id = %record.alumni_id, "verification token issued");

        dispatch_best_effort(
            &self.dispatcher,
            NotificationEvent::verification_requested(&record, &token),
        )
        .await;
        Ok(record)
    }

    /// Consumes a token exactly once. Any miss is `InvalidToken`, whether the
    /// token was never issued, already consumed, or the record deleted; the
    /// response never reveals which.
    pub async fn confirm_verification(&self, token: &str) -> DomainResult<AlumniRecord> {
        let mut record = self
            .repository
            .find_by_token(token)
            .await?
            .ok_or(DomainError::InvalidToken)?;

        record.lifecycle = Lifecycle::PendingApproval {
            verified_at_ms: now_ms(),
        };
        let record = self.repository.update(&record).await?;
        tracing::info!(alumni_id = %record.alumni_id, "email verified, entering moderation queue");
        Ok(record)
    }

    /// Administrator override. Idempotent: a second call on an already
    /// verified record is a no-op returning it unchanged. Clears any pending
    /// token, so no further self-confirmation is possible.
    pub async fn manually_verify(
        &self,
        alumni_id: &str,
        acting_admin: &AdminIdentity,
    ) -> DomainResult<AlumniRecord> {
        let mut record = self
            .repository
            .get(alumni_id)
            .await?
            .ok_or(DomainError::NotFound)?;

        if record.is_email_verified() {
            return Ok(record);
        }

        record.lifecycle = Lifecycle::PendingApproval {
            verified_at_ms: now_ms(),
        };
        let record = self.repository.update(&record).await?;
        tracing::info!(
            alumni_id = %record.alumni_id,
            admin_id = %acting_admin.admin_id,
            "email manually verified by administrator"
        );
        Ok(record)
    }
}
