use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::ports::notify::NotificationDispatcher;
use crate::record::AlumniRecord;

/// What must be delivered to an alumnus and when. One event per moderation
/// or verification obligation; the dispatcher owns delivery mechanics.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum NotificationEvent {
    VerificationRequested {
        alumni_id: String,
        name: String,
        email: String,
        token: String,
    },
    Approved {
        alumni_id: String,
        name: String,
        email: String,
    },
    Rejected {
        alumni_id: String,
        name: String,
        email: String,
        reason: String,
    },
}

impl NotificationEvent {
    pub fn verification_requested(record: &AlumniRecord, token: &str) -> Self {
        Self::VerificationRequested {
            alumni_id: record.alumni_id.clone(),
            name: record.name.clone(),
            email: record.email.clone(),
            token: token.to_string(),
        }
    }

    pub fn approved(record: &AlumniRecord) -> Self {
        Self::Approved {
            alumni_id: record.alumni_id.clone(),
            name: record.name.clone(),
            email: record.email.clone(),
        }
    }

    pub fn rejected(record: &AlumniRecord, reason: &str) -> Self {
        Self::Rejected {
            alumni_id: record.alumni_id.clone(),
            name: record.name.clone(),
            email: record.email.clone(),
            reason: reason.to_string(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::VerificationRequested { .. } => "verification_requested",
            Self::Approved { .. } => "approved",
            Self::Rejected { .. } => "rejected",
        }
    }

    pub fn alumni_id(&self) -> &str {
        match self {
            Self::VerificationRequested { alumni_id, .. }
            | Self::Approved { alumni_id, .. }
            | Self::Rejected { alumni_id, .. } => alumni_id,
        }
    }
}

/// Fires an obligation after the owning mutation has committed. Delivery
/// failure is a warning, never a reason to surface the mutation as failed.
pub async fn dispatch_best_effort(
    dispatcher: &Arc<dyn NotificationDispatcher>,
    event: NotificationEvent,
) {
    let kind = event.kind();
    let alumni_id = event.alumni_id().to_string();
    if let Err(err) = dispatcher.dispatch(event).await {
        tracing::warn!(
            error = %err,
            event = kind,
            alumni_id = %alumni_id,
            "notification dispatch failed; record state already committed"
        );
    }
}
