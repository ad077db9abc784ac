use std::sync::Arc;

use metrics::counter;

use alumni_domain::notify::NotificationEvent;
use alumni_domain::ports::BoxFuture;
use alumni_domain::ports::notify::{DispatchError, NotificationDispatcher};
use alumni_domain::util::backoff_ms;

use crate::config::AppConfig;

const NOTIFY_DELIVERY_TOTAL: &str = "alumni_notify_delivery_total";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutboundEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Transport seam. The real site hands messages to an SMTP relay; here the
/// boundary is a trait so tests and development can run without one.
pub trait Mailer: Send + Sync {
    fn send(&self, email: &OutboundEmail) -> BoxFuture<'_, Result<(), DispatchError>>;
}

/// Development mailer: writes the message to the log and reports success.
#[derive(Default)]
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send(&self, email: &OutboundEmail) -> BoxFuture<'_, Result<(), DispatchError>> {
        let email = email.clone();
        Box::pin(async move {
            tracing::info!(
                to = %email.to,
                subject = %email.subject,
                "outbound mail (log transport)\n{}",
                email.body
            );
            Ok(())
        })
    }
}

#[derive(Clone, Debug)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_base_ms: u64,
    pub backoff_max_ms: u64,
}

impl RetryPolicy {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            max_attempts: config.notify_max_attempts,
            backoff_base_ms: config.notify_backoff_base_ms,
            backoff_max_ms: config.notify_backoff_max_ms,
        }
    }
}

/// Dispatcher implementation: composes exactly one message per event and
/// hands it to a spawned delivery task, so the caller's mutation is never
/// held open by a slow or failing transport. Transient failures are retried
/// with exponential backoff; exhaustion and permanent failures are logged
/// and dropped, never escalated.
pub struct RetryingDispatcher {
    mailer: Arc<dyn Mailer>,
    from: String,
    verify_base_url: String,
    policy: RetryPolicy,
}

impl RetryingDispatcher {
    pub fn new(
        mailer: Arc<dyn Mailer>,
        from: impl Into<String>,
        verify_base_url: impl Into<String>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            mailer,
            from: from.into(),
            verify_base_url: verify_base_url.into(),
            policy,
        }
    }

    pub fn from_config(config: &AppConfig, mailer: Arc<dyn Mailer>) -> Self {
        Self::new(
            mailer,
            config.notify_from.clone(),
            config.verify_base_url.clone(),
            RetryPolicy::from_config(config),
        )
    }

    fn compose(&self, event: &NotificationEvent) -> OutboundEmail {
        match event {
            NotificationEvent::VerificationRequested {
                name, email, token, ..
            } => OutboundEmail {
                from: self.from.clone(),
                to: email.clone(),
                subject: "Confirm your alumni registration".to_string(),
                body: format!(
                    "Dear {name},\n\nPlease confirm your email address to complete your \
                     alumni registration:\n\n{}/{token}\n\nThe link is valid until a new \
                     one is requested.",
                    self.verify_base_url
                ),
            },
            NotificationEvent::Approved { name, email, .. } => OutboundEmail {
                from: self.from.clone(),
                to: email.clone(),
                subject: "Your alumni profile has been approved".to_string(),
                body: format!(
                    "Dear {name},\n\nYour alumni registration has been approved and your \
                     profile is now part of the school directory."
                ),
            },
            NotificationEvent::Rejected {
                name, email, reason, ..
            } => OutboundEmail {
                from: self.from.clone(),
                to: email.clone(),
                subject: "Update on your alumni registration".to_string(),
                body: if reason.is_empty() {
                    format!(
                        "Dear {name},\n\nYour alumni registration could not be approved. \
                         Please contact the school office for details."
                    )
                } else {
                    format!(
                        "Dear {name},\n\nYour alumni registration could not be approved.\n\
                         Reason: {reason}"
                    )
                },
            },
        }
    }
}

impl NotificationDispatcher for RetryingDispatcher {
    fn dispatch(&self, event: NotificationEvent) -> BoxFuture<'_, Result<(), DispatchError>> {
        let email = self.compose(&event);
        let mailer = self.mailer.clone();
        let policy = self.policy.clone();
        let kind = event.kind();
        let alumni_id = event.alumni_id().to_string();
        Box::pin(async move {
            tokio::spawn(async move {
                deliver_with_retry(mailer, email, policy, kind, &alumni_id).await;
            });
            Ok(())
        })
    }
}

async fn deliver_with_retry(
    mailer: Arc<dyn Mailer>,
    email: OutboundEmail,
    policy: RetryPolicy,
    kind: &'static str,
    alumni_id: &str,
) {
    let max_attempts = policy.max_attempts.max(1);
    for attempt in 1..=max_attempts {
        match mailer.send(&email).await {
            Ok(()) => {
                counter!(NOTIFY_DELIVERY_TOTAL, "event" => kind, "result" => "delivered")
                    .increment(1);
                tracing::debug!(event = kind, alumni_id, attempt, "notification delivered");
                return;
            }
            Err(DispatchError::Permanent(reason)) => {
                counter!(NOTIFY_DELIVERY_TOTAL, "event" => kind, "result" => "permanent_failure")
                    .increment(1);
                tracing::warn!(
                    event = kind,
                    alumni_id,
                    attempt,
                    reason,
                    "notification permanently undeliverable"
                );
                return;
            }
            Err(DispatchError::Transient(reason)) => {
                tracing::warn!(
                    event = kind,
                    alumni_id,
                    attempt,
                    max_attempts,
                    reason,
                    "transient notification failure"
                );
                if attempt < max_attempts {
                    let delay = backoff_ms(policy.backoff_base_ms, attempt, policy.backoff_max_ms);
                    tokio::time::sleep(std::time::Duration::from_millis(delay)).await;
                }
            }
        }
    }
    counter!(NOTIFY_DELIVERY_TOTAL, "event" => kind, "result" => "retries_exhausted")
        .increment(1);
    tracing::warn!(
        event = kind,
        alumni_id,
        max_attempts,
        "notification dropped after exhausting retries"
    );
}
