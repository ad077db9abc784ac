use thiserror::Error;

use crate::notify::NotificationEvent;
use crate::ports::BoxFuture;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("transient delivery failure: {0}")]
    Transient(String),
    #[error("permanent delivery failure: {0}")]
    Permanent(String),
}

/// Outbound notification boundary. Implementations deliver at most one
/// user-visible message per call and retry transient failures themselves;
/// they never call back into the domain. Callers treat any error as
/// best-effort and never roll back the state change that raised the event.
pub trait NotificationDispatcher: Send + Sync {
    fn dispatch(&self, event: NotificationEvent) -> BoxFuture<'_, Result<(), DispatchError>>;
}
