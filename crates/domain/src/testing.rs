//! Shared in-memory test doubles for the repository and dispatcher ports.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::RwLock;

use crate::DomainResult;
use crate::error::DomainError;
use crate::notify::NotificationEvent;
use crate::ports::BoxFuture;
use crate::ports::alumni::{AlumniRepository, DirectoryFilter, StatusCounts};
use crate::ports::notify::{DispatchError, NotificationDispatcher};
use crate::record::{AlumniRecord, ApprovalStatus};
use crate::slug::candidate;

#[derive(Default)]
pub struct InMemoryAlumniStore {
    records: Arc<RwLock<HashMap<String, AlumniRecord>>>,
    reserved_slugs: Arc<RwLock<HashSet<String>>>,
}

impl AlumniRepository for InMemoryAlumniStore {
    fn reserve_slug(&self, base: &str) -> BoxFuture<'_, DomainResult<String>> {
        let base = base.to_string();
        let reserved = self.reserved_slugs.clone();
        Box::pin(async move {
            let mut reserved = reserved.write().await;
            let mut attempt = 0;
            loop {
                let slug = candidate(&base, attempt);
                if reserved.insert(slug.clone()) {
                    return Ok(slug);
                }
                attempt += 1;
            }
        })
    }

    fn insert(&self, record: &AlumniRecord) -> BoxFuture<'_, DomainResult<AlumniRecord>> {
        let record = record.clone();
        let records = self.records.clone();
        Box::pin(async move {
            let mut records = records.write().await;
            if records.contains_key(&record.alumni_id) {
                return Err(DomainError::Conflict);
            }
            records.insert(record.alumni_id.clone(), record.clone());
            Ok(record)
        })
    }

    fn get(&self, alumni_id: &str) -> BoxFuture<'_, DomainResult<Option<AlumniRecord>>> {
        let key = alumni_id.to_string();
        let records = self.records.clone();
        Box::pin(async move { Ok(records.read().await.get(&key).cloned()) })
    }

    fn find_by_token(&self, token: &str) -> BoxFuture<'_, DomainResult<Option<AlumniRecord>>> {
        let token = token.to_string();
        let records = self.records.clone();
        Box::pin(async move {
            Ok(records
                .read()
                .await
                .values()
                .find(|record| record.verification_token() == Some(token.as_str()))
                .cloned())
        })
    }

    fn update(&self, record: &AlumniRecord) -> BoxFuture<'_, DomainResult<AlumniRecord>> {
        let record = record.clone();
        let records = self.records.clone();
        Box::pin(async move {
            let mut records = records.write().await;
            if !records.contains_key(&record.alumni_id) {
                return Err(DomainError::NotFound);
            }
            records.insert(record.alumni_id.clone(), record.clone());
            Ok(record)
        })
    }

    fn delete(&self, alumni_id: &str) -> BoxFuture<'_, DomainResult<()>> {
        let key = alumni_id.to_string();
        let records = self.records.clone();
        Box::pin(async move {
            match records.write().await.remove(&key) {
                Some(_) => Ok(()),
                None => Err(DomainError::NotFound),
            }
        })
    }

    fn list(
        &self,
        filter: &DirectoryFilter,
        offset: usize,
        limit: usize,
    ) -> BoxFuture<'_, DomainResult<(Vec<AlumniRecord>, usize)>> {
        let filter = filter.clone();
        let records = self.records.clone();
        Box::pin(async move {
            let mut rows: Vec<_> = records
                .read()
                .await
                .values()
                .filter(|record| filter.matches(record))
                .cloned()
                .collect();
            rows.sort_by(|left, right| {
                right
                    .created_at_ms
                    .cmp(&left.created_at_ms)
                    .then_with(|| right.alumni_id.cmp(&left.alumni_id))
            });
            let total = rows.len();
            let page: Vec<_> = rows.into_iter().skip(offset).take(limit).collect();
            Ok((page, total))
        })
    }

    fn status_counts(&self) -> BoxFuture<'_, DomainResult<StatusCounts>> {
        let records = self.records.clone();
        Box::pin(async move {
            let records = records.read().await;
            let mut counts = StatusCounts {
                total: records.len(),
                ..StatusCounts::default()
            };
            for record in records.values() {
                match record.approval_status() {
                    ApprovalStatus::Pending => counts.pending += 1,
                    ApprovalStatus::Approved => counts.approved += 1,
                    ApprovalStatus::Rejected => counts.rejected += 1,
                }
                if !record.is_email_verified() {
                    counts.unverified += 1;
                }
            }
            Ok(counts)
        })
    }
}

/// Captures dispatched events; optionally fails every call to exercise the
/// best-effort contract.
#[derive(Default)]
pub struct RecordingDispatcher {
    events: Arc<RwLock<Vec<NotificationEvent>>>,
    attempts: AtomicUsize,
    fail: bool,
}

impl RecordingDispatcher {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub async fn events(&self) -> Vec<NotificationEvent> {
        self.events.read().await.clone()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl NotificationDispatcher for RecordingDispatcher {
    fn dispatch(&self, event: NotificationEvent) -> BoxFuture<'_, Result<(), DispatchError>> {
        let events = self.events.clone();
        let fail = self.fail;
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move {
            if fail {
                return Err(DispatchError::Transient("smtp unavailable".to_string()));
            }
            events.write().await.push(event);
            Ok(())
        })
    }
}
