use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::RwLock;

use alumni_domain::DomainResult;
use alumni_domain::error::DomainError;
use alumni_domain::ports::BoxFuture;
use alumni_domain::ports::alumni::{AlumniRepository, DirectoryFilter, StatusCounts};
use alumni_domain::record::{AlumniRecord, ApprovalStatus};
use alumni_domain::slug::candidate;

#[derive(Default)]
struct Tables {
    records: HashMap<String, AlumniRecord>,
    /// token -> alumni_id, maintained on every write so confirmation is a
    /// single lookup.
    token_index: HashMap<String, String>,
    /// Permanently reserved slugs, kept across deletion so a bookmarked slug
    /// never silently points at a different person.
    reserved_slugs: HashSet<String>,
}

impl Tables {
    fn unindex_token(&mut self, alumni_id: &str) {
        self.token_index.retain(|_, id| id != alumni_id);
    }

    fn index_token(&mut self, record: &AlumniRecord) {
        if let Some(token) = record.verification_token() {
            self.token_index
                .insert(token.to_string(), record.alumni_id.clone());
        }
    }
}

/// Process-local store backing the service. Every mutation happens under one
/// write guard, so the field writes of a single transition land together.
#[derive(Default)]
pub struct InMemoryAlumniRepository {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryAlumniRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AlumniRepository for InMemoryAlumniRepository {
    fn reserve_slug(&self, base: &str) -> BoxFuture<'_, DomainResult<String>> {
        let base = base.to_string();
        let tables = self.tables.clone();
        Box::pin(async move {
            let mut tables = tables.write().await;
            let mut attempt = 0;
            loop {
                let slug = candidate(&base, attempt);
                if tables.reserved_slugs.insert(slug.clone()) {
                    return Ok(slug);
                }
                attempt += 1;
            }
        })
    }

    fn insert(&self, record: &AlumniRecord) -> BoxFuture<'_, DomainResult<AlumniRecord>> {
        let record = record.clone();
        let tables = self.tables.clone();
        Box::pin(async move {
            let mut tables = tables.write().await;
            if tables.records.contains_key(&record.alumni_id) {
                return Err(DomainError::Conflict);
            }
            tables.reserved_slugs.insert(record.slug.clone());
            tables.index_token(&record);
            tables
                .records
                .insert(record.alumni_id.clone(), record.clone());
            Ok(record)
        })
    }

    fn get(&self, alumni_id: &str) -> BoxFuture<'_, DomainResult<Option<AlumniRecord>>> {
        let key = alumni_id.to_string();
        let tables = self.tables.clone();
        Box::pin(async move { Ok(tables.read().await.records.get(&key).cloned()) })
    }

    fn find_by_token(&self, token: &str) -> BoxFuture<'_, DomainResult<Option<AlumniRecord>>> {
        let token = token.to_string();
        let tables = self.tables.clone();
        Box::pin(async move {
            let tables = tables.read().await;
            let Some(alumni_id) = tables.token_index.get(&token) else {
                return Ok(None);
            };
            Ok(tables.records.get(alumni_id).cloned())
        })
    }

    fn update(&self, record: &AlumniRecord) -> BoxFuture<'_, DomainResult<AlumniRecord>> {
        let record = record.clone();
        let tables = self.tables.clone();
        Box::pin(async move {
            let mut tables = tables.write().await;
            if !tables.records.contains_key(&record.alumni_id) {
                return Err(DomainError::NotFound);
            }
            tables.unindex_token(&record.alumni_id);
            tables.index_token(&record);
            tables
                .records
                .insert(record.alumni_id.clone(), record.clone());
            Ok(record)
        })
    }

    fn delete(&self, alumni_id: &str) -> BoxFuture<'_, DomainResult<()>> {
        let key = alumni_id.to_string();
        let tables = self.tables.clone();
        Box::pin(async move {
            let mut tables = tables.write().await;
            if tables.records.remove(&key).is_none() {
                return Err(DomainError::NotFound);
            }
            tables.unindex_token(&key);
            // reserved_slugs intentionally untouched.
            Ok(())
        })
    }

    fn list(
        &self,
        filter: &DirectoryFilter,
        offset: usize,
        limit: usize,
    ) -> BoxFuture<'_, DomainResult<(Vec<AlumniRecord>, usize)>> {
        let filter = filter.clone();
        let tables = self.tables.clone();
        Box::pin(async move {
            let mut rows: Vec<_> = tables
                .read()
                .await
                .records
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
        let tables = self.tables.clone();
        Box::pin(async move {
            let tables = tables.read().await;
            let mut counts = StatusCounts {
                total: tables.records.len(),
                ..StatusCounts::default()
            };
            for record in tables.records.values() {
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

#[cfg(test)]
mod tests {
    use super::*;
    use alumni_domain::record::{AlumniCategory, Lifecycle};

    fn record(id: &str, slug: &str, token: &str) -> AlumniRecord {
        AlumniRecord {
            alumni_id: id.to_string(),
            slug: slug.to_string(),
            name: "Amit Sharma".to_string(),
            batch_year: 2004,
            class_section: None,
            house: None,
            email: "amit@example.com".to_string(),
            phone: None,
            location: None,
            photo_path: None,
            designation: None,
            organization: None,
            category: AlumniCategory::Engineering,
            linkedin_url: None,
            achievements: None,
            story: None,
            memories: None,
            message: None,
            is_featured: false,
            is_active: true,
            lifecycle: Lifecycle::Unverified {
                verification_token: token.to_string(),
            },
            created_at_ms: 1_000,
        }
    }

    #[tokio::test]
    async fn slug_reservation_survives_deletion() {
        let repo = InMemoryAlumniRepository::new();
        let slug = repo.reserve_slug("amit-sharma").await.expect("reserve");
        assert_eq!(slug, "amit-sharma");
        repo.insert(&record("a1", &slug, "tok-1")).await.expect("insert");

        repo.delete("a1").await.expect("delete");
        let next = repo.reserve_slug("amit-sharma").await.expect("reserve");
        assert_eq!(next, "amit-sharma-1");
    }

    #[tokio::test]
    async fn token_index_follows_lifecycle_writes() {
        let repo = InMemoryAlumniRepository::new();
        repo.insert(&record("a1", "amit-sharma", "tok-1"))
            .await
            .expect("insert");

        let found = repo.find_by_token("tok-1").await.expect("find");
        assert_eq!(found.map(|r| r.alumni_id), Some("a1".to_string()));

        let mut verified = record("a1", "amit-sharma", "tok-1");
        verified.lifecycle = Lifecycle::PendingApproval { verified_at_ms: 9 };
        repo.update(&verified).await.expect("update");

        assert!(repo.find_by_token("tok-1").await.expect("find").is_none());
    }

    #[tokio::test]
    async fn reissued_token_replaces_index_entry() {
        let repo = InMemoryAlumniRepository::new();
        repo.insert(&record("a1", "amit-sharma", "tok-old"))
            .await
            .expect("insert");

        let reissued = record("a1", "amit-sharma", "tok-new");
        repo.update(&reissued).await.expect("update");

        assert!(repo.find_by_token("tok-old").await.expect("find").is_none());
        assert!(repo.find_by_token("tok-new").await.expect("find").is_some());
    }

    #[tokio::test]
    async fn duplicate_insert_conflicts() {
        let repo = InMemoryAlumniRepository::new();
        repo.insert(&record("a1", "amit-sharma", "tok-1"))
            .await
            .expect("insert");
        assert!(matches!(
            repo.insert(&record("a1", "amit-sharma-1", "tok-2")).await,
            Err(DomainError::Conflict)
        ));
    }
}
