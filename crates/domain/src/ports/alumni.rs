use serde::{Deserialize, Serialize};

use crate::DomainResult;
use crate::ports::BoxFuture;
use crate::record::{AlumniCategory, AlumniRecord, ApprovalStatus};

/// Three-way filters for the back-office listing; `All` leaves the axis
/// unconstrained.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Approved,
    Rejected,
}

impl StatusFilter {
    pub fn matches(&self, status: ApprovalStatus) -> bool {
        match self {
            Self::All => true,
            Self::Pending => status == ApprovalStatus::Pending,
            Self::Approved => status == ApprovalStatus::Approved,
            Self::Rejected => status == ApprovalStatus::Rejected,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifiedFilter {
    #[default]
    All,
    Yes,
    No,
}

impl VerifiedFilter {
    pub fn matches(&self, verified: bool) -> bool {
        match self {
            Self::All => true,
            Self::Yes => verified,
            Self::No => !verified,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct DirectoryFilter {
    pub status: StatusFilter,
    pub verified: VerifiedFilter,
    pub category: Option<AlumniCategory>,
    pub batch_year: Option<i32>,
    /// Case-insensitive substring match over name and email.
    pub search: Option<String>,
    /// Public surface constraint: approved and active only.
    pub public_only: bool,
}

impl DirectoryFilter {
    pub fn matches(&self, record: &AlumniRecord) -> bool {
        if self.public_only && !record.is_publicly_visible() {
            return false;
        }
        if !self.status.matches(record.approval_status()) {
            return false;
        }
        if !self.verified.matches(record.is_email_verified()) {
            return false;
        }
        if let Some(category) = self.category {
            if record.category != category {
                return false;
            }
        }
        if let Some(batch_year) = self.batch_year {
            if record.batch_year != batch_year {
                return false;
            }
        }
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            let in_name = record.name.to_lowercase().contains(&needle);
            let in_email = record.email.to_lowercase().contains(&needle);
            if !in_name && !in_email {
                return false;
            }
        }
        true
    }
}

/// Unfiltered population counts for the dashboard tiles. Always computed
/// over every record so the tiles stay comparable whatever filter is applied.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusCounts {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
    pub unverified: usize,
}

pub trait AlumniRepository: Send + Sync {
    /// Atomically reserves a unique slug derived from `base`, suffixing on
    /// collision. Reservations are permanent: they survive record deletion.
    fn reserve_slug(&self, base: &str) -> BoxFuture<'_, DomainResult<String>>;

    fn insert(&self, record: &AlumniRecord) -> BoxFuture<'_, DomainResult<AlumniRecord>>;

    fn get(&self, alumni_id: &str) -> BoxFuture<'_, DomainResult<Option<AlumniRecord>>>;

    fn find_by_token(&self, token: &str) -> BoxFuture<'_, DomainResult<Option<AlumniRecord>>>;

    /// Replaces the stored record wholesale; the lifecycle and flag writes of
    /// one transition land together or not at all.
    fn update(&self, record: &AlumniRecord) -> BoxFuture<'_, DomainResult<AlumniRecord>>;

    fn delete(&self, alumni_id: &str) -> BoxFuture<'_, DomainResult<()>>;

    /// Filtered page, newest registration first with id tiebreak, plus the
    /// total matching count.
    fn list(
        &self,
        filter: &DirectoryFilter,
        offset: usize,
        limit: usize,
    ) -> BoxFuture<'_, DomainResult<(Vec<AlumniRecord>, usize)>>;

    fn status_counts(&self) -> BoxFuture<'_, DomainResult<StatusCounts>>;
}
