use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::DomainResult;
use crate::ports::alumni::{
    AlumniRepository, DirectoryFilter, StatusCounts, StatusFilter, VerifiedFilter,
};
use crate::record::{AdminAlumniView, AlumniCategory, PublicAlumniProfile};

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const MAX_PAGE_SIZE: usize = 100;

#[derive(Clone, Debug, Default)]
pub struct AdminDirectoryQuery {
    pub status: StatusFilter,
    pub verified: VerifiedFilter,
    pub category: Option<AlumniCategory>,
    pub batch_year: Option<i32>,
    pub search: Option<String>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

#[derive(Clone, Debug, Default)]
pub struct PublicDirectoryQuery {
    pub category: Option<AlumniCategory>,
    pub batch_year: Option<i32>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DirectoryPage<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
}

/// Admin listing page plus the unfiltered dashboard tiles.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AdminDirectoryPage {
    #[serde(flatten)]
    pub page: DirectoryPage<AdminAlumniView>,
    pub counts: StatusCounts,
}

/// Read views over the alumni collection: unrestricted for the back office,
/// approved-and-active only for the public site.
#[derive(Clone)]
pub struct DirectoryService {
    repository: Arc<dyn AlumniRepository>,
}

impl DirectoryService {
    pub fn new(repository: Arc<dyn AlumniRepository>) -> Self {
        Self { repository }
    }

    pub async fn admin_list(&self, query: AdminDirectoryQuery) -> DomainResult<AdminDirectoryPage> {
        let (page, page_size) = clamp_page(query.page, query.page_size);
        let filter = DirectoryFilter {
            status: query.status,
            verified: query.verified,
            category: query.category,
            batch_year: query.batch_year,
            search: query.search.filter(|s| !s.trim().is_empty()),
            public_only: false,
        };
        let (records, total) = self
            .repository
            .list(&filter, (page - 1) * page_size, page_size)
            .await?;
        // Tile counts cover the whole population, not the filtered slice.
        let counts = self.repository.status_counts().await?;
        Ok(AdminDirectoryPage {
            page: DirectoryPage {
                items: records.iter().map(|r| r.to_admin_view()).collect(),
                page,
                page_size,
                total,
            },
            counts,
        })
    }

    pub async fn public_list(
        &self,
        query: PublicDirectoryQuery,
    ) -> DomainResult<DirectoryPage<PublicAlumniProfile>> {
        let (page, page_size) = clamp_page(query.page, query.page_size);
        let filter = DirectoryFilter {
            category: query.category,
            batch_year: query.batch_year,
            public_only: true,
            ..DirectoryFilter::default()
        };
        let (records, total) = self
            .repository
            .list(&filter, (page - 1) * page_size, page_size)
            .await?;
        Ok(DirectoryPage {
            items: records.iter().map(|r| r.to_public_profile()).collect(),
            page,
            page_size,
            total,
        })
    }
}

fn clamp_page(page: Option<usize>, page_size: Option<usize>) -> (usize, usize) {
    let page = page.unwrap_or(1).max(1);
    let page_size = page_size
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    (page, page_size)
}
