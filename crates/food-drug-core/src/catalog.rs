//! Incremental catalog browsing in fixed-size pages.
//!
//! The cursor is an offset owned by the caller; the pager keeps no position of
//! its own, so browsing can restart from any cursor at any time. A stale cursor
//! simply returns whatever the backend holds at that offset now.

use std::sync::Arc;

use tracing::debug;

use crate::cache::{CacheKey, RequestCache};
use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::models::{sort_by_name, CatalogPage, Role, PAGE_SIZE};
use crate::repository::Repository;

/// Pagination cursor engine over the role catalogs.
pub struct CatalogPager {
    repository: Arc<dyn Repository>,
    pages: RequestCache<CatalogPage>,
}

impl CatalogPager {
    pub fn new(repository: Arc<dyn Repository>, config: &CoreConfig) -> Self {
        Self {
            repository,
            pages: RequestCache::from_config("catalog", config),
        }
    }

    /// Fetch the page starting at `cursor` (0 for the first page).
    ///
    /// The page is exhausted when it holds fewer than [`PAGE_SIZE`] items;
    /// asking again past the end yields an empty, exhausted page.
    pub async fn next_page(&self, role: Role, cursor: i64) -> CoreResult<CatalogPage> {
        let offset = u64::try_from(cursor)
            .map_err(|_| CoreError::InvalidInput(format!("cursor must not be negative: {cursor}")))?;

        let key = CacheKey::catalog_page(role, cursor, PAGE_SIZE);
        self.pages
            .get(key, || async move {
                let raw = self.repository.medication_page(role, offset, PAGE_SIZE).await?;
                debug!(%role, cursor, rows = raw.raw_count, "fetched catalog page");

                let mut items = raw.items;
                sort_by_name(&mut items);
                let exhausted = items.len() < PAGE_SIZE;
                let advanced = i64::try_from(raw.raw_count).unwrap_or(i64::MAX);

                Ok(CatalogPage {
                    items,
                    cursor,
                    next_cursor: cursor.saturating_add(advanced),
                    exhausted,
                })
            })
            .await
    }

    /// Forget cached pages, e.g. after the catalog was re-imported.
    pub fn refresh(&self) {
        self.pages.invalidate_all();
    }
}
