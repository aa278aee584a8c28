//! Bill fetch layer.
//!
//! Wraps a [`BillSource`], validates paging parameters, assigns client-side
//! identities, and keeps recently fetched pages in a short-lived cache keyed
//! by `(limit, skip)`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use bills_model::{filter_page, page_from_response, BillPage};
use tracing::{debug, info, warn};

use crate::error::{FetchError, ValidationError};
use crate::source::BillSource;

#[derive(Clone)]
struct CachedPage {
    page: BillPage,
    fetched_at: Instant,
}

struct PageCache {
    ttl: Duration,
    max_entries: usize,
    entries: HashMap<(u32, u32), CachedPage>,
}

impl PageCache {
    fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            ttl,
            max_entries,
            entries: HashMap::new(),
        }
    }

    const fn enabled(&self) -> bool {
        !self.ttl.is_zero() && self.max_entries > 0
    }

    fn get(&mut self, key: (u32, u32)) -> Option<BillPage> {
        let ttl = self.ttl;
        self.entries.retain(|_, v| v.fetched_at.elapsed() <= ttl);
        self.entries.get(&key).map(|cached| cached.page.clone())
    }

    fn insert(&mut self, key: (u32, u32), page: BillPage) {
        let ttl = self.ttl;
        self.entries.retain(|_, v| v.fetched_at.elapsed() <= ttl);
        if self.entries.len() >= self.max_entries && !self.entries.contains_key(&key) {
            if let Some(oldest) = self
                .entries
                .iter()
                .min_by_key(|(_, v)| v.fetched_at)
                .map(|(k, _)| *k)
            {
                self.entries.remove(&oldest);
            }
        }
        self.entries.insert(
            key,
            CachedPage {
                page,
                fetched_at: Instant::now(),
            },
        );
    }
}

/// Page-shaped access to the remote bill source.
pub struct BillFetcher {
    source: Arc<dyn BillSource>,
    cache: Mutex<PageCache>,
}

impl BillFetcher {
    /// Fetcher caching pages for `ttl`, holding at most `max_entries` pages.
    ///
    /// A zero `ttl` or `max_entries` disables caching.
    pub fn new(source: Arc<dyn BillSource>, ttl: Duration, max_entries: usize) -> Self {
        Self {
            source,
            cache: Mutex::new(PageCache::new(ttl, max_entries)),
        }
    }

    /// Fetcher that always goes to the source.
    pub fn uncached(source: Arc<dyn BillSource>) -> Self {
        Self::new(source, Duration::ZERO, 0)
    }

    /// Fetch one page of bills, each carrying a client-side id.
    ///
    /// The page head reports the server's total for the unfiltered query.
    ///
    /// # Errors
    /// Returns [`FetchError::Validation`] when `limit` is 0, and
    /// [`FetchError::Network`] when the remote call fails or answers with a
    /// non-success status.
    pub async fn fetch_bill_page(&self, limit: u32, skip: u32) -> Result<BillPage, FetchError> {
        if limit == 0 {
            return Err(ValidationError::NonPositiveLimit.into());
        }

        {
            let mut cache = self.cache();
            if cache.enabled() {
                if let Some(page) = cache.get((limit, skip)) {
                    debug!(limit, skip, "bill page served from cache");
                    return Ok(page);
                }
            }
        }

        let response = self.source.list_bills(limit, skip).await.map_err(|err| {
            warn!(limit, skip, error = %err, "bill fetch failed");
            err
        })?;

        let page = page_from_response(&response, u64::from(skip));
        info!(
            limit,
            skip,
            returned = page.results.len(),
            result_count = page.head.result_count,
            "fetched bill page"
        );

        let mut cache = self.cache();
        if cache.enabled() {
            cache.insert((limit, skip), page.clone());
        }

        Ok(page)
    }

    /// Fetch a page and keep only bills of `bill_type` (all when empty).
    ///
    /// # Errors
    /// Same as [`Self::fetch_bill_page`].
    pub async fn fetch_filtered(
        &self,
        limit: u32,
        skip: u32,
        bill_type: &str,
    ) -> Result<BillPage, FetchError> {
        let page = self.fetch_bill_page(limit, skip).await?;
        Ok(filter_page(&page, bill_type).into_owned())
    }

    /// Drop every cached page.
    pub fn invalidate(&self) {
        self.cache().entries.clear();
    }

    fn cache(&self) -> MutexGuard<'_, PageCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
