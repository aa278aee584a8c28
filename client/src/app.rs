//! The surface the presentation layer talks to.
//!
//! [`BillsApp`] bundles the fetch layer and the favorites store and exposes
//! only page fetching, filtering, and the favorites operations. Callers never
//! reach the remote source or the storage medium directly.

use std::borrow::Cow;
use std::sync::Arc;

use bills_model::{bill_type_choices, filter_page, BillPage, BillTypeOption, FavoriteBill};
use tokio::sync::broadcast;

use crate::config::Config;
use crate::error::{FetchError, NetworkError};
use crate::favorites::{
    FavoriteConfirmer, FavoritesStorage, FavoritesStore, JsonFileStorage, MutationOutcome,
    SimulatedConfirmer, StoreEvent,
};
use crate::fetch::BillFetcher;
use crate::source::{BillSource, HttpBillSource};

pub struct BillsApp {
    fetcher: BillFetcher,
    favorites: Arc<FavoritesStore>,
}

impl BillsApp {
    /// Wire the real collaborators described by `config`.
    ///
    /// # Errors
    /// Returns [`NetworkError::Request`] if the HTTP client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self, NetworkError> {
        let http = reqwest::Client::builder()
            .timeout(config.api.request_timeout())
            .build()?;
        let source = Arc::new(HttpBillSource::with_client(http, &config.api.base_url));

        let storage = JsonFileStorage::new(&config.favorites.storage_dir, &config.favorites.namespace);
        let confirmer = Arc::new(SimulatedConfirmer::new(
            config.favorites.simulated_latency(),
            config.favorites.simulated_failure_rate,
        ));

        Ok(Self::with_parts(source, Box::new(storage), confirmer, config))
    }

    /// Wire caller-supplied collaborators, taking tunables from `config`.
    pub fn with_parts(
        source: Arc<dyn BillSource>,
        storage: Box<dyn FavoritesStorage>,
        confirmer: Arc<dyn FavoriteConfirmer>,
        config: &Config,
    ) -> Self {
        Self {
            fetcher: BillFetcher::new(source, config.cache.ttl(), config.cache.max_entries),
            favorites: FavoritesStore::load(
                storage,
                confirmer,
                config.favorites.confirm_timeout(),
            ),
        }
    }

    /// See [`BillFetcher::fetch_bill_page`].
    ///
    /// # Errors
    /// Returns [`FetchError`] when `limit` is 0 or the remote call fails.
    pub async fn fetch_bill_page(&self, limit: u32, skip: u32) -> Result<BillPage, FetchError> {
        self.fetcher.fetch_bill_page(limit, skip).await
    }

    /// See [`BillFetcher::fetch_filtered`].
    ///
    /// # Errors
    /// Same as [`Self::fetch_bill_page`].
    pub async fn fetch_filtered(
        &self,
        limit: u32,
        skip: u32,
        bill_type: &str,
    ) -> Result<BillPage, FetchError> {
        self.fetcher.fetch_filtered(limit, skip, bill_type).await
    }

    /// Forget cached pages so the next fetch goes to the remote source.
    pub fn refresh(&self) {
        self.fetcher.invalidate();
    }

    /// See [`bills_model::filter_page`].
    #[must_use]
    pub fn filter_page<'a>(page: &'a BillPage, bill_type: &str) -> Cow<'a, BillPage> {
        filter_page(page, bill_type)
    }

    /// Options for the bill-type filter shown over `page`.
    #[must_use]
    pub fn bill_type_choices(page: &BillPage) -> Vec<BillTypeOption<'_>> {
        bill_type_choices(page)
    }

    /// Favorite `bill`. It is visible to [`Self::is_favorite`] before the
    /// confirmation resolves and is rolled back if confirmation fails.
    pub async fn add_favorite(&self, bill: FavoriteBill) -> MutationOutcome {
        self.favorites.add_favorite(bill).await
    }

    /// Unfavorite `id`, restoring the previous favorites if confirmation fails.
    pub async fn remove_favorite(&self, id: &str) -> MutationOutcome {
        self.favorites.remove_favorite(id).await
    }

    /// Whether `id` is currently a favorite.
    pub fn is_favorite(&self, id: &str) -> bool {
        self.favorites.is_favorite(id)
    }

    /// Whether a favorite change on `id` awaits confirmation.
    pub fn is_pending(&self, id: &str) -> bool {
        self.favorites.is_pending(id)
    }

    /// Favorites in insertion order, for the favorites view.
    pub fn favorites(&self) -> Vec<FavoriteBill> {
        self.favorites.favorites()
    }

    /// Store events (changes, pending marks, rollback warnings) from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.favorites.subscribe()
    }
}
