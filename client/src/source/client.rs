//! Remote bill source client.
//!
//! A trait-based HTTP client for the Oireachtas `/legislation` resource. The
//! trait lets the fetch layer run against [`mock::MockBillSource`] in unit
//! tests and against a stubbed HTTP server in integration tests.
//!
//! # Example
//!
//! ```ignore
//! use oireachtas_bills::source::{BillSource, HttpBillSource};
//!
//! let source = HttpBillSource::new("https://api.oireachtas.ie/v1");
//! let response = source.list_bills(20, 0).await?;
//! println!("{} bills in total", response.head.counts.result_count);
//! ```

use async_trait::async_trait;
use bills_model::BillsResponse;
use tracing::debug;

use crate::error::NetworkError;

/// Read-only, paginated access to bill records.
///
/// The source does not support filtering by bill type; callers filter the
/// returned page themselves.
#[async_trait]
pub trait BillSource: Send + Sync {
    /// Fetch one page of bills.
    async fn list_bills(&self, limit: u32, skip: u32) -> Result<BillsResponse, NetworkError>;
}

/// HTTP-based implementation of [`BillSource`].
pub struct HttpBillSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBillSource {
    /// Create a source for the API rooted at `base_url` (e.g. `https://api.oireachtas.ie/v1`).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create a source with a custom `reqwest::Client` (timeouts, proxies).
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl BillSource for HttpBillSource {
    async fn list_bills(&self, limit: u32, skip: u32) -> Result<BillsResponse, NetworkError> {
        let url = format!("{}/legislation", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("limit", limit), ("skip", skip)])
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(status = status.as_u16(), body = %body, "bill source returned an error");
            return Err(NetworkError::Status {
                status: status.as_u16(),
                reason: status
                    .canonical_reason()
                    .unwrap_or("Unknown Status")
                    .to_string(),
            });
        }

        Ok(response.json().await?)
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[allow(
    clippy::unwrap_used,
    clippy::missing_panics_doc,
    clippy::missing_const_for_fn,
    clippy::must_use_candidate
)]
pub mod mock {
    //! Mock implementation for unit testing.

    use super::{BillSource, BillsResponse, NetworkError};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Mock implementation of [`BillSource`].
    ///
    /// Queue responses with `push_result`; once the queue is empty every call
    /// answers with an empty page. Verify calls with `calls()`.
    pub struct MockBillSource {
        results: Mutex<VecDeque<Result<BillsResponse, NetworkError>>>,
        calls: Mutex<Vec<(u32, u32)>>,
    }

    impl MockBillSource {
        pub fn new() -> Self {
            Self {
                results: Mutex::new(VecDeque::new()),
                calls: Mutex::new(Vec::new()),
            }
        }

        /// Queue the result of the next unanswered `list_bills` call.
        pub fn push_result(&self, result: Result<BillsResponse, NetworkError>) {
            self.results.lock().unwrap().push_back(result);
        }

        /// All `(limit, skip)` pairs passed to `list_bills`.
        pub fn calls(&self) -> Vec<(u32, u32)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Default for MockBillSource {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl BillSource for MockBillSource {
        async fn list_bills(&self, limit: u32, skip: u32) -> Result<BillsResponse, NetworkError> {
            self.calls.lock().unwrap().push((limit, skip));

            self.results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(BillsResponse::default()))
        }
    }
}
