//! Best-effort remote confirmation of favorite changes.
//!
//! Confirmation has no durable effect of its own. Its only role is to decide
//! whether an optimistic change stands or is rolled back.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tracing::info;

use crate::error::NetworkError;

/// Remote collaborator acknowledging favorite changes.
#[async_trait]
pub trait FavoriteConfirmer: Send + Sync {
    /// Confirm that `bill_no` was favorited.
    async fn favorite(&self, bill_no: &str) -> Result<(), NetworkError>;

    /// Confirm that `bill_no` (or a raw id when the bill is unknown) was unfavorited.
    async fn unfavorite(&self, bill_no: &str) -> Result<(), NetworkError>;
}

/// Stand-in for a favorites endpoint: waits, then succeeds or fails at random.
#[derive(Debug, Clone)]
pub struct SimulatedConfirmer {
    latency: Duration,
    failure_rate: f64,
}

impl SimulatedConfirmer {
    /// `failure_rate` is clamped to `[0, 1]`.
    #[must_use]
    pub fn new(latency: Duration, failure_rate: f64) -> Self {
        let failure_rate = if failure_rate.is_nan() {
            0.0
        } else {
            failure_rate.clamp(0.0, 1.0)
        };
        Self {
            latency,
            failure_rate,
        }
    }

    async fn respond(&self, action: &str, bill_no: &str) -> Result<(), NetworkError> {
        tokio::time::sleep(self.latency).await;

        let failed = rand::thread_rng().gen_bool(self.failure_rate);
        if failed {
            return Err(NetworkError::Rejected(format!(
                "simulated failure to {action} {bill_no}"
            )));
        }

        info!(bill_no, action, "favorite change confirmed");
        Ok(())
    }
}

impl Default for SimulatedConfirmer {
    fn default() -> Self {
        Self::new(Duration::from_millis(500), 0.0)
    }
}

#[async_trait]
impl FavoriteConfirmer for SimulatedConfirmer {
    async fn favorite(&self, bill_no: &str) -> Result<(), NetworkError> {
        self.respond("favorite", bill_no).await
    }

    async fn unfavorite(&self, bill_no: &str) -> Result<(), NetworkError> {
        self.respond("unfavorite", bill_no).await
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

    use super::{FavoriteConfirmer, NetworkError};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Which confirmation was requested.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum ConfirmCall {
        Favorite(String),
        Unfavorite(String),
    }

    /// Mock implementation of [`FavoriteConfirmer`].
    ///
    /// Answers `Ok(())` unless failures are queued with `push_failure` or
    /// `fail_always` is set. `set_delay` stalls every call, for timeout tests.
    pub struct MockConfirmer {
        outcomes: Mutex<VecDeque<Result<(), NetworkError>>>,
        fail_always: Mutex<bool>,
        delay: Mutex<Duration>,
        calls: Mutex<Vec<ConfirmCall>>,
    }

    impl MockConfirmer {
        pub fn new() -> Self {
            Self {
                outcomes: Mutex::new(VecDeque::new()),
                fail_always: Mutex::new(false),
                delay: Mutex::new(Duration::ZERO),
                calls: Mutex::new(Vec::new()),
            }
        }

        /// Mock whose every confirmation fails.
        pub fn failing() -> Self {
            let mock = Self::new();
            mock.set_fail_always(true);
            mock
        }

        /// Queue the outcome of the next confirmation.
        pub fn push_outcome(&self, outcome: Result<(), NetworkError>) {
            self.outcomes.lock().unwrap().push_back(outcome);
        }

        /// Queue a failure for the next confirmation.
        pub fn push_failure(&self) {
            self.push_outcome(Err(NetworkError::Rejected("mock failure".into())));
        }

        pub fn set_fail_always(&self, fail: bool) {
            *self.fail_always.lock().unwrap() = fail;
        }

        pub fn set_delay(&self, delay: Duration) {
            *self.delay.lock().unwrap() = delay;
        }

        /// All confirmations requested so far.
        pub fn calls(&self) -> Vec<ConfirmCall> {
            self.calls.lock().unwrap().clone()
        }

        async fn answer(&self, call: ConfirmCall) -> Result<(), NetworkError> {
            self.calls.lock().unwrap().push(call);

            let delay = *self.delay.lock().unwrap();
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            if let Some(outcome) = self.outcomes.lock().unwrap().pop_front() {
                return outcome;
            }
            if *self.fail_always.lock().unwrap() {
                return Err(NetworkError::Rejected("mock failure".into()));
            }
            Ok(())
        }
    }

    impl Default for MockConfirmer {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl FavoriteConfirmer for MockConfirmer {
        async fn favorite(&self, bill_no: &str) -> Result<(), NetworkError> {
            self.answer(ConfirmCall::Favorite(bill_no.to_string())).await
        }

        async fn unfavorite(&self, bill_no: &str) -> Result<(), NetworkError> {
            self.answer(ConfirmCall::Unfavorite(bill_no.to_string())).await
        }
    }
}
