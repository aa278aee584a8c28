//! Remote bill source.
//!
//! # Architecture
//!
//! - [`BillSource`] - Trait for paged bill retrieval
//! - [`HttpBillSource`] - Real HTTP implementation using reqwest
//! - [`mock::MockBillSource`] - Mock for unit tests (behind `test-utils` feature)
//!
//! Integration tests stub the HTTP side with `wiremock`; see
//! `tests/bill_source_tests.rs`.

mod client;

pub use client::{BillSource, HttpBillSource};

#[cfg(any(test, feature = "test-utils"))]
pub use client::mock;
