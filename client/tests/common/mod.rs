//! Common test utilities for integration tests.
//!
//! - [`http_mock`] - wiremock wrapper for stubbing the `/legislation` resource
//! - [`fixtures`] - bill and favorite builders
//!
//! Each test binary uses a subset of these helpers.
#![allow(dead_code)]

pub mod fixtures;
pub mod http_mock;
