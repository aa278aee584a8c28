//! HTTP mock server helpers for testing the remote bill source.
//!
//! A thin wrapper around `wiremock` for declarative stubbing of
//! `GET /legislation?limit=&skip=`.
//!
//! # Quick Start
//!
//! ```ignore
//! let server = MockHttpServer::start().await;
//! server.stub_page(20, 0, bills_body(137, &[("2024", "10", "Public")])).await;
//!
//! let source = HttpBillSource::new(server.url());
//! ```
//!
//! # Patterns
//!
//! - **Success response**: `stub_page(limit, skip, body)`
//! - **Error response**: `stub_status(500)`
//! - **Timeout simulation**: `stub_page_with_delay(.., Duration::from_secs(5))`
//! - **Request verification**: `expect_page_calls(limit, skip, n)` then `verify()`

use std::time::Duration;

use serde_json::{json, Value};
pub use wiremock::matchers::{method, path, query_param};
pub use wiremock::{Mock, MockServer as WiremockServer, ResponseTemplate};

pub struct MockHttpServer {
    server: WiremockServer,
}

impl MockHttpServer {
    pub async fn start() -> Self {
        Self {
            server: WiremockServer::start().await,
        }
    }

    /// Base URL to hand to `HttpBillSource::new`.
    pub fn url(&self) -> String {
        self.server.uri()
    }

    pub fn inner(&self) -> &WiremockServer {
        &self.server
    }

    /// Check every `expect(n)` registered so far.
    pub async fn verify(&self) {
        self.server.verify().await;
    }

    fn page_mock(limit: u32, skip: u32) -> wiremock::MockBuilder {
        Mock::given(method("GET"))
            .and(path("/legislation"))
            .and(query_param("limit", limit.to_string()))
            .and(query_param("skip", skip.to_string()))
    }

    pub async fn stub_page(&self, limit: u32, skip: u32, body: Value) {
        Self::page_mock(limit, skip)
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    pub async fn stub_page_with_delay(&self, limit: u32, skip: u32, body: Value, delay: Duration) {
        Self::page_mock(limit, skip)
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(body)
                    .set_delay(delay),
            )
            .mount(&self.server)
            .await;
    }

    pub async fn expect_page_calls(&self, limit: u32, skip: u32, body: Value, times: u64) {
        Self::page_mock(limit, skip)
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(times)
            .mount(&self.server)
            .await;
    }

    /// Answer every `/legislation` request with `status`.
    pub async fn stub_status(&self, status: u16) {
        Mock::given(method("GET"))
            .and(path("/legislation"))
            .respond_with(
                ResponseTemplate::new(status).set_body_json(json!({"error": "stubbed failure"})),
            )
            .mount(&self.server)
            .await;
    }
}

/// A `/legislation` body with `(year, number, type)` bills.
pub fn bills_body(result_count: u64, bills: &[(&str, &str, &str)]) -> Value {
    let results: Vec<Value> = bills
        .iter()
        .map(|(year, number, bill_type)| {
            json!({
                "bill": {
                    "billNo": number,
                    "billYear": year,
                    "billType": bill_type,
                    "status": "Current",
                    "sponsors": [{
                        "sponsor": {
                            "by": { "showAs": format!("Sponsor {number}") },
                            "as": { "showAs": null },
                            "isPrimary": true
                        }
                    }],
                    "shortTitleEn": format!("Bill {number} of {year}"),
                    "shortTitleGa": format!("Bille {number} de {year}"),
                    "uri": format!("https://data.oireachtas.ie/ie/oireachtas/bill/{year}/{number}")
                }
            })
        })
        .collect();

    json!({
        "head": { "counts": { "billCount": result_count, "resultCount": result_count } },
        "results": results
    })
}
