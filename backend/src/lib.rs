//! Rocktags: campus cat tracker backend.
//!
//! The domain fetches tracker fixes with caching, retries and geofencing,
//! merges them into the campus roster and proxies keyed lookups to the
//! upstream locator backend. HTTP, outbound and configuration adapters sit
//! around it.

pub mod config;
pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
