//! Shared cache-control policies for HTTP handlers.

/// Live data must never be served from a cache.
pub const NO_STORE: &str = "no-store";

/// Build the cache-control header tuple for live responses.
#[must_use]
pub const fn no_store_header() -> (&'static str, &'static str) {
    ("Cache-Control", NO_STORE)
}
