//! Development response headers.
//!
//! Adds headers to all responses:
//! - Cache-Control (so reloaded pages fetch fresh Python sources)
//! - X-Content-Type-Options

use axum::http::HeaderValue;
use axum::http::header::HeaderName;
use tower_http::set_header::SetResponseHeaderLayer;

/// Cache-Control header value.
const NO_CACHE: &str = "no-store, must-revalidate";

/// Create layer that disables HTTP caching.
pub(crate) fn no_cache_layer() -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(
        HeaderName::from_static("cache-control"),
        HeaderValue::from_static(NO_CACHE),
    )
}

/// Create layer that adds X-Content-Type-Options header.
pub(crate) fn content_type_options_layer() -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(
        HeaderName::from_static("x-content-type-options"),
        HeaderValue::from_static("nosniff"),
    )
}
