//! Cross-origin and content headers attached to every gateway response.
//!
//! The package endpoint is called directly from browser code, so every response,
//! errors and preflights included, carries the CORS headers.

use axum::http::{header, HeaderMap, HeaderValue};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

const ALLOWED_HEADERS: &str = "Content-Type";
const ALLOWED_METHODS: &str = "POST, OPTIONS";

/// Allowed origins for cross-origin requests.
#[derive(Clone, Debug)]
pub struct GatewayHeadersConfig {
    allow_any_origin: bool,
    origins: Vec<String>,
}

impl GatewayHeadersConfig {
    /// `*` anywhere in `origins` allows every origin.
    pub fn new(origins: &[String]) -> Self {
        Self {
            allow_any_origin: origins.is_empty() || origins.iter().any(|o| o == "*"),
            origins: origins
                .iter()
                .filter(|o| o.as_str() != "*")
                .map(|o| o.trim_end_matches('/').to_string())
                .collect(),
        }
    }

    /// Value for `Access-Control-Allow-Origin`, or `None` when the request origin is not allowed.
    fn allow_origin(&self, request_origin: Option<&str>) -> Option<HeaderValue> {
        if self.allow_any_origin {
            return Some(HeaderValue::from_static("*"));
        }
        let origin = request_origin?;
        self.origins
            .iter()
            .any(|allowed| allowed == origin)
            .then(|| HeaderValue::from_str(origin).ok())
            .flatten()
    }
}

/// Adds CORS headers. Content types stay with the handlers, so framework
/// responses such as 405 are not labelled as JSON.
pub async fn gateway_headers_middleware(
    State(config): State<Arc<GatewayHeadersConfig>>,
    request: Request,
    next: Next,
) -> Response {
    let origin = request
        .headers()
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    let mut response = next.run(request).await;
    apply_headers(&config, origin.as_deref(), response.headers_mut());
    response
}

fn apply_headers(config: &GatewayHeadersConfig, origin: Option<&str>, headers: &mut HeaderMap) {
    match config.allow_origin(origin) {
        Some(value) => {
            if !config.allow_any_origin {
                headers.append(header::VARY, HeaderValue::from_static("Origin"));
            }
            headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
        }
        None => {
            if let Some(origin) = origin {
                tracing::debug!(origin = %origin, "Origin not in CORS allow list");
            }
        }
    }

    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOWED_HEADERS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
}
