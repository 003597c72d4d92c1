//! Route configuration and setup

use crate::api_doc::ApiDoc;
use crate::constants::{API_PREFIX, FILES_PATH, LEGACY_PACKAGE_PATH, OPENAPI_PATH};
use crate::handlers::{files, health, package};
use crate::middleware::{gateway_headers_middleware, request_id_middleware, GatewayHeadersConfig};
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Json, Router,
};
use exametry_core::Config;
use std::sync::Arc;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Router<()> {
    let package_route = post(package::create_package).options(package::preflight);

    let routes = Router::new()
        .route(&format!("{}/packages", API_PREFIX), package_route.clone())
        .route(LEGACY_PACKAGE_PATH, package_route)
        .route(FILES_PATH, get(files::get_signed_file))
        .route("/health", get(health::health_check))
        .route("/live", get(health::liveness_check))
        .route(OPENAPI_PATH, get(|| async { Json(ApiDoc::openapi()) }));

    let gateway_headers = Arc::new(GatewayHeadersConfig::new(config.cors_origins()));

    tracing::info!(
        http_concurrency_limit = config.http_concurrency_limit(),
        max_request_body_bytes = config.max_request_body_bytes(),
        "HTTP limits configured"
    );

    // One semaphore shared by every route.
    routes
        .layer(GlobalConcurrencyLimitLayer::new(config.http_concurrency_limit()))
        .layer(RequestBodyLimitLayer::new(config.max_request_body_bytes()))
        .layer(axum::middleware::from_fn_with_state(
            gateway_headers,
            gateway_headers_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .with_state(state)
}
