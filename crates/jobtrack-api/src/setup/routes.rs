//! Route configuration and setup

use crate::api_doc::ApiDoc;
use crate::handlers;
use crate::middleware::{
    rate_limit_middleware, request_id_middleware, security_headers_middleware, RateLimitState,
    SecurityHeadersConfig,
};
use crate::state::AppState;
use axum::{
    http::{HeaderValue, Method},
    routing::{get, post, put},
    Json, Router,
};
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

/// Server-level concurrency ceiling, protection against resource exhaustion
/// under extreme load.
const HTTP_CONCURRENCY_LIMIT: usize = 1024;

/// Build the application router.
///
/// The public write endpoints (record creation and upload-URL reissue) sit
/// behind the per-IP rate limiter; everything else is limited only by the
/// global layers. Privileged endpoints enforce the admin token via extractor.
pub fn build_router(state: Arc<AppState>) -> Router {
    let rate_limit_state = Arc::new(RateLimitState::from_config(&state.config));
    let security_headers = Arc::new(SecurityHeadersConfig::new(state.config.is_production()));
    let cors = setup_cors(&state.config);
    let body_limit = state.config.request_body_limit_bytes;

    // Rate-limited public write surface. Attachment binaries never pass
    // through here; they go straight to storage via presigned URLs.
    let public_write = Router::new()
        .route("/{collection}", post(handlers::create::create_record))
        .route(
            "/{collection}/{id}/cv-upload-url",
            post(handlers::upload_url::reissue_upload_url),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            rate_limit_state,
            rate_limit_middleware,
        ));

    let reads_and_admin = Router::new()
        .route("/{collection}", get(handlers::list::list_records))
        .route(
            "/{collection}/{id}",
            get(handlers::get::get_record)
                .put(handlers::update::update_record)
                .delete(handlers::delete::delete_record),
        )
        .route(
            "/{collection}/{id}/status",
            put(handlers::status::change_status),
        )
        .route("/{collection}/{id}/notes", put(handlers::notes::set_notes))
        .route(
            "/{collection}/{id}/scan-attachments",
            post(handlers::scan::scan_attachments),
        )
        .route("/health", get(handlers::health::health));

    Router::new()
        .merge(public_write)
        .merge(reads_and_admin)
        .with_state(state)
        .merge(Router::from(
            RapiDoc::new("/api/openapi.json").path("/docs"),
        ))
        .route(
            "/api/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .layer(ConcurrencyLimitLayer::new(HTTP_CONCURRENCY_LIMIT))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(axum::middleware::from_fn_with_state(
            security_headers,
            security_headers_middleware,
        ))
}

fn setup_cors(config: &jobtrack_core::Config) -> CorsLayer {
    if config.cors_origins.is_empty() {
        // Same default as the original deployment: a public, read-mostly API.
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
        ])
}
