//! Intake API router.
//!
//! Returns a composable `Router` with every route nested under `/api/`.
//!
//! Layer stack (outermost → innermost):
//! 1. CORS → 2. `Cache-Control: no-store` → 3. Access logger

use std::sync::Arc;

use axum::http::{header, HeaderValue};
use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;

/// Build the intake API router.
pub fn intake_api_router(core: Arc<CoreState>) -> Router {
    build_router(ApiContext::new(core))
}

fn build_router(ctx: ApiContext) -> Router {
    // Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let api = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/catalog", get(endpoints::catalog::list))
        .route("/ages", get(endpoints::catalog::ages))
        .route("/sessions", post(endpoints::sessions::create))
        .route(
            "/sessions/:id",
            get(endpoints::sessions::snapshot).delete(endpoints::sessions::close),
        )
        .route("/sessions/:id/age", put(endpoints::sessions::set_age))
        .route("/sessions/:id/reset", post(endpoints::sessions::reset))
        .route(
            "/sessions/:id/symptoms/toggle",
            post(endpoints::symptoms::toggle),
        )
        .route(
            "/sessions/:id/symptoms/custom",
            post(endpoints::symptoms::add_custom),
        )
        .route(
            "/sessions/:id/symptoms/:key",
            delete(endpoints::symptoms::remove),
        )
        .route("/sessions/:id/analyze", post(endpoints::analysis::analyze))
        .route("/places", get(endpoints::places::nearby))
        .with_state(ctx)
        .layer(axum::middleware::from_fn(middleware::access_log::log_access))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    Router::new().nest("/api", api)
}
