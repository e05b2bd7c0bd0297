//! Route configuration.

use crate::auth::auth_middleware;
use crate::handlers;
use crate::metrics::metrics_handler;
use crate::state::AppState;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::get;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let fragment_routes = Router::new()
        .route(
            "/v1/fragments",
            get(handlers::list_fragments).post(handlers::create_fragment),
        )
        // `{id}` also matches `{id}.{ext}`; the handler splits off the extension.
        .route(
            "/v1/fragments/{id}",
            get(handlers::get_fragment)
                .put(handlers::update_fragment)
                .delete(handlers::delete_fragment),
        )
        .route("/v1/fragments/{id}/info", get(handlers::get_fragment_info))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let public_routes = Router::new()
        .route("/", get(handlers::service_info))
        // Health check (intentionally unauthenticated for load balancers/k8s probes)
        .route("/v1/health", get(handlers::health_check));

    let mut router = Router::new().merge(public_routes).merge(fragment_routes);

    // When enabled, restrict /metrics to scrapers at the network level.
    if state.config.server.metrics_enabled {
        router = router.route("/metrics", get(metrics_handler));
    }

    let body_limit = state.config.server.max_body_bytes;

    router
        .fallback(handlers::not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
