use crate::api::{handlers, AppState};
use crate::metrics;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

/// Build the main API router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Unauthenticated
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .route("/v1/auth/login", post(handlers::login))
        // Session required
        .route("/v1/auth/logout", post(handlers::logout))
        .route("/v1/users", post(handlers::create_user))
        .route("/v1/readings", get(handlers::list_readings))
        .route("/v1/series/:dimension", get(handlers::dimension_series))
        .route("/v1/classify", post(handlers::classify))
        .route("/v1/predict", post(handlers::predict))
        .fallback(handlers::not_found)
        // Add state
        .with_state(state)
        // Add middleware
        .layer(middleware::from_fn(metrics::track_http))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(false))
                .on_response(DefaultOnResponse::new()),
        )
        .layer(CorsLayer::permissive())
}
