#![allow(dead_code)]

use axum::{
    http::{header, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod config;
pub mod extractors;
pub mod handlers;
pub mod metrics;
pub mod middlewares;
pub mod models;
pub mod services;
pub mod utils;

pub use config::Config;
pub use services::AppState;

pub fn create_router(app_state: std::sync::Arc<services::AppState>) -> Router {
    // CORS configuration for the mobile and web clients
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_origin(tower_http::cors::Any); // TODO: restrict to specific origins in production

    Router::new()
        // Public endpoints (no auth required)
        .route("/health", get(handlers::health_check))
        // Metrics endpoint with Basic Auth protection
        .route(
            "/metrics",
            get(handlers::metrics_handler)
                .layer(middleware::from_fn(handlers::metrics_auth_middleware)),
        )
        // Protected endpoints (require JWT)
        .nest(
            "/api/v1",
            api_routes().layer(cors).layer(middleware::from_fn_with_state(
                app_state.clone(),
                middlewares::auth::auth_middleware,
            )),
        )
        .with_state(app_state)
        .layer(middleware::from_fn(
            middlewares::metrics::metrics_middleware,
        ))
        .layer(TraceLayer::new_for_http())
}

fn api_routes() -> Router<std::sync::Arc<services::AppState>> {
    Router::new()
        // Grading
        .route("/quiz/grade", post(handlers::assessments::grade_quiz))
        .route(
            "/assessments/{lesson_id}/submit",
            post(handlers::assessments::submit_assessment),
        )
        // Content catalogue
        .route("/topics", get(handlers::content::list_topics))
        .route("/lessons/{topic_id}", get(handlers::content::list_lessons))
        .route("/lesson/{id}", get(handlers::content::get_lesson))
        // Profile and rankings
        .route("/leaderboard", get(handlers::profile::get_leaderboard))
        .route("/user-profile", get(handlers::profile::get_user_profile))
}
