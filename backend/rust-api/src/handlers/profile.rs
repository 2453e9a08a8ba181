use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use crate::{
    middlewares::auth::JwtClaims,
    services::{profile_service::ProfileService, AppState},
};

/// `GET /api/v1/user-profile` - the caller's own aggregate
pub async fn get_user_profile(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<JwtClaims>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let service = ProfileService::new(state.mongo.clone(), state.redis.clone());

    match service.user_profile(&claims.sub).await {
        Ok(profile) => Ok((StatusCode::OK, Json(profile))),
        Err(e) => {
            tracing::error!("Failed to load user profile: {}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

/// `GET /api/v1/leaderboard` - top users by lifetime points
pub async fn get_leaderboard(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let service = ProfileService::new(state.mongo.clone(), state.redis.clone());

    match service.leaderboard().await {
        Ok(rows) => Ok((StatusCode::OK, Json(rows))),
        Err(e) => {
            tracing::error!("Failed to load leaderboard: {}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}
