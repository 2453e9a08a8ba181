use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use validator::Validate;

use crate::{
    extractors::AppJson,
    middlewares::auth::JwtClaims,
    models::assessment::{
        AssessmentResponse, GradeQuizRequest, GradeSummary, SubmitAssessmentRequest,
    },
    services::{assessment_service::AssessmentService, error::GradingError, AppState},
};

/// `POST /api/v1/quiz/grade` - minimal grading call
pub(crate) async fn grade_quiz(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<JwtClaims>,
    AppJson(req): AppJson<GradeQuizRequest>,
) -> Result<Json<GradeSummary>, ApiError> {
    req.validate()
        .map_err(|e| ApiError::bad_request(format!("Validation error: {}", e)))?;

    let service = AssessmentService::new(
        state.mongo.clone(),
        state.redis.clone(),
        state.config.content_api_url.clone(),
    );
    let summary = service.grade_quiz(&claims.sub, &req).await?;

    Ok(Json(summary))
}

/// `POST /api/v1/assessments/{lessonId}/submit` - rich submission call
pub(crate) async fn submit_assessment(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<JwtClaims>,
    Path(lesson_id): Path<String>,
    AppJson(req): AppJson<SubmitAssessmentRequest>,
) -> Result<Json<AssessmentResponse>, ApiError> {
    req.validate()
        .map_err(|e| ApiError::bad_request(format!("Validation error: {}", e)))?;

    let service = AssessmentService::new(
        state.mongo.clone(),
        state.redis.clone(),
        state.config.content_api_url.clone(),
    );
    let outcome = service
        .submit_assessment(&claims.sub, &lesson_id, &req)
        .await?;

    Ok(Json(outcome))
}

#[derive(Debug)]
pub(crate) enum ApiError {
    Unauthorized(String),
    BadRequest(String),
    Internal(String),
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    fn internal_generic() -> Self {
        ApiError::Internal("Failed to grade assessment".to_string())
    }
}

impl From<GradingError> for ApiError {
    fn from(err: GradingError) -> Self {
        match err {
            GradingError::Unauthenticated => {
                ApiError::Unauthorized("User must be authenticated".to_string())
            }
            GradingError::InvalidRequest(message) => ApiError::BadRequest(message),
            // The remaining variants carry internals the caller must not
            // branch on: log the detail, answer with one generic error.
            GradingError::NotFound(message) => {
                tracing::error!("Grading pipeline error: {}", message);
                ApiError::internal_generic()
            }
            GradingError::Persistence(source) => {
                tracing::error!("Grading pipeline error: {:#}", source);
                ApiError::internal_generic()
            }
            GradingError::Internal(source) => {
                tracing::error!("Grading pipeline error: {:#}", source);
                ApiError::internal_generic()
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::Unauthorized(message) => (StatusCode::UNAUTHORIZED, message),
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        (status, Json(message)).into_response()
    }
}
