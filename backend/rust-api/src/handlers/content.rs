use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use futures::TryStreamExt;
use mongodb::bson::doc;
use std::sync::Arc;

use crate::{
    models::lesson::{LessonDocument, LessonSummary, LessonView, TopicRecord, TopicView},
    services::AppState,
};

/// `GET /api/v1/topics`
pub(crate) async fn list_topics(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<TopicView>>, ContentApiError> {
    let collection = state.mongo.collection::<TopicRecord>("topics");
    let topics: Vec<TopicRecord> = collection
        .find(doc! {})
        .sort(doc! { "sortOrder": 1 })
        .await
        .map_err(|err| ContentApiError::internal(format!("Failed to load topics: {}", err)))?
        .try_collect()
        .await
        .map_err(|err| ContentApiError::internal(format!("Failed to read topics: {}", err)))?;

    Ok(Json(topics.into_iter().map(TopicView::from).collect()))
}

/// `GET /api/v1/lessons/{topicId}` - lesson summaries in curriculum order
pub(crate) async fn list_lessons(
    State(state): State<Arc<AppState>>,
    Path(topic_id): Path<String>,
) -> Result<Json<Vec<LessonSummary>>, ContentApiError> {
    let collection = state.mongo.collection::<LessonDocument>("lessons");
    let lessons: Vec<LessonDocument> = collection
        .find(doc! { "topicId": &topic_id })
        .sort(doc! { "order": 1 })
        .await
        .map_err(|err| ContentApiError::internal(format!("Failed to load lessons: {}", err)))?
        .try_collect()
        .await
        .map_err(|err| ContentApiError::internal(format!("Failed to read lessons: {}", err)))?;

    Ok(Json(lessons.into_iter().map(LessonSummary::from).collect()))
}

/// `GET /api/v1/lesson/{id}` - the full lesson document
pub(crate) async fn get_lesson(
    State(state): State<Arc<AppState>>,
    Path(lesson_id): Path<String>,
) -> Result<Json<LessonView>, ContentApiError> {
    let collection = state.mongo.collection::<LessonDocument>("lessons");
    let lesson = collection
        .find_one(doc! { "_id": &lesson_id })
        .await
        .map_err(|err| ContentApiError::internal(format!("Failed to load lesson: {}", err)))?
        .ok_or_else(|| ContentApiError::not_found("Lesson not found"))?;

    Ok(Json(LessonView::from(lesson)))
}

#[derive(Debug)]
pub(crate) enum ContentApiError {
    NotFound(String),
    Internal(String),
}

impl ContentApiError {
    fn not_found(message: impl Into<String>) -> Self {
        ContentApiError::NotFound(message.into())
    }

    fn internal(message: impl Into<String>) -> Self {
        ContentApiError::Internal(message.into())
    }
}

impl IntoResponse for ContentApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ContentApiError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            ContentApiError::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        (status, Json(message)).into_response()
    }
}
