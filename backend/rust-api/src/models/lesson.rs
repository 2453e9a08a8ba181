use serde::{Deserialize, Serialize};

use super::assessment::QuizQuestionPayload;
use super::QuestionOption;

fn default_difficulty() -> String {
    "easy".to_string()
}

fn default_passing_score() -> i32 {
    70
}

/// One block of instructional content inside a lesson. Authored shape; the
/// optional quiz fields are only present on `type: "quiz"` blocks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub kind: ContentBlockKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiz_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<QuestionOption>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "correctOptionId")]
    pub correct_answer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentBlockKind {
    Paragraph,
    Image,
    Quiz,
    Info,
    Scenario,
}

impl ContentBlock {
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self {
            kind: ContentBlockKind::Paragraph,
            text: Some(text.into()),
            url: None,
            question_text: None,
            quiz_type: None,
            options: Vec::new(),
            correct_answer_id: None,
            explanation: None,
        }
    }
}

/// Assessment attached to a lesson: passing threshold plus authored
/// questions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentDefinition {
    #[serde(default = "default_passing_score")]
    pub passing_score: i32,
    #[serde(default)]
    pub questions: Vec<QuizQuestionPayload>,
}

impl Default for AssessmentDefinition {
    fn default() -> Self {
        Self {
            passing_score: default_passing_score(),
            questions: Vec::new(),
        }
    }
}

/// Lesson document in the "lessons" collection. Read-only from the grading
/// core's perspective.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub topic_id: String,
    pub title: String,
    #[serde(default)]
    pub xp: i32,
    #[serde(default = "default_difficulty")]
    pub difficulty: String,
    #[serde(default)]
    pub estimated_minutes: i32,
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub assessment: AssessmentDefinition,
    /// Successor pointer; absent on the last lesson of a sequence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_lesson_id: Option<String>,
}

/// Projection served by `GET /api/v1/lessons/{topicId}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonSummary {
    pub id: String,
    pub title: String,
    pub xp: i32,
    pub difficulty: String,
    pub estimated_minutes: i32,
    pub order: i32,
}

impl From<LessonDocument> for LessonSummary {
    fn from(lesson: LessonDocument) -> Self {
        Self {
            id: lesson.id,
            title: lesson.title,
            xp: lesson.xp,
            difficulty: lesson.difficulty,
            estimated_minutes: lesson.estimated_minutes,
            order: lesson.order,
        }
    }
}

/// Full lesson as served by `GET /api/v1/lesson/{id}`. The assessment goes
/// out answer keys and all; the client highlights correct options after a
/// submission.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonView {
    pub id: String,
    pub title: String,
    pub xp: i32,
    pub difficulty: String,
    pub estimated_minutes: i32,
    pub content: Vec<ContentBlock>,
    pub assessment: AssessmentDefinition,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_lesson_id: Option<String>,
}

impl From<LessonDocument> for LessonView {
    fn from(lesson: LessonDocument) -> Self {
        Self {
            id: lesson.id,
            title: lesson.title,
            xp: lesson.xp,
            difficulty: lesson.difficulty,
            estimated_minutes: lesson.estimated_minutes,
            content: lesson.content,
            assessment: lesson.assessment,
            next_lesson_id: lesson.next_lesson_id,
        }
    }
}

/// Topic document in the "topics" collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub sort_order: i32,
}

/// Topic as served by `GET /api/v1/topics`.
#[derive(Debug, Serialize)]
pub struct TopicView {
    pub id: String,
    pub name: String,
    pub description: String,
}

impl From<TopicRecord> for TopicView {
    fn from(topic: TopicRecord) -> Self {
        Self {
            id: topic.id,
            name: topic.name,
            description: topic.description,
        }
    }
}

/// Standalone quiz document in the "quizzes" collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lesson_id: Option<String>,
    #[serde(default)]
    pub questions: Vec<QuizQuestionPayload>,
}
