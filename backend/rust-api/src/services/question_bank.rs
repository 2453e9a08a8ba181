use anyhow::Context;
use mongodb::{bson::doc, Collection, Database};

use crate::models::assessment::{QuizQuestionPayload, QuizSource};
use crate::models::lesson::{LessonDocument, QuizDocument};
use crate::models::Question;
use crate::services::error::GradingError;

/// Read-side accessor for stored quiz and lesson definitions.
pub struct QuestionBank {
    mongo: Database,
}

/// A resolved question set plus the lesson it is scoped to, when known.
pub struct ResolvedQuiz {
    pub questions: Vec<Question>,
    pub lesson_id: Option<String>,
}

impl QuestionBank {
    pub fn new(mongo: Database) -> Self {
        Self { mongo }
    }

    /// Resolves a quiz reference into canonical questions. Stored quizzes
    /// come from the `quizzes` collection; inline definitions are
    /// canonicalized as submitted. A stored id that matches nothing is a
    /// `NotFound`.
    pub async fn resolve(&self, source: QuizSource) -> Result<ResolvedQuiz, GradingError> {
        match source {
            QuizSource::ById(quiz_id) => {
                let collection: Collection<QuizDocument> = self.mongo.collection("quizzes");
                let stored = collection
                    .find_one(doc! { "_id": &quiz_id })
                    .await
                    .context("Failed to load quiz definition")
                    .map_err(GradingError::Persistence)?
                    .ok_or_else(|| {
                        GradingError::not_found(format!("quiz {} not found", quiz_id))
                    })?;

                Ok(ResolvedQuiz {
                    questions: canonicalize(stored.questions),
                    lesson_id: stored.lesson_id,
                })
            }
            QuizSource::Inline(definition) => Ok(ResolvedQuiz {
                questions: canonicalize(definition.questions),
                lesson_id: definition.lesson_id,
            }),
        }
    }

    /// Loads a lesson document for the submission pipeline. Missing lessons
    /// are reported as `NotFound`; the caller decides how much of that
    /// reaches the client.
    pub async fn lesson(&self, lesson_id: &str) -> Result<LessonDocument, GradingError> {
        let collection: Collection<LessonDocument> = self.mongo.collection("lessons");
        collection
            .find_one(doc! { "_id": lesson_id })
            .await
            .context("Failed to load lesson")
            .map_err(GradingError::Persistence)?
            .ok_or_else(|| GradingError::not_found(format!("lesson {} not found", lesson_id)))
    }
}

fn canonicalize(questions: Vec<QuizQuestionPayload>) -> Vec<Question> {
    questions
        .into_iter()
        .map(QuizQuestionPayload::into_question)
        .collect()
}
