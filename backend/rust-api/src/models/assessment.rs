use serde::{Deserialize, Serialize};
use validator::Validate;

use super::lesson::ContentBlock;
use super::{AnswerSubmission, Question, QuestionOption, DEFAULT_QUESTION_POINTS};

/// Authored question as it appears in stored quizzes, lesson assessments and
/// inline grading payloads. Two authored dialects exist: id-keyed
/// (`options` + `correctAnswerId`) and index-keyed (`answerIndex`, options
/// optional). Both canonicalize into [`Question`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestionPayload {
    pub id: String,
    #[serde(default, alias = "text", skip_serializing_if = "Option::is_none")]
    pub question_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiz_type: Option<String>,
    #[serde(default)]
    pub options: Vec<QuestionOption>,
    #[serde(default, alias = "correctOptionId", skip_serializing_if = "Option::is_none")]
    pub correct_answer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer_index: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xp: Option<i32>,
}

impl QuizQuestionPayload {
    pub fn into_question(self) -> Question {
        let correct_option_id = match self.correct_answer_id {
            Some(option_id) => Some(option_id),
            None => self
                .answer_index
                .map(|index| option_id_for_index(&self.options, index)),
        };

        // Authored content coalesces a falsy xp to the default, so 0 counts
        // as unset here too.
        let point_value = match self.xp {
            Some(value) if value != 0 => value,
            _ => DEFAULT_QUESTION_POINTS,
        };

        Question {
            id: self.id,
            text: self.question_text.unwrap_or_default(),
            options: self.options,
            correct_option_id,
            point_value,
        }
    }
}

/// Resolve an index-keyed selector against a question's options. Questions
/// authored without options (the bare index dialect) resolve to the decimal
/// string of the index, which keeps index-vs-index comparison exact.
pub(crate) fn option_id_for_index(options: &[QuestionOption], index: i64) -> String {
    usize::try_from(index)
        .ok()
        .and_then(|i| options.get(i))
        .map(|option| option.id.clone())
        .unwrap_or_else(|| index.to_string())
}

/// Inline quiz payload; also the stored shape of documents in the "quizzes"
/// collection (minus the `_id`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lesson_id: Option<String>,
    #[serde(default)]
    pub questions: Vec<QuizQuestionPayload>,
}

/// Where the question set comes from. The boundary builds this, so "neither
/// provided" is unrepresentable past request validation.
#[derive(Debug, Clone)]
pub enum QuizSource {
    ById(String),
    Inline(QuizDefinition),
}

/// One submitted answer; the caller may select by option id or by index.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerPayload {
    pub question_id: String,
    #[serde(default)]
    pub selected_option_id: Option<String>,
    #[serde(default)]
    pub selected_index: Option<i64>,
}

/// Canonicalize submitted answers against the resolved question set. Index
/// selections resolve through the matching question's options; selections
/// for unknown question ids are kept as-is (grading ignores them). An answer
/// carrying no selection at all is malformed.
pub fn canonicalize_answers(
    questions: &[Question],
    answers: &[AnswerPayload],
) -> Result<Vec<AnswerSubmission>, String> {
    answers
        .iter()
        .map(|answer| {
            let selected_option_id = match (&answer.selected_option_id, answer.selected_index) {
                (Some(option_id), _) => option_id.clone(),
                (None, Some(index)) => {
                    let options = questions
                        .iter()
                        .find(|q| q.id == answer.question_id)
                        .map(|q| q.options.as_slice())
                        .unwrap_or(&[]);
                    option_id_for_index(options, index)
                }
                (None, None) => {
                    return Err(format!(
                        "answer for question {} has no selectedOptionId or selectedIndex",
                        answer.question_id
                    ));
                }
            };

            Ok(AnswerSubmission {
                question_id: answer.question_id.clone(),
                selected_option_id,
            })
        })
        .collect()
}

/// Request body of the minimal grading call.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GradeQuizRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 128))]
    pub quiz_id: Option<String>,
    #[serde(default)]
    pub quiz: Option<QuizDefinition>,
    #[validate(length(max = 200))]
    pub answers: Vec<AnswerPayload>,
    #[serde(default)]
    #[validate(length(min = 1, max = 128))]
    pub lesson_id: Option<String>,
}

impl GradeQuizRequest {
    /// Inline quiz wins when both forms are present; `None` means the
    /// request named no quiz at all.
    pub fn quiz_source(&self) -> Option<QuizSource> {
        if let Some(quiz) = &self.quiz {
            return Some(QuizSource::Inline(quiz.clone()));
        }
        self.quiz_id.clone().map(QuizSource::ById)
    }
}

/// Request body of `POST /api/v1/assessments/{lessonId}/submit`. This
/// surface requires at least one answer.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitAssessmentRequest {
    #[validate(length(min = 1, max = 200))]
    pub answers: Vec<AnswerPayload>,
}

/// Minimal grading reply.
#[derive(Debug, Serialize, Deserialize)]
pub struct GradeSummary {
    pub earned: i32,
    pub total: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentStatus {
    Passed,
    RequiresReview,
}

impl AssessmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::RequiresReview => "requires_review",
        }
    }
}

/// Remedial content package attached when an attempt misses the passing
/// score.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemedialLesson {
    pub title: String,
    pub estimated_minutes: i32,
    pub difficulty: String,
    #[serde(default)]
    pub content: Vec<ContentBlock>,
}

/// Rich reply of the assessment submission surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentResponse {
    pub status: AssessmentStatus,
    pub score: i32,
    pub xp_earned: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_lesson_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remedial_lesson: Option<RemedialLesson>,
}
