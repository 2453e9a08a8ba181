use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::time::bson_datetime_as_chrono;

/// Point value a question is worth when the author left it unset (or set it
/// to the falsy 0, which authored content treats the same way).
pub const DEFAULT_QUESTION_POINTS: i32 = 10;

/// Canonical graded question, produced by boundary canonicalization from the
/// authored dialects (see `models::assessment`). Owned by the content store;
/// grading only reads it.
#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    pub id: String,
    pub text: String,
    pub options: Vec<QuestionOption>,
    /// `None` when the author omitted the answer key entirely. Such a
    /// question can never be answered correctly but still counts toward the
    /// attainable total.
    pub correct_option_id: Option<String>,
    pub point_value: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionOption {
    pub id: String,
    pub text: String,
}

/// One caller-selected option for one question, already canonicalized to
/// option-id form.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerSubmission {
    pub question_id: String,
    pub selected_option_id: String,
}

/// Outcome of grading one submission. Derived, never persisted verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradeResult {
    pub earned_points: i32,
    pub total_points: i32,
}

impl GradeResult {
    /// Rounded percentage; an empty question set scores 0 rather than
    /// dividing by zero.
    pub fn score_percent(&self) -> i32 {
        if self.total_points == 0 {
            return 0;
        }
        ((self.earned_points as f64 / self.total_points as f64) * 100.0).round() as i32
    }
}

/// Per-user, per-lesson outcome of the most recent assessment attempt.
/// Keyed by `{userId}_{lessonId}` so repeat submissions land on the same
/// document. Stored in the "progress" collection, owned by the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub lesson_id: String,
    pub completed: bool,
    pub score: i32,
    pub xp_earned: i32,
    pub attempts: i32,
    #[serde(with = "bson_datetime_as_chrono")]
    pub updated_at: DateTime<Utc>,
}

impl ProgressRecord {
    pub fn key(user_id: &str, lesson_id: &str) -> String {
        format!("{}_{}", user_id, lesson_id)
    }
}

/// Per-user aggregate stored in the "users" collection, keyed by the auth
/// provider's stable identifier. `points` is only ever moved by commutative
/// increments; streak fields belong to an upstream job and survive ledger
/// writes because every write is a merge, never a replace.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAggregate {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub points: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub current_streak: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_activity_date: Option<String>,
    /// Epoch millis of the latest graded submission.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_seen_at: Option<i64>,
}

pub mod assessment;
pub mod lesson;
pub mod user;
