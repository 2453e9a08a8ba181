use mongodb::Database;
use redis::aio::ConnectionManager;

use crate::metrics::{ASSESSMENTS_GRADED_TOTAL, XP_AWARDED_TOTAL};
use crate::models::assessment::{
    canonicalize_answers, AssessmentResponse, GradeQuizRequest, GradeSummary,
    SubmitAssessmentRequest,
};
use crate::models::Question;
use crate::services::error::GradingError;
use crate::services::grading;
use crate::services::progression::ProgressionLedger;
use crate::services::question_bank::QuestionBank;
use crate::services::remediation::RemediationSelector;

const UNKNOWN_LESSON: &str = "unknown_lesson";

/// The externally callable grading pipeline: resolve questions, score, apply
/// the ledger, decide the outcome. Handlers construct one per request from
/// `AppState` clones.
pub struct AssessmentService {
    bank: QuestionBank,
    ledger: ProgressionLedger,
    remediation: RemediationSelector,
}

impl AssessmentService {
    pub fn new(mongo: Database, redis: ConnectionManager, content_api_url: String) -> Self {
        Self {
            bank: QuestionBank::new(mongo.clone()),
            ledger: ProgressionLedger::new(mongo),
            remediation: RemediationSelector::new(redis, content_api_url),
        }
    }

    /// Minimal grading call: accepts a stored quiz id or an inline quiz and
    /// returns earned/total once the ledger write has landed.
    pub async fn grade_quiz(
        &self,
        user_id: &str,
        req: &GradeQuizRequest,
    ) -> Result<GradeSummary, GradingError> {
        if user_id.is_empty() {
            return Err(GradingError::Unauthenticated);
        }

        let source = req
            .quiz_source()
            .ok_or_else(|| GradingError::invalid_request("either quizId or quiz is required"))?;

        let resolved = self.bank.resolve(source).await?;
        let answers = canonicalize_answers(&resolved.questions, &req.answers)
            .map_err(GradingError::InvalidRequest)?;

        let grade = grading::grade(&resolved.questions, &answers);
        let scope = lesson_scope(resolved.lesson_id, req.lesson_id.clone());

        self.ledger.apply_grade(user_id, &scope, &grade).await?;

        XP_AWARDED_TOTAL.inc_by(grade.earned_points.max(0) as u64);
        tracing::info!(
            "Quiz graded: user={}, lesson={}, earned={}, total={}",
            user_id,
            scope,
            grade.earned_points,
            grade.total_points
        );

        Ok(GradeSummary {
            earned: grade.earned_points,
            total: grade.total_points,
        })
    }

    /// Rich submission call: grades a lesson's attached assessment and
    /// decides advancement or remediation.
    pub async fn submit_assessment(
        &self,
        user_id: &str,
        lesson_id: &str,
        req: &SubmitAssessmentRequest,
    ) -> Result<AssessmentResponse, GradingError> {
        if user_id.is_empty() {
            return Err(GradingError::Unauthenticated);
        }

        let lesson = self.bank.lesson(lesson_id).await?;
        let questions: Vec<Question> = lesson
            .assessment
            .questions
            .iter()
            .cloned()
            .map(|question| question.into_question())
            .collect();

        let answers = canonicalize_answers(&questions, &req.answers)
            .map_err(GradingError::InvalidRequest)?;

        let grade = grading::grade(&questions, &answers);
        self.ledger.apply_grade(user_id, lesson_id, &grade).await?;

        let outcome = self.remediation.decide_outcome(&grade, &lesson).await;

        ASSESSMENTS_GRADED_TOTAL
            .with_label_values(&[outcome.status.as_str()])
            .inc();
        XP_AWARDED_TOTAL.inc_by(grade.earned_points.max(0) as u64);
        tracing::info!(
            "Assessment graded: user={}, lesson={}, score={}, status={}",
            user_id,
            lesson_id,
            outcome.score,
            outcome.status.as_str()
        );

        Ok(outcome)
    }
}

/// Progress scope of the minimal call: the quiz's own lesson pointer, else
/// the request's, else the sentinel that keeps unscoped grades countable.
fn lesson_scope(quiz_scope: Option<String>, request_scope: Option<String>) -> String {
    quiz_scope
        .or(request_scope)
        .unwrap_or_else(|| UNKNOWN_LESSON.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiz_scope_wins_over_request_scope() {
        let scope = lesson_scope(Some("l-quiz".to_string()), Some("l-req".to_string()));
        assert_eq!(scope, "l-quiz");
    }

    #[test]
    fn request_scope_fills_in_when_quiz_has_none() {
        let scope = lesson_scope(None, Some("l-req".to_string()));
        assert_eq!(scope, "l-req");
    }

    #[test]
    fn unscoped_grades_fall_back_to_the_sentinel() {
        assert_eq!(lesson_scope(None, None), "unknown_lesson");
    }
}
