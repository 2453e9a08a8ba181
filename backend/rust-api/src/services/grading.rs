use std::collections::HashSet;

use crate::models::{AnswerSubmission, GradeResult, Question};

/// Scores a submission against a resolved question set.
///
/// Every question contributes its point value to the attainable total,
/// answered or not. An answer earns a question's points only when its
/// selection matches the answer key exactly. Answers referencing unknown
/// question ids are skipped as stale client state. When the same question
/// appears more than once in a submission, the first occurrence wins and
/// later ones are ignored, so duplicated payloads cannot inflate a score.
pub fn grade(questions: &[Question], answers: &[AnswerSubmission]) -> GradeResult {
    let total_points = questions.iter().map(|q| q.point_value).sum();

    let mut earned_points = 0;
    let mut graded: HashSet<&str> = HashSet::with_capacity(answers.len());

    for answer in answers {
        let Some(question) = questions.iter().find(|q| q.id == answer.question_id) else {
            continue;
        };
        if !graded.insert(question.id.as_str()) {
            continue;
        }
        if question.correct_option_id.as_deref() == Some(answer.selected_option_id.as_str()) {
            earned_points += question.point_value;
        }
    }

    GradeResult {
        earned_points,
        total_points,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: &str, correct: Option<&str>, points: i32) -> Question {
        Question {
            id: id.to_string(),
            text: format!("Question {id}"),
            options: Vec::new(),
            correct_option_id: correct.map(str::to_string),
            point_value: points,
        }
    }

    fn answer(question_id: &str, selected: &str) -> AnswerSubmission {
        AnswerSubmission {
            question_id: question_id.to_string(),
            selected_option_id: selected.to_string(),
        }
    }

    #[test]
    fn sums_points_of_correct_answers_only() {
        let questions = vec![
            question("q1", Some("a"), 10),
            question("q2", Some("b"), 10),
            question("q3", Some("c"), 20),
        ];
        let answers = vec![answer("q1", "a"), answer("q2", "x"), answer("q3", "c")];

        let result = grade(&questions, &answers);

        assert_eq!(result.earned_points, 30);
        assert_eq!(result.total_points, 40);
        assert_eq!(result.score_percent(), 75);
    }

    #[test]
    fn unanswered_questions_still_count_toward_total() {
        let questions = vec![question("q1", Some("a"), 10), question("q2", Some("b"), 30)];
        let answers = vec![answer("q1", "a")];

        let result = grade(&questions, &answers);

        assert_eq!(result.earned_points, 10);
        assert_eq!(result.total_points, 40);
        assert_eq!(result.score_percent(), 25);
    }

    #[test]
    fn answers_for_unknown_questions_are_ignored() {
        let questions = vec![question("q1", Some("a"), 10)];
        let answers = vec![answer("ghost", "a"), answer("q1", "a")];

        let result = grade(&questions, &answers);

        assert_eq!(result.earned_points, 10);
        assert_eq!(result.total_points, 10);
    }

    #[test]
    fn first_answer_wins_when_a_question_is_repeated() {
        let questions = vec![question("q1", Some("a"), 10), question("q2", Some("b"), 10)];

        let wrong_then_right = vec![answer("q1", "x"), answer("q1", "a"), answer("q2", "b")];
        let right_then_wrong = vec![answer("q1", "a"), answer("q1", "x"), answer("q2", "b")];

        assert_eq!(grade(&questions, &wrong_then_right).earned_points, 10);
        assert_eq!(grade(&questions, &right_then_wrong).earned_points, 20);
    }

    #[test]
    fn duplicate_correct_answers_do_not_double_count() {
        let questions = vec![question("q1", Some("a"), 10)];
        let answers = vec![answer("q1", "a"), answer("q1", "a"), answer("q1", "a")];

        let result = grade(&questions, &answers);

        assert_eq!(result.earned_points, 10);
        assert_eq!(result.total_points, 10);
    }

    #[test]
    fn question_without_answer_key_is_never_correct() {
        let questions = vec![question("q1", None, 10), question("q2", Some("b"), 10)];
        let answers = vec![answer("q1", "a"), answer("q2", "b")];

        let result = grade(&questions, &answers);

        assert_eq!(result.earned_points, 10);
        assert_eq!(result.total_points, 20);
    }

    #[test]
    fn empty_question_set_grades_to_zero() {
        let result = grade(&[], &[answer("q1", "a")]);

        assert_eq!(result.earned_points, 0);
        assert_eq!(result.total_points, 0);
        assert_eq!(result.score_percent(), 0);
    }
}
