use anyhow::{Context, Result};
use redis::aio::ConnectionManager;

use crate::metrics::{record_cache_hit, record_cache_miss, REMEDIAL_CONTENT_TOTAL};
use crate::models::assessment::{AssessmentResponse, AssessmentStatus, RemedialLesson};
use crate::models::lesson::{ContentBlock, ContentBlockKind, LessonDocument};
use crate::models::GradeResult;

const CACHE_TTL: u64 = 300; // 5 minutes

/// Pass iff the rounded percentage meets the lesson threshold.
pub fn passed(grade: &GradeResult, passing_score: i32) -> bool {
    grade.score_percent() >= passing_score
}

pub struct RemediationSelector {
    redis: ConnectionManager,
    content_api_url: String,
}

impl RemediationSelector {
    pub fn new(redis: ConnectionManager, content_api_url: String) -> Self {
        Self {
            redis,
            content_api_url,
        }
    }

    /// Turns a grade into the client-facing outcome. Passing resolves the
    /// lesson's successor pointer (absent means the curriculum is complete,
    /// not an error); failing attaches a remedial package resolved through
    /// cache, then the content generator, then a static package built from
    /// the lesson itself.
    pub async fn decide_outcome(
        &self,
        grade: &GradeResult,
        lesson: &LessonDocument,
    ) -> AssessmentResponse {
        let score = grade.score_percent();

        if passed(grade, lesson.assessment.passing_score) {
            return AssessmentResponse {
                status: AssessmentStatus::Passed,
                score,
                xp_earned: grade.earned_points,
                next_lesson_id: lesson.next_lesson_id.clone(),
                remedial_lesson: None,
            };
        }

        let remedial = self.remedial_lesson(lesson, score).await;
        AssessmentResponse {
            status: AssessmentStatus::RequiresReview,
            score,
            xp_earned: grade.earned_points,
            next_lesson_id: None,
            remedial_lesson: Some(remedial),
        }
    }

    // Cache -> generator API -> static fallback; never fails the response.
    async fn remedial_lesson(&self, lesson: &LessonDocument, score: i32) -> RemedialLesson {
        if let Ok(cached) = self.get_cached(&lesson.id).await {
            record_cache_hit();
            REMEDIAL_CONTENT_TOTAL.with_label_values(&["cache"]).inc();
            tracing::debug!("Remedial content found in cache for lesson={}", lesson.id);
            return cached;
        }
        record_cache_miss();

        match self.fetch_from_generator(lesson, score).await {
            Ok(remedial) => {
                self.cache_remedial(&lesson.id, &remedial).await.ok();
                REMEDIAL_CONTENT_TOTAL
                    .with_label_values(&["generator"])
                    .inc();
                tracing::debug!(
                    "Remedial content fetched from generator for lesson={}",
                    lesson.id
                );
                remedial
            }
            Err(e) => {
                tracing::warn!("Content generator failed for lesson={}: {}", lesson.id, e);
                REMEDIAL_CONTENT_TOTAL
                    .with_label_values(&["fallback"])
                    .inc();
                fallback_package(lesson)
            }
        }
    }

    async fn get_cached(&self, lesson_id: &str) -> Result<RemedialLesson> {
        let mut conn = self.redis.clone();
        let cache_key = format!("remedial:cache:{}", lesson_id);

        let raw: String = redis::cmd("GET")
            .arg(&cache_key)
            .query_async(&mut conn)
            .await
            .context("Remedial content not in cache")?;

        serde_json::from_str(&raw).context("Cached remedial content is not valid JSON")
    }

    async fn fetch_from_generator(
        &self,
        lesson: &LessonDocument,
        score: i32,
    ) -> Result<RemedialLesson> {
        let url = format!("{}/v1/remedial", self.content_api_url);

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(2))
            .build()?;

        let body = serde_json::json!({
            "lessonId": lesson.id,
            "title": lesson.title,
            "score": score,
        });

        let response = client
            .post(&url)
            .json(&body)
            .send()
            .await
            .context("Failed to call content generator")?;

        if !response.status().is_success() {
            anyhow::bail!("Content generator returned status: {}", response.status());
        }

        let remedial: RemedialLesson = response
            .json()
            .await
            .context("Invalid content generator response")?;

        Ok(remedial)
    }

    async fn cache_remedial(&self, lesson_id: &str, remedial: &RemedialLesson) -> Result<()> {
        let mut conn = self.redis.clone();
        let cache_key = format!("remedial:cache:{}", lesson_id);
        let payload = serde_json::to_string(remedial)?;

        let _: () = redis::cmd("SETEX")
            .arg(&cache_key)
            .arg(CACHE_TTL)
            .arg(payload)
            .query_async(&mut conn)
            .await
            .context("Failed to cache remedial content")?;

        Ok(())
    }
}

/// Static remedial package built from the lesson's own prose, used when both
/// the cache and the generator come up empty.
fn fallback_package(lesson: &LessonDocument) -> RemedialLesson {
    let mut content = vec![ContentBlock::paragraph(format!(
        "Let's review \"{}\" once more before retrying the assessment.",
        lesson.title
    ))];
    content.extend(
        lesson
            .content
            .iter()
            .filter(|block| block.kind == ContentBlockKind::Paragraph)
            .take(3)
            .cloned(),
    );

    RemedialLesson {
        title: format!("Quick practice: {}", lesson.title),
        estimated_minutes: 5,
        difficulty: "easy".to_string(),
        content,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::lesson::AssessmentDefinition;

    fn lesson_fixture() -> LessonDocument {
        LessonDocument {
            id: "lesson-1".to_string(),
            topic_id: "topic-1".to_string(),
            title: "Emergency fund".to_string(),
            xp: 40,
            difficulty: "medium".to_string(),
            estimated_minutes: 12,
            order: 1,
            content: vec![
                ContentBlock::paragraph("Save three months of expenses."),
                ContentBlock {
                    kind: ContentBlockKind::Quiz,
                    ..ContentBlock::paragraph("")
                },
                ContentBlock::paragraph("Keep the fund in an accessible account."),
            ],
            assessment: AssessmentDefinition::default(),
            next_lesson_id: Some("lesson-2".to_string()),
        }
    }

    #[test]
    fn passing_threshold_is_inclusive() {
        let at_threshold = GradeResult {
            earned_points: 70,
            total_points: 100,
        };
        let below = GradeResult {
            earned_points: 69,
            total_points: 100,
        };

        assert!(passed(&at_threshold, 70));
        assert!(!passed(&below, 70));
    }

    #[test]
    fn rounding_happens_before_the_threshold_check() {
        let grade = GradeResult {
            earned_points: 695,
            total_points: 1000,
        };

        assert_eq!(grade.score_percent(), 70);
        assert!(passed(&grade, 70));
    }

    #[test]
    fn fallback_package_reuses_the_lesson_prose() {
        let remedial = fallback_package(&lesson_fixture());

        assert_eq!(remedial.title, "Quick practice: Emergency fund");
        assert_eq!(remedial.difficulty, "easy");
        assert_eq!(remedial.estimated_minutes, 5);
        // intro + the two paragraph blocks; the quiz block stays out
        assert_eq!(remedial.content.len(), 3);
        assert!(remedial
            .content
            .iter()
            .all(|block| block.kind == ContentBlockKind::Paragraph));
    }
}
