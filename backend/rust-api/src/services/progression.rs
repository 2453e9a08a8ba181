use anyhow::Context;
use chrono::{DateTime, Utc};
use mongodb::bson::{doc, Document};
use mongodb::options::ReturnDocument;
use mongodb::{Collection, Database};

use crate::models::{GradeResult, ProgressRecord};
use crate::services::error::GradingError;
use crate::utils::retry::{retry_async_with_config, RetryConfig};
use crate::utils::time::chrono_to_bson;

/// Persistent per-user progression state: lifetime points on the `users`
/// aggregate plus one progress record per (user, lesson) pair, keyed
/// `{userId}_{lessonId}` so repeat submissions land on the same document.
///
/// Every write is a commutative increment or a merge-style upsert; the
/// ledger never reads current state to compute the next one, so concurrent
/// submissions interleave safely. Carried over from the source system:
/// re-submitting an already graded lesson re-adds the full earned amount to
/// lifetime points every time. The `attempts` counter makes re-grading
/// visible rather than hiding it.
pub struct ProgressionLedger {
    mongo: Database,
}

impl ProgressionLedger {
    pub fn new(mongo: Database) -> Self {
        Self { mongo }
    }

    /// Applies a grade: increments lifetime points and touches `lastSeenAt`,
    /// then upserts the per-lesson progress record. The two writes are each
    /// atomic but not transactional together; retries on ambiguous failures
    /// give at-least-once semantics.
    pub async fn apply_grade(
        &self,
        user_id: &str,
        lesson_id: &str,
        grade: &GradeResult,
    ) -> Result<ProgressRecord, GradingError> {
        let aggressive_cfg = RetryConfig::aggressive();

        let points_doc = user_points_update(grade.earned_points, Utc::now().timestamp_millis());
        retry_async_with_config(aggressive_cfg.clone(), || async {
            self.bump_user_points(user_id, &points_doc).await
        })
        .await
        .context("Failed to increment user points")
        .map_err(GradingError::Persistence)?;

        let progress_doc = progress_update(user_id, lesson_id, grade, Utc::now());
        let record = retry_async_with_config(aggressive_cfg, || async {
            self.upsert_progress(user_id, lesson_id, &progress_doc).await
        })
        .await
        .context("Failed to upsert progress record")
        .map_err(GradingError::Persistence)?;

        tracing::info!(
            "Progress recorded: user={}, lesson={}, score={}, attempts={}",
            user_id,
            lesson_id,
            record.score,
            record.attempts
        );

        Ok(record)
    }

    async fn bump_user_points(&self, user_id: &str, update: &Document) -> anyhow::Result<()> {
        let collection: Collection<Document> = self.mongo.collection("users");
        collection
            .update_one(doc! { "_id": user_id }, update.clone())
            .upsert(true)
            .await?;
        Ok(())
    }

    async fn upsert_progress(
        &self,
        user_id: &str,
        lesson_id: &str,
        update: &Document,
    ) -> anyhow::Result<ProgressRecord> {
        let collection: Collection<ProgressRecord> = self.mongo.collection("progress");
        let key = ProgressRecord::key(user_id, lesson_id);

        collection
            .find_one_and_update(doc! { "_id": &key }, update.clone())
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await?
            .ok_or_else(|| anyhow::anyhow!("progress upsert for {} returned no document", key))
    }
}

/// Update for the `users` aggregate: one commutative `$inc` on lifetime
/// points plus a `lastSeenAt` touch. Streak fields on the same document are
/// owned by an upstream job, so this must stay a partial update and never a
/// replace.
fn user_points_update(earned_points: i32, seen_at_millis: i64) -> Document {
    doc! {
        "$inc": { "points": earned_points as i64 },
        "$set": { "lastSeenAt": seen_at_millis },
    }
}

/// Update for a progress upsert: the latest attempt wins on the graded
/// fields, `attempts` grows through `$inc`, and the key fields land once on
/// insert.
fn progress_update(
    user_id: &str,
    lesson_id: &str,
    grade: &GradeResult,
    now: DateTime<Utc>,
) -> Document {
    doc! {
        "$set": {
            "completed": true,
            "score": grade.score_percent(),
            "xpEarned": grade.earned_points,
            "updatedAt": chrono_to_bson(now),
        },
        "$inc": { "attempts": 1 },
        "$setOnInsert": {
            "userId": user_id,
            "lessonId": lesson_id,
        },
    }
}
