use anyhow::{Context, Result};
use futures::TryStreamExt;
use mongodb::{bson::doc, Collection, Database};
use redis::aio::ConnectionManager;

use crate::metrics::{record_cache_hit, record_cache_miss};
use crate::models::user::{LeaderboardRow, UserProfile};
use crate::models::{ProgressRecord, UserAggregate};

const LEADERBOARD_CACHE_KEY: &str = "leaderboard:top";
const LEADERBOARD_CACHE_TTL: u64 = 60; // seconds
const LEADERBOARD_SIZE: i64 = 50;

pub struct ProfileService {
    mongo: Database,
    redis: ConnectionManager,
}

impl ProfileService {
    pub fn new(mongo: Database, redis: ConnectionManager) -> Self {
        Self { mongo, redis }
    }

    /// Top users by lifetime points, dense-ranked so tied scores share a
    /// rank. Served through a short-lived cache; a cache failure only costs
    /// an extra query.
    pub async fn leaderboard(&self) -> Result<Vec<LeaderboardRow>> {
        if let Ok(cached) = self.cached_leaderboard().await {
            record_cache_hit();
            return Ok(cached);
        }
        record_cache_miss();

        let collection: Collection<UserAggregate> = self.mongo.collection("users");
        let users: Vec<UserAggregate> = collection
            .find(doc! {})
            .sort(doc! { "points": -1 })
            .limit(LEADERBOARD_SIZE)
            .await
            .context("Failed to query leaderboard")?
            .try_collect()
            .await
            .context("Failed to read leaderboard cursor")?;

        let rows = rank_users(users);
        self.cache_leaderboard(&rows).await.ok();

        Ok(rows)
    }

    /// Aggregate profile for one user: lifetime totals plus the ids of the
    /// lessons completed so far. A user with no aggregate document yet reads
    /// as all zeroes.
    pub async fn user_profile(&self, user_id: &str) -> Result<UserProfile> {
        let users: Collection<UserAggregate> = self.mongo.collection("users");
        let aggregate = users
            .find_one(doc! { "_id": user_id })
            .await
            .context("Failed to load user aggregate")?;

        let progress: Collection<ProgressRecord> = self.mongo.collection("progress");
        let mut cursor = progress
            .find(doc! { "userId": user_id, "completed": true })
            .await
            .context("Failed to query progress records")?;

        let mut completed_lessons = Vec::new();
        while let Some(record) = cursor
            .try_next()
            .await
            .context("Failed to read progress cursor")?
        {
            completed_lessons.push(record.lesson_id);
        }

        Ok(UserProfile::from_aggregate(
            user_id,
            aggregate,
            completed_lessons,
        ))
    }

    async fn cached_leaderboard(&self) -> Result<Vec<LeaderboardRow>> {
        let mut conn = self.redis.clone();
        let raw: String = redis::cmd("GET")
            .arg(LEADERBOARD_CACHE_KEY)
            .query_async(&mut conn)
            .await
            .context("Leaderboard not in cache")?;

        serde_json::from_str(&raw).context("Cached leaderboard is not valid JSON")
    }

    async fn cache_leaderboard(&self, rows: &[LeaderboardRow]) -> Result<()> {
        let mut conn = self.redis.clone();
        let payload = serde_json::to_string(rows)?;

        let _: () = redis::cmd("SETEX")
            .arg(LEADERBOARD_CACHE_KEY)
            .arg(LEADERBOARD_CACHE_TTL)
            .arg(payload)
            .query_async(&mut conn)
            .await
            .context("Failed to cache leaderboard")?;

        Ok(())
    }
}

/// Dense ranking: points 100, 90, 90, 80 rank as 1, 2, 2, 3.
fn rank_users(users: Vec<UserAggregate>) -> Vec<LeaderboardRow> {
    let mut rows = Vec::with_capacity(users.len());
    let mut rank = 0u32;
    let mut last_points = None;

    for user in users {
        if last_points != Some(user.points) {
            rank += 1;
            last_points = Some(user.points);
        }
        rows.push(LeaderboardRow {
            rank,
            uid: user.id,
            xp: user.points,
            name: user.name,
        });
    }

    rows
}
