use serde::{Deserialize, Serialize};

use super::UserAggregate;

/// Reply of `GET /api/v1/user-profile`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: String,
    pub total_xp: i64,
    pub completed_lessons: Vec<String>,
    pub current_streak: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_activity_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl UserProfile {
    /// A caller who has never submitted an assessment has no aggregate
    /// document yet; their profile reads as all zeroes.
    pub fn from_aggregate(
        user_id: &str,
        aggregate: Option<UserAggregate>,
        completed_lessons: Vec<String>,
    ) -> Self {
        match aggregate {
            Some(user) => Self {
                user_id: user_id.to_string(),
                total_xp: user.points,
                completed_lessons,
                current_streak: user.current_streak,
                last_activity_date: user.last_activity_date,
                name: user.name,
            },
            None => Self {
                user_id: user_id.to_string(),
                total_xp: 0,
                completed_lessons,
                current_streak: 0,
                last_activity_date: None,
                name: None,
            },
        }
    }
}

/// One leaderboard row; `xp` mirrors the aggregate's lifetime points.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardRow {
    pub rank: u32,
    pub uid: String,
    pub xp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}
