use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A per-user unlock record. Title, description, icon and points are copied
/// from the catalog at unlock time so later catalog edits never rewrite
/// history.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AchievementUnlock {
    pub id: String,
    pub user_id: String,
    pub achievement_id: String,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub points: i64,
    pub unlocked_at: String,
}

#[derive(Debug, Clone)]
pub struct NewUnlock {
    pub user_id: String,
    pub achievement_id: String,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub points: i64,
}
