use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Process-wide singleton, created with defaults on first read.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Settings {
    pub id: i64,
    /// Charged per missed task when a date is reconciled.
    pub penalty_amount: i64,
    pub points_per_task: i64,
    pub points_per_missed: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateSettingsRequest {
    pub penalty_amount: Option<i64>,
    pub points_per_task: Option<i64>,
    pub points_per_missed: Option<i64>,
}
