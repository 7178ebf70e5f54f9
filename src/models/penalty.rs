use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum PenaltyStatus {
    Pending,
    Resolved,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Penalty {
    pub id: String,
    pub from_user_id: String,
    /// Recipient; `None` means a general penalty owed to no one in particular.
    pub to_user_id: Option<String>,
    pub amount: i64,
    pub reason: String,
    /// Calendar date the penalty covers, as `YYYY-MM-DD`.
    pub date: String,
    pub status: PenaltyStatus,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct NewPenalty {
    pub from_user_id: String,
    pub to_user_id: Option<String>,
    pub amount: i64,
    pub reason: String,
    pub date: String,
}
