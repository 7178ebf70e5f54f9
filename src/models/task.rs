use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Sentinel stored in `proof` while an upload is still in flight. Tasks
/// carrying it do not count as having proof.
pub const PROOF_UPLOADING: &str = "uploading...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Completed,
    Missed,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    /// Calendar date the task is due, as `YYYY-MM-DD`. Never a timestamp.
    pub date: String,
    /// Optional time of day, as `HH:MM`.
    pub time: Option<String>,
    pub status: TaskStatus,
    pub icon: Option<String>,
    pub proof: Option<String>,
    /// RFC3339 timestamp set when the task flips to completed.
    pub completed_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Task {
    pub fn has_proof(&self) -> bool {
        matches!(&self.proof, Some(p) if p != PROOF_UPLOADING)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTaskRequest {
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub date: String,
    pub time: Option<String>,
    pub icon: Option<String>,
}

/// Optional fields are `Some(None)` to clear, `Some(Some(_))` to replace,
/// absent to leave untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub date: Option<String>,
    #[serde(default, with = "double_option", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(default, with = "double_option", skip_serializing_if = "Option::is_none")]
    pub time: Option<Option<String>>,
    pub status: Option<TaskStatus>,
    #[serde(default, with = "double_option", skip_serializing_if = "Option::is_none")]
    pub icon: Option<Option<String>>,
    #[serde(default, with = "double_option", skip_serializing_if = "Option::is_none")]
    pub proof: Option<Option<String>>,
}

mod double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<Option<String>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        value.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Option<String>>, D::Error> {
        Option::<String>::deserialize(deserializer).map(Some)
    }
}
