pub mod achievement;
pub mod penalty;
pub mod settings;
pub mod task;
pub mod user;

pub use achievement::{AchievementUnlock, NewUnlock};
pub use penalty::{NewPenalty, Penalty, PenaltyStatus};
pub use settings::{Settings, UpdateSettingsRequest};
pub use task::{NewTaskRequest, Task, TaskStatus, UpdateTaskRequest, PROOF_UPLOADING};
pub use user::{NewUserRequest, User};
