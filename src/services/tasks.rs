use chrono::Utc;
use sqlx::SqlitePool;

use crate::db::repository;
use crate::models::{Settings, Task, TaskStatus, UpdateTaskRequest};
use crate::services::streak::{self, STATS_HORIZON_DAYS};

/// Applies task updates and keeps the owner's points and cached streak in
/// line with the task's status.
pub struct TaskService {
    db: SqlitePool,
}

impl TaskService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Points follow the task's current status: entering completed or missed
    /// applies the configured value, leaving it takes the value back.
    /// Re-sending an unchanged status is a no-op, so a client retry or a
    /// repeated toggle never awards twice for the same task.
    pub async fn update_task(
        &self,
        id: &str,
        req: UpdateTaskRequest,
    ) -> Result<Option<Task>, sqlx::Error> {
        let prior = match repository::find_task_by_id(&self.db, id).await? {
            Some(task) => task,
            None => return Ok(None),
        };
        let task = match repository::update_task(&self.db, id, req).await? {
            Some(task) => task,
            None => return Ok(None),
        };

        if task.status != prior.status {
            let settings = repository::get_settings(&self.db).await?;
            let delta =
                status_points(&settings, task.status) - status_points(&settings, prior.status);
            let tasks = repository::fetch_tasks(&self.db).await?;
            let current = streak::current_streak(
                &task.user_id,
                &tasks,
                Utc::now().date_naive(),
                STATS_HORIZON_DAYS,
            );
            repository::update_user_progress(&self.db, &task.user_id, delta, current as i64)
                .await?;
        }

        Ok(Some(task))
    }
}

fn status_points(settings: &Settings, status: TaskStatus) -> i64 {
    match status {
        TaskStatus::Completed => settings.points_per_task,
        TaskStatus::Missed => settings.points_per_missed,
        TaskStatus::Pending => 0,
    }
}
