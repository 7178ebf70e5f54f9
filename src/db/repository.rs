use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::{
    AchievementUnlock, NewPenalty, NewTaskRequest, NewUnlock, NewUserRequest, Penalty, Settings,
    Task, TaskStatus, UpdateSettingsRequest, UpdateTaskRequest, User,
};

// Users

pub async fn fetch_users(db: &SqlitePool) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT id, name, avatar, points, streak, created_at FROM users ORDER BY created_at ASC",
    )
    .fetch_all(db)
    .await
}

pub async fn find_user_by_id(db: &SqlitePool, id: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT id, name, avatar, points, streak, created_at FROM users WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn insert_user(db: &SqlitePool, req: NewUserRequest) -> Result<User, sqlx::Error> {
    let user = User {
        id: Uuid::new_v4().to_string(),
        name: req.name,
        avatar: req.avatar.unwrap_or_else(|| "🙂".to_string()),
        points: 0,
        streak: 0,
        created_at: Utc::now().to_rfc3339(),
    };

    sqlx::query(
        "INSERT INTO users (id, name, avatar, points, streak, created_at) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&user.id)
    .bind(&user.name)
    .bind(&user.avatar)
    .bind(user.points)
    .bind(user.streak)
    .bind(&user.created_at)
    .execute(db)
    .await?;

    Ok(user)
}

pub async fn delete_user(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();
    Ok(result > 0)
}

pub async fn count_users(db: &SqlitePool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
        .fetch_one(db)
        .await
}

/// Apply a point delta and refresh the cached streak for a user.
pub async fn update_user_progress(
    db: &SqlitePool,
    id: &str,
    point_delta: i64,
    streak: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET points = points + ?, streak = ? WHERE id = ?")
        .bind(point_delta)
        .bind(streak)
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}

// Tasks

const TASK_COLUMNS: &str =
    "id, user_id, title, description, date, time, status, icon, proof, completed_at, created_at, updated_at";

pub async fn fetch_tasks(db: &SqlitePool) -> Result<Vec<Task>, sqlx::Error> {
    sqlx::query_as::<_, Task>(&format!(
        "SELECT {TASK_COLUMNS} FROM tasks ORDER BY created_at ASC"
    ))
    .fetch_all(db)
    .await
}

pub async fn fetch_tasks_for_date(db: &SqlitePool, date: &str) -> Result<Vec<Task>, sqlx::Error> {
    sqlx::query_as::<_, Task>(&format!(
        "SELECT {TASK_COLUMNS} FROM tasks WHERE date = ? ORDER BY created_at ASC"
    ))
    .bind(date)
    .fetch_all(db)
    .await
}

pub async fn find_task_by_id(db: &SqlitePool, id: &str) -> Result<Option<Task>, sqlx::Error> {
    sqlx::query_as::<_, Task>(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?"))
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn insert_task(db: &SqlitePool, req: NewTaskRequest) -> Result<Task, sqlx::Error> {
    let now = Utc::now().to_rfc3339();
    let task = Task {
        id: Uuid::new_v4().to_string(),
        user_id: req.user_id,
        title: req.title,
        description: req.description,
        date: req.date,
        time: req.time,
        status: TaskStatus::Pending,
        icon: req.icon,
        proof: None,
        completed_at: None,
        created_at: now.clone(),
        updated_at: now,
    };

    sqlx::query(&format!(
        "INSERT INTO tasks ({TASK_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
    ))
    .bind(&task.id)
    .bind(&task.user_id)
    .bind(&task.title)
    .bind(&task.description)
    .bind(&task.date)
    .bind(&task.time)
    .bind(task.status)
    .bind(&task.icon)
    .bind(&task.proof)
    .bind(&task.completed_at)
    .bind(&task.created_at)
    .bind(&task.updated_at)
    .execute(db)
    .await?;

    Ok(task)
}

pub async fn update_task(
    db: &SqlitePool,
    id: &str,
    req: UpdateTaskRequest,
) -> Result<Option<Task>, sqlx::Error> {
    let mut current = match find_task_by_id(db, id).await? {
        Some(t) => t,
        None => return Ok(None),
    };

    if let Some(title) = req.title {
        current.title = title;
    }
    if let Some(date) = req.date {
        current.date = date;
    }
    if let Some(description) = req.description {
        current.description = description;
    }
    if let Some(time) = req.time {
        current.time = time;
    }
    if let Some(icon) = req.icon {
        current.icon = icon;
    }
    if let Some(proof) = req.proof {
        current.proof = proof;
    }
    if let Some(status) = req.status {
        if status != current.status {
            current.completed_at = match status {
                TaskStatus::Completed => Some(Utc::now().to_rfc3339()),
                _ => None,
            };
        }
        current.status = status;
    }
    current.updated_at = Utc::now().to_rfc3339();

    sqlx::query(
        "UPDATE tasks SET title = ?, description = ?, date = ?, time = ?, status = ?, icon = ?, proof = ?, completed_at = ?, updated_at = ? WHERE id = ?",
    )
    .bind(&current.title)
    .bind(&current.description)
    .bind(&current.date)
    .bind(&current.time)
    .bind(current.status)
    .bind(&current.icon)
    .bind(&current.proof)
    .bind(&current.completed_at)
    .bind(&current.updated_at)
    .bind(id)
    .execute(db)
    .await?;

    Ok(Some(current))
}

pub async fn delete_task(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();
    Ok(result > 0)
}

// Penalties

const PENALTY_COLUMNS: &str =
    "id, from_user_id, to_user_id, amount, reason, date, status, created_at";

pub async fn fetch_penalties(db: &SqlitePool) -> Result<Vec<Penalty>, sqlx::Error> {
    sqlx::query_as::<_, Penalty>(&format!(
        "SELECT {PENALTY_COLUMNS} FROM penalties ORDER BY created_at DESC"
    ))
    .fetch_all(db)
    .await
}

/// Conditional insert keyed on (from_user_id, date). Returns `None` when a
/// penalty for that pair already exists, so a lost duplicate-check race
/// degrades to a skipped insert rather than a second record.
pub async fn insert_penalty(
    db: &SqlitePool,
    new: NewPenalty,
) -> Result<Option<Penalty>, sqlx::Error> {
    let penalty = Penalty {
        id: Uuid::new_v4().to_string(),
        from_user_id: new.from_user_id,
        to_user_id: new.to_user_id,
        amount: new.amount,
        reason: new.reason,
        date: new.date,
        status: crate::models::PenaltyStatus::Pending,
        created_at: Utc::now().to_rfc3339(),
    };

    let inserted = sqlx::query(
        "INSERT INTO penalties (id, from_user_id, to_user_id, amount, reason, date, status, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)
         ON CONFLICT(from_user_id, date) DO NOTHING",
    )
    .bind(&penalty.id)
    .bind(&penalty.from_user_id)
    .bind(&penalty.to_user_id)
    .bind(penalty.amount)
    .bind(&penalty.reason)
    .bind(&penalty.date)
    .bind(penalty.status)
    .bind(&penalty.created_at)
    .execute(db)
    .await?
    .rows_affected();

    Ok((inserted > 0).then_some(penalty))
}

pub async fn delete_penalty(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM penalties WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();
    Ok(result > 0)
}

pub async fn resolve_penalty(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE penalties SET status = 'resolved' WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();
    Ok(result > 0)
}

// Achievement unlocks

const UNLOCK_COLUMNS: &str =
    "id, user_id, achievement_id, title, description, icon, points, unlocked_at";

pub async fn fetch_unlocks(db: &SqlitePool) -> Result<Vec<AchievementUnlock>, sqlx::Error> {
    sqlx::query_as::<_, AchievementUnlock>(&format!(
        "SELECT {UNLOCK_COLUMNS} FROM achievements ORDER BY unlocked_at DESC"
    ))
    .fetch_all(db)
    .await
}

pub async fn fetch_unlocks_for_user(
    db: &SqlitePool,
    user_id: &str,
) -> Result<Vec<AchievementUnlock>, sqlx::Error> {
    sqlx::query_as::<_, AchievementUnlock>(&format!(
        "SELECT {UNLOCK_COLUMNS} FROM achievements WHERE user_id = ? ORDER BY unlocked_at DESC"
    ))
    .bind(user_id)
    .fetch_all(db)
    .await
}

/// Conditional insert keyed on (user_id, achievement_id). Returns `None` when
/// the pair is already unlocked.
pub async fn insert_unlock(
    db: &SqlitePool,
    new: NewUnlock,
) -> Result<Option<AchievementUnlock>, sqlx::Error> {
    let unlock = AchievementUnlock {
        id: Uuid::new_v4().to_string(),
        user_id: new.user_id,
        achievement_id: new.achievement_id,
        title: new.title,
        description: new.description,
        icon: new.icon,
        points: new.points,
        unlocked_at: Utc::now().to_rfc3339(),
    };

    let inserted = sqlx::query(
        "INSERT INTO achievements (id, user_id, achievement_id, title, description, icon, points, unlocked_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)
         ON CONFLICT(user_id, achievement_id) DO NOTHING",
    )
    .bind(&unlock.id)
    .bind(&unlock.user_id)
    .bind(&unlock.achievement_id)
    .bind(&unlock.title)
    .bind(&unlock.description)
    .bind(&unlock.icon)
    .bind(unlock.points)
    .bind(&unlock.unlocked_at)
    .execute(db)
    .await?
    .rows_affected();

    Ok((inserted > 0).then_some(unlock))
}

// Settings

pub async fn get_settings(db: &SqlitePool) -> Result<Settings, sqlx::Error> {
    let existing = sqlx::query_as::<_, Settings>(
        "SELECT id, penalty_amount, points_per_task, points_per_missed FROM settings WHERE id = 1",
    )
    .fetch_optional(db)
    .await?;

    if let Some(settings) = existing {
        return Ok(settings);
    }

    let defaults = Settings {
        id: 1,
        penalty_amount: 5,
        points_per_task: 10,
        points_per_missed: -5,
    };
    sqlx::query(
        "INSERT INTO settings (id, penalty_amount, points_per_task, points_per_missed)
         VALUES (1, ?, ?, ?)
         ON CONFLICT(id) DO NOTHING",
    )
    .bind(defaults.penalty_amount)
    .bind(defaults.points_per_task)
    .bind(defaults.points_per_missed)
    .execute(db)
    .await?;

    Ok(defaults)
}

pub async fn update_settings(
    db: &SqlitePool,
    req: UpdateSettingsRequest,
) -> Result<Settings, sqlx::Error> {
    let mut current = get_settings(db).await?;
    if let Some(amount) = req.penalty_amount {
        current.penalty_amount = amount;
    }
    if let Some(points) = req.points_per_task {
        current.points_per_task = points;
    }
    if let Some(points) = req.points_per_missed {
        current.points_per_missed = points;
    }

    sqlx::query(
        "UPDATE settings SET penalty_amount = ?, points_per_task = ?, points_per_missed = ? WHERE id = 1",
    )
    .bind(current.penalty_amount)
    .bind(current.points_per_task)
    .bind(current.points_per_missed)
    .execute(db)
    .await?;

    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup_test_db() -> SqlitePool {
        let pool = SqlitePool::connect("sqlite::memory:")
            .await
            .expect("Failed to create test db");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        pool
    }

    #[tokio::test]
    async fn test_insert_and_fetch_task() {
        let pool = setup_test_db().await;

        let user = insert_user(
            &pool,
            NewUserRequest {
                name: "Alice".to_string(),
                avatar: None,
            },
        )
        .await
        .expect("Failed to insert user");

        let task = insert_task(
            &pool,
            NewTaskRequest {
                user_id: user.id.clone(),
                title: "Dishes".to_string(),
                description: None,
                date: "2024-01-04".to_string(),
                time: Some("18:00".to_string()),
                icon: Some("🍽️".to_string()),
            },
        )
        .await
        .expect("Failed to insert task");

        assert_eq!(task.status, TaskStatus::Pending);
        assert!(task.completed_at.is_none());

        let tasks = fetch_tasks_for_date(&pool, "2024-01-04")
            .await
            .expect("Failed to fetch tasks");
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, task.id);
    }

    #[tokio::test]
    async fn test_completing_task_sets_completed_at() {
        let pool = setup_test_db().await;

        let user = insert_user(
            &pool,
            NewUserRequest {
                name: "Alice".to_string(),
                avatar: None,
            },
        )
        .await
        .unwrap();
        let task = insert_task(
            &pool,
            NewTaskRequest {
                user_id: user.id,
                title: "Laundry".to_string(),
                description: None,
                date: "2024-01-04".to_string(),
                time: None,
                icon: None,
            },
        )
        .await
        .unwrap();

        let updated = update_task(
            &pool,
            &task.id,
            UpdateTaskRequest {
                status: Some(TaskStatus::Completed),
                ..Default::default()
            },
        )
        .await
        .expect("Failed to update task")
        .expect("Task not found");
        assert_eq!(updated.status, TaskStatus::Completed);
        assert!(updated.completed_at.is_some());

        let reverted = update_task(
            &pool,
            &task.id,
            UpdateTaskRequest {
                status: Some(TaskStatus::Pending),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
        assert!(reverted.completed_at.is_none());
    }

    #[tokio::test]
    async fn test_update_task_edits_and_clears_optional_fields() {
        let pool = setup_test_db().await;

        let user = insert_user(
            &pool,
            NewUserRequest {
                name: "Alice".to_string(),
                avatar: None,
            },
        )
        .await
        .unwrap();
        let task = insert_task(
            &pool,
            NewTaskRequest {
                user_id: user.id,
                title: "Dishes".to_string(),
                description: Some("before dinner".to_string()),
                date: "2024-01-04".to_string(),
                time: Some("18:00".to_string()),
                icon: Some("🍽️".to_string()),
            },
        )
        .await
        .unwrap();

        let updated = update_task(
            &pool,
            &task.id,
            UpdateTaskRequest {
                description: Some(Some("after dinner".to_string())),
                icon: Some(Some("🧽".to_string())),
                time: Some(None),
                ..Default::default()
            },
        )
        .await
        .expect("Failed to update task")
        .expect("Task not found");
        assert_eq!(updated.description.as_deref(), Some("after dinner"));
        assert_eq!(updated.icon.as_deref(), Some("🧽"));
        assert!(updated.time.is_none());

        // The store agrees, not just the returned struct.
        let fetched = find_task_by_id(&pool, &task.id).await.unwrap().unwrap();
        assert_eq!(fetched.description.as_deref(), Some("after dinner"));
        assert!(fetched.time.is_none());
        assert_eq!(fetched.title, "Dishes");
    }

    #[tokio::test]
    async fn test_penalty_insert_is_conditional() {
        let pool = setup_test_db().await;

        let first = insert_penalty(
            &pool,
            NewPenalty {
                from_user_id: "u1".to_string(),
                to_user_id: None,
                amount: 10,
                reason: "Missed tasks on 2024-01-04: Dishes".to_string(),
                date: "2024-01-04".to_string(),
            },
        )
        .await
        .expect("Failed to insert penalty");
        assert!(first.is_some());

        let second = insert_penalty(
            &pool,
            NewPenalty {
                from_user_id: "u1".to_string(),
                to_user_id: None,
                amount: 20,
                reason: "Duplicate".to_string(),
                date: "2024-01-04".to_string(),
            },
        )
        .await
        .expect("Failed to insert penalty");
        assert!(second.is_none());

        let penalties = fetch_penalties(&pool).await.unwrap();
        assert_eq!(penalties.len(), 1);
        assert_eq!(penalties[0].amount, 10);
    }

    #[tokio::test]
    async fn test_unlock_insert_is_conditional() {
        let pool = setup_test_db().await;

        let new = NewUnlock {
            user_id: "u1".to_string(),
            achievement_id: "perfect_day".to_string(),
            title: "Perfect Day".to_string(),
            description: "Complete all tasks for the day".to_string(),
            icon: "🌟".to_string(),
            points: 10,
        };

        assert!(insert_unlock(&pool, new.clone()).await.unwrap().is_some());
        assert!(insert_unlock(&pool, new).await.unwrap().is_none());

        let unlocks = fetch_unlocks_for_user(&pool, "u1").await.unwrap();
        assert_eq!(unlocks.len(), 1);
    }

    #[tokio::test]
    async fn test_settings_created_with_defaults() {
        let pool = setup_test_db().await;

        let settings = get_settings(&pool).await.expect("Failed to get settings");
        assert_eq!(settings.penalty_amount, 5);
        assert_eq!(settings.points_per_task, 10);

        let updated = update_settings(
            &pool,
            UpdateSettingsRequest {
                penalty_amount: Some(7),
                points_per_task: None,
                points_per_missed: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.penalty_amount, 7);
        assert_eq!(get_settings(&pool).await.unwrap().penalty_amount, 7);
    }
}
