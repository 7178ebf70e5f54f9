use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, Query};
use axum::routing::{delete, patch, post};
use axum::{Router, extract::State, http::StatusCode, routing::get};
use serde::Deserialize;
use tracing::warn;

use crate::db::repository;
use crate::error::AppError;
use crate::models::*;
use crate::services::{AchievementService, PenaltyService, PenaltySummaryEntry, TaskService};
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/users", get(list_users).post(create_user))
        .route("/users/{id}", delete(remove_user))
        .route("/users/{id}/achievements", get(list_user_achievements))
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/{id}", patch(update_task).delete(remove_task))
        .route("/penalties", get(list_penalties))
        .route("/penalties/summary", get(penalty_summary))
        .route("/penalties/cleanup", post(cleanup_penalties))
        .route("/penalties/{id}/resolve", patch(resolve_penalty))
        .route("/penalties/recalculate/{date}", post(recalculate_penalties))
        .route("/achievements", get(list_achievements))
        .route("/settings", get(get_settings).patch(update_settings))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}

async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, AppError> {
    let users = repository::fetch_users(&state.db).await?;
    Ok(Json(users))
}

async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<NewUserRequest>,
) -> Result<Json<User>, AppError> {
    let user = repository::insert_user(&state.db, req).await?;
    Ok(Json(user))
}

async fn remove_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    // The household always keeps at least one member.
    if repository::count_users(&state.db).await? <= 1 {
        return Err(AppError::Conflict("cannot delete the last user".to_string()));
    }
    if repository::delete_user(&state.db, &id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

async fn list_user_achievements(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<AchievementUnlock>>, AppError> {
    let unlocks = repository::fetch_unlocks_for_user(&state.db, &id).await?;
    Ok(Json(unlocks))
}

#[derive(Deserialize)]
struct TaskQueryParams {
    date: Option<String>,
}

async fn list_tasks(
    State(state): State<AppState>,
    Query(params): Query<TaskQueryParams>,
) -> Result<Json<Vec<Task>>, AppError> {
    let tasks = match params.date {
        Some(date) => repository::fetch_tasks_for_date(&state.db, &date).await?,
        None => repository::fetch_tasks(&state.db).await?,
    };
    Ok(Json(tasks))
}

async fn create_task(
    State(state): State<AppState>,
    Json(req): Json<NewTaskRequest>,
) -> Result<Json<Task>, AppError> {
    if repository::find_user_by_id(&state.db, &req.user_id).await?.is_none() {
        return Err(AppError::BadRequest(format!("unknown user: {}", req.user_id)));
    }
    let task = repository::insert_task(&state.db, req).await?;
    spawn_evaluation(&state, task.user_id.clone(), task.date.clone());
    Ok(Json(task))
}

async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateTaskRequest>,
) -> Result<Json<Task>, AppError> {
    let status_changed = req.status.is_some();
    let proof_changed = req.proof.is_some();
    let service = TaskService::new(state.db.clone());
    let task = service.update_task(&id, req).await?.ok_or(AppError::NotFound)?;

    // Achievement evaluation runs behind the user-visible update and never
    // delays or fails it.
    if status_changed || proof_changed {
        spawn_evaluation(&state, task.user_id.clone(), task.date.clone());
    }

    Ok(Json(task))
}

fn spawn_evaluation(state: &AppState, user_id: String, date: String) {
    let service = AchievementService::new(state.db.clone(), state.events.clone());
    tokio::spawn(async move {
        if let Err(e) = service.evaluate_all(&user_id, &date).await {
            warn!("achievement evaluation for {} failed: {:?}", user_id, e);
        }
    });
}

async fn remove_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if repository::delete_task(&state.db, &id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

async fn list_penalties(State(state): State<AppState>) -> Result<Json<Vec<Penalty>>, AppError> {
    let penalties = repository::fetch_penalties(&state.db).await?;
    Ok(Json(penalties))
}

async fn penalty_summary(
    State(state): State<AppState>,
) -> Result<Json<HashMap<String, PenaltySummaryEntry>>, AppError> {
    let service = PenaltyService::new(state.db.clone(), state.penalty_lock.clone());
    let summary = service.penalty_summary().await?;
    Ok(Json(summary))
}

async fn cleanup_penalties(State(state): State<AppState>) -> Result<Json<usize>, AppError> {
    let service = PenaltyService::new(state.db.clone(), state.penalty_lock.clone());
    let removed = service.cleanup_duplicates().await?;
    Ok(Json(removed))
}

async fn resolve_penalty(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if repository::resolve_penalty(&state.db, &id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

/// Explicit recalculation, awaited so the caller gets feedback (the UI shows
/// a retry prompt on failure).
async fn recalculate_penalties(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<Vec<Penalty>>, AppError> {
    if chrono::NaiveDate::parse_from_str(&date, "%Y-%m-%d").is_err() {
        return Err(AppError::BadRequest(format!("invalid date: {}", date)));
    }
    let service = PenaltyService::new(state.db.clone(), state.penalty_lock.clone());
    let created = service.reconcile_missed_task_penalties(&date).await?;
    Ok(Json(created))
}

async fn list_achievements(
    State(state): State<AppState>,
) -> Result<Json<Vec<AchievementUnlock>>, AppError> {
    let unlocks = repository::fetch_unlocks(&state.db).await?;
    Ok(Json(unlocks))
}

async fn get_settings(State(state): State<AppState>) -> Result<Json<Settings>, AppError> {
    let settings = repository::get_settings(&state.db).await?;
    Ok(Json(settings))
}

async fn update_settings(
    State(state): State<AppState>,
    Json(req): Json<UpdateSettingsRequest>,
) -> Result<Json<Settings>, AppError> {
    let settings = repository::update_settings(&state.db, req).await?;
    Ok(Json(settings))
}
