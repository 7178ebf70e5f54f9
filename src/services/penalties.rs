use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use sqlx::SqlitePool;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::db::repository;
use crate::error::AppError;
use crate::models::{NewPenalty, Penalty, PenaltyStatus, TaskStatus};

/// Reconciles missed-task penalties for calendar dates.
///
/// The lock is shared process state: one reconciliation per process at a
/// time. It only guards against self-races; a second process hitting the same
/// store is caught by the unique (user, date) index and, failing that, the
/// cleanup pass.
pub struct PenaltyService {
    db: SqlitePool,
    lock: Arc<Mutex<()>>,
}

/// Pending amounts per user: what they owe and what is owed to them. General
/// penalties (no recipient) count only toward `owed`.
#[derive(Debug, Default, Clone, Serialize)]
pub struct PenaltySummaryEntry {
    pub owed: i64,
    pub owed_to: i64,
}

impl PenaltyService {
    pub fn new(db: SqlitePool, lock: Arc<Mutex<()>>) -> Self {
        Self { db, lock }
    }

    /// Ensure exactly one penalty exists per user with missed tasks on
    /// `date`. Returns the penalties created by this call; an empty list when
    /// there is nothing to do or another reconciliation is already running.
    ///
    /// Any store failure aborts the whole pass and propagates; the lock is a
    /// guard and releases on every exit path.
    pub async fn reconcile_missed_task_penalties(
        &self,
        date: &str,
    ) -> Result<Vec<Penalty>, AppError> {
        let Ok(_guard) = self.lock.try_lock() else {
            warn!("penalty reconciliation for {} skipped: already in flight", date);
            return Ok(Vec::new());
        };

        let tasks = repository::fetch_tasks_for_date(&self.db, date).await?;
        let users = repository::fetch_users(&self.db).await?;
        let settings = repository::get_settings(&self.db).await?;
        let penalties = repository::fetch_penalties(&self.db).await?;

        let mut by_user: HashMap<&str, Vec<&crate::models::Task>> = HashMap::new();
        for task in &tasks {
            by_user.entry(task.user_id.as_str()).or_default().push(task);
        }

        let mut created = Vec::new();
        for (user_id, user_tasks) in by_user {
            if !users.iter().any(|u| u.id == user_id) {
                warn!("task on {} references unknown user {}, skipping", date, user_id);
                continue;
            }

            let missed: Vec<_> = user_tasks
                .iter()
                .filter(|t| matches!(t.status, TaskStatus::Pending | TaskStatus::Missed))
                .collect();
            if missed.is_empty() {
                continue;
            }

            if penalties
                .iter()
                .any(|p| p.from_user_id == user_id && p.date == date)
            {
                continue;
            }

            let titles: Vec<&str> = missed.iter().map(|t| t.title.as_str()).collect();
            let new = NewPenalty {
                from_user_id: user_id.to_string(),
                to_user_id: None,
                amount: missed.len() as i64 * settings.penalty_amount,
                reason: format!("Missed tasks on {}: {}", date, titles.join(", ")),
                date: date.to_string(),
            };

            // None means another writer got there between our read and this
            // insert; the at-most-one invariant already holds.
            if let Some(penalty) = repository::insert_penalty(&self.db, new).await? {
                info!(
                    "penalty of {} created for user {} on {}",
                    penalty.amount, penalty.from_user_id, date
                );
                created.push(penalty);
            }
        }

        Ok(created)
    }

    /// Pending penalty totals per user id.
    pub async fn penalty_summary(
        &self,
    ) -> Result<HashMap<String, PenaltySummaryEntry>, AppError> {
        let penalties = repository::fetch_penalties(&self.db).await?;
        let users = repository::fetch_users(&self.db).await?;

        let mut summary: HashMap<String, PenaltySummaryEntry> = users
            .iter()
            .map(|u| (u.id.clone(), PenaltySummaryEntry::default()))
            .collect();

        for penalty in penalties.iter().filter(|p| p.status == PenaltyStatus::Pending) {
            if let Some(entry) = summary.get_mut(&penalty.from_user_id) {
                entry.owed += penalty.amount;
            }
            if let Some(to) = &penalty.to_user_id {
                if let Some(entry) = summary.get_mut(to) {
                    entry.owed_to += penalty.amount;
                }
            }
        }

        Ok(summary)
    }

    /// Maintenance pass for stores without the (user, date) uniqueness
    /// constraint: keeps the first penalty of each duplicate group and
    /// deletes the rest. Returns the number removed. Safe to run repeatedly.
    pub async fn cleanup_duplicates(&self) -> Result<usize, AppError> {
        let penalties = repository::fetch_penalties(&self.db).await?;

        let mut groups: HashMap<(&str, &str), Vec<&Penalty>> = HashMap::new();
        for penalty in &penalties {
            groups
                .entry((penalty.from_user_id.as_str(), penalty.date.as_str()))
                .or_default()
                .push(penalty);
        }

        let mut removed = 0;
        for (_, group) in groups {
            for duplicate in group.iter().skip(1) {
                repository::delete_penalty(&self.db, &duplicate.id).await?;
                removed += 1;
            }
        }

        if removed > 0 {
            info!("removed {} duplicate penalties", removed);
        }
        Ok(removed)
    }
}
