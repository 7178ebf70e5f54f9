use std::sync::Arc;
use std::time::Duration;

use chrono::{Days, Utc};
use sqlx::SqlitePool;
use tokio::sync::Mutex;
use tracing::info;

use crate::services::penalties::PenaltyService;

/// Date-rollover loop: periodically reconciles penalties for yesterday so
/// missed tasks are charged even when nobody opens the app.
pub struct RolloverScheduler {
    db: SqlitePool,
    penalty_lock: Arc<Mutex<()>>,
    interval: Duration,
}

impl RolloverScheduler {
    pub fn new(db: SqlitePool, penalty_lock: Arc<Mutex<()>>, interval_secs: u64) -> Self {
        Self {
            db,
            penalty_lock,
            interval: Duration::from_secs(interval_secs),
        }
    }

    pub async fn start(self) {
        info!("Starting rollover scheduler (interval: {:?})", self.interval);

        loop {
            tokio::time::sleep(self.interval).await;

            let Some(yesterday) = Utc::now().date_naive().checked_sub_days(Days::new(1)) else {
                continue;
            };
            let date = yesterday.format("%Y-%m-%d").to_string();

            let service = PenaltyService::new(self.db.clone(), self.penalty_lock.clone());
            match service.reconcile_missed_task_penalties(&date).await {
                Ok(created) => {
                    info!("Rollover reconciliation for {}: {} new penalties", date, created.len());
                }
                Err(e) => {
                    // Keep the loop alive; the next tick retries.
                    tracing::warn!("Rollover reconciliation for {} failed: {:?}", date, e);
                }
            }
        }
    }
}
