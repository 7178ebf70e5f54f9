use std::sync::Arc;

use sqlx::SqlitePool;
use tokio::sync::Mutex;

use crate::events::EventSink;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub events: Arc<dyn EventSink>,
    /// Process-local re-entrancy guard for penalty reconciliation.
    pub penalty_lock: Arc<Mutex<()>>,
}
