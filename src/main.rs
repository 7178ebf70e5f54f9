use std::net::SocketAddr;
use std::sync::Arc;

use sqlx::sqlite::SqlitePoolOptions;
use tokio::sync::Mutex;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use accountable::api::router;
use accountable::events::{ChannelEventSink, EventSink, WebhookConfig, WebhookEventSink};
use accountable::services::RolloverScheduler;
use accountable::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "accountable=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://accountable.db".to_string());

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let events: Arc<dyn EventSink> = match WebhookConfig::new_from_env() {
        Ok(config) => {
            info!("achievement events will be posted to {}", config.url);
            Arc::new(WebhookEventSink::new(config)?)
        }
        Err(_) => Arc::new(ChannelEventSink::default()),
    };

    let penalty_lock = Arc::new(Mutex::new(()));

    let interval_secs = std::env::var("ROLLOVER_INTERVAL_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3600);
    let scheduler = RolloverScheduler::new(pool.clone(), penalty_lock.clone(), interval_secs);
    tokio::spawn(scheduler.start());

    let state = AppState {
        db: pool,
        events,
        penalty_lock,
    };

    let app = router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
