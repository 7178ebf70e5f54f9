use std::env;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

use crate::error::AppError;
use crate::models::{AchievementUnlock, User};

/// Payload emitted once per new unlock. The UI layer owns display and
/// dismissal; the engine only hands over the structured event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AchievementEvent {
    pub achievement: AchievementUnlock,
    pub user: User,
}

/// Notification sink the evaluator emits into. Held as `Arc<dyn EventSink>`
/// so deployments can swap delivery without touching the engine.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn emit(&self, event: AchievementEvent) -> Result<(), AppError>;
}

/// Discards events. Useful for tests and penalty-only deployments.
pub struct NoopEventSink;

#[async_trait]
impl EventSink for NoopEventSink {
    async fn emit(&self, _event: AchievementEvent) -> Result<(), AppError> {
        Ok(())
    }
}

/// In-process observer registration: handlers call `subscribe()` and receive
/// every event emitted after that point.
pub struct ChannelEventSink {
    sender: broadcast::Sender<AchievementEvent>,
}

impl ChannelEventSink {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AchievementEvent> {
        self.sender.subscribe()
    }
}

impl Default for ChannelEventSink {
    fn default() -> Self {
        Self::new(64)
    }
}

#[async_trait]
impl EventSink for ChannelEventSink {
    async fn emit(&self, event: AchievementEvent) -> Result<(), AppError> {
        // A send error only means nobody is subscribed right now.
        if self.sender.send(event).is_err() {
            debug!("achievement event dropped: no subscribers");
        }
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct WebhookConfig {
    pub url: String,
}

impl WebhookConfig {
    pub fn new_from_env() -> Result<Self, AppError> {
        let url = env::var("WEBHOOK_URL")
            .map_err(|_| AppError::BadRequest("WEBHOOK_URL is not set".to_string()))?;
        Ok(Self { url })
    }
}

/// POSTs each event as JSON to a configured endpoint.
pub struct WebhookEventSink {
    client: Client,
    config: WebhookConfig,
}

impl WebhookEventSink {
    pub fn new(config: WebhookConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::BadRequest(format!("Failed to build http client: {}", e)))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl EventSink for WebhookEventSink {
    async fn emit(&self, event: AchievementEvent) -> Result<(), AppError> {
        let response = self
            .client
            .post(&self.config.url)
            .json(&event)
            .send()
            .await
            .map_err(|e| AppError::Notification(format!("webhook request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Notification(format!(
                "webhook returned {}: {}",
                status, body
            )));
        }

        Ok(())
    }
}
