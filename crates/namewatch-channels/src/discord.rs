//! Discord webhook channel, outbound only.
//!
//! Posts `{"content": ...}` to an incoming-webhook URL. Discord answers a
//! successful execute with 204 No Content; anything else is a failed delivery.

use async_trait::async_trait;
use namewatch_core::config::NotifyConfig;
use namewatch_core::error::{NameWatchError, Result};
use namewatch_core::traits::NotificationSink;
use serde::Serialize;
use std::time::Duration;

/// Webhook execute payload.
#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    content: &'a str,
}

/// Discord webhook channel.
pub struct DiscordWebhook {
    webhook_url: String,
    client: reqwest::Client,
}

impl DiscordWebhook {
    pub fn new(config: &NotifyConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| NameWatchError::Http(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            webhook_url: config.webhook_url.clone(),
            client,
        })
    }
}

#[async_trait]
impl NotificationSink for DiscordWebhook {
    fn name(&self) -> &str { "discord" }

    async fn send(&self, message: &str) -> Result<()> {
        let response = self.client
            .post(&self.webhook_url)
            .json(&WebhookPayload { content: message })
            .send()
            .await
            .map_err(|e| NameWatchError::delivery(format!("Discord webhook send failed: {e}")))?;

        let status = response.status();
        if status != reqwest::StatusCode::NO_CONTENT {
            let text = response.text().await.unwrap_or_default();
            return Err(NameWatchError::delivery(format!("Discord webhook {status}: {text}")));
        }
        Ok(())
    }
}
