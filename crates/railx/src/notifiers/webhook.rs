use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::{Notification, Notifier};

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct WebhookNotifierConfig {
    pub url: String,
}

/// 🪝 POSTs `{"topic": ..., "message": ...}` to a URL. Whatever sits behind it
/// (an SMS gateway, a chat bot, a lambda) is its own business.
#[derive(Debug)]
pub(crate) struct WebhookNotifier {
    client: reqwest::Client,
    config: WebhookNotifierConfig,
}

impl WebhookNotifier {
    pub(crate) fn new(config: WebhookNotifierConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()
            .context("💀 The webhook HTTP client refused to be born")?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn publish(&mut self, notification: &Notification) -> Result<()> {
        let payload =
            serde_json::to_string(notification).context("💀 Notification refused to become JSON")?;
        let response = self
            .client
            .post(&self.config.url)
            .header("Content-Type", "application/json")
            .body(payload)
            .send()
            .await
            .with_context(|| format!("💀 Could not reach the notification webhook at '{}'", self.config.url))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "💀 The webhook answered {} for topic '{}': '{}'",
                status,
                notification.topic,
                body
            );
        }
        debug!("📣 published to {}", notification.topic);
        Ok(())
    }
}
