//! 📣 Notifiers: telling commuters their train is not coming, one operator at a time.
//!
//! 🎬 The incident has been parsed. The rows are on their way to storage. But somewhere
//! a passenger subscribed to "Greater Anglia disruption" and is about to stand on a cold
//! platform for forty minutes. This module's whole job is to text them first.
//!
//! ```text
//!   IncidentRecord ──▶ compose_notifications(policy) ──▶ Vec<Notification>
//!                                                            │
//!                        NotifierBackend::publish ◀──────────┘
//!                     (Disabled | Log | InMemory | Webhook)
//! ```
//!
//! Composition is pure and lives in [`compose`]. Delivery is the backend's problem.

mod compose;
mod in_mem;
mod webhook;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use crate::common::IncidentRecord;

pub use compose::{
    DEFAULT_ALLOWED_OPERATOR_CODES, Notification, NotificationPolicy, compose_notifications,
};
pub(crate) use in_mem::InMemoryNotifier;
pub use webhook::WebhookNotifierConfig;

/// 📡 Something that can deliver one notification somewhere.
#[async_trait]
pub(crate) trait Notifier: std::fmt::Debug {
    async fn publish(&mut self, notification: &Notification) -> Result<()>;
}

/// 📟 Which delivery mechanism `[notifier_config]` asks for.
///
/// ```toml
/// [notifier_config]
/// backend = "Log"
///
/// # or
/// [notifier_config.backend.Webhook]
/// url = "https://sms-gateway.internal/notify"
/// ```
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
pub enum NotifierBackendConfig {
    /// 🔇 The default. Nobody gets texted.
    #[default]
    Disabled,
    /// 📝 Log the notifications at `info`. Good for dry runs.
    Log,
    InMemory,
    Webhook(WebhookNotifierConfig),
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct NotifierConfig {
    #[serde(default)]
    pub backend: NotifierBackendConfig,
    #[serde(flatten, default)]
    pub policy: NotificationPolicy,
}

/// 📝 Writes notifications into the tracing stream instead of anyone's phone.
#[derive(Debug, Default)]
pub(crate) struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn publish(&mut self, notification: &Notification) -> Result<()> {
        info!(
            "📣 [{}] {}",
            notification.topic,
            notification.message.trim()
        );
        Ok(())
    }
}

/// 🎭 The many faces of a Notifier. Same enum-dispatch trick as the backends.
#[derive(Debug)]
pub(crate) enum NotifierBackend {
    Disabled,
    Log(LogNotifier),
    InMemory(InMemoryNotifier),
    Webhook(webhook::WebhookNotifier),
}

impl NotifierBackend {
    pub(crate) fn from_config(config: &NotifierBackendConfig) -> Result<Self> {
        Ok(match config {
            NotifierBackendConfig::Disabled => Self::Disabled,
            NotifierBackendConfig::Log => Self::Log(LogNotifier),
            NotifierBackendConfig::InMemory => Self::InMemory(InMemoryNotifier::default()),
            NotifierBackendConfig::Webhook(webhook_config) => {
                Self::Webhook(webhook::WebhookNotifier::new(webhook_config.clone())?)
            }
        })
    }
}

#[async_trait]
impl Notifier for NotifierBackend {
    async fn publish(&mut self, notification: &Notification) -> Result<()> {
        match self {
            NotifierBackend::Disabled => Ok(()),
            NotifierBackend::Log(notifier) => notifier.publish(notification).await,
            NotifierBackend::InMemory(notifier) => notifier.publish(notification).await,
            NotifierBackend::Webhook(notifier) => notifier.publish(notification).await,
        }
    }
}

/// 📣 Policy plus delivery: what the pipeline worker actually holds.
#[derive(Debug)]
pub(crate) struct IncidentNotifier {
    policy: NotificationPolicy,
    backend: NotifierBackend,
}

impl IncidentNotifier {
    pub(crate) fn new(policy: NotificationPolicy, backend: NotifierBackend) -> Self {
        Self { policy, backend }
    }

    pub(crate) fn from_config(config: &NotifierConfig) -> Result<Self> {
        Ok(Self::new(
            config.policy.clone(),
            NotifierBackend::from_config(&config.backend)?,
        ))
    }

    /// 📣 Compose and publish for one canonical record. Returns how many went out.
    ///
    /// Stops at the first failed publish; notifications already sent stay sent.
    pub(crate) async fn notify(&mut self, record: &IncidentRecord) -> Result<usize> {
        if matches!(self.backend, NotifierBackend::Disabled) {
            return Ok(0);
        }
        let notifications = compose_notifications(record, &self.policy);
        for notification in &notifications {
            self.backend
                .publish(notification)
                .await
                .with_context(|| format!("💀 Failed to notify topic '{}'", notification.topic))?;
        }
        Ok(notifications.len())
    }
}
