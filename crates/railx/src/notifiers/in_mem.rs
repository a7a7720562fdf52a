use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{Notification, Notifier};

/// 📦 Collects notifications instead of sending them. Clone it before handing it to the
/// pipeline and peek at `sent` afterwards.
#[derive(Debug, Default, Clone)]
pub(crate) struct InMemoryNotifier {
    pub(crate) sent: Arc<Mutex<Vec<Notification>>>,
}

#[async_trait]
impl Notifier for InMemoryNotifier {
    async fn publish(&mut self, notification: &Notification) -> Result<()> {
        self.sent.lock().await.push(notification.clone());
        Ok(())
    }
}
