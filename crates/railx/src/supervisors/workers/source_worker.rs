use anyhow::{Context, Result};
use async_channel::Sender;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::Worker;
use crate::backends::{Source, SourceBackend};

/// 🚰 Pulls messages out of the source and shoves them down the channel.
///
/// Ends when the source says `None`; dropping `tx` is how the pipeline worker finds out.
#[derive(Debug)]
pub(crate) struct SourceWorker {
    tx: Sender<String>,
    source: SourceBackend,
}

impl SourceWorker {
    pub(crate) fn new(tx: Sender<String>, source: SourceBackend) -> Self {
        Self { tx, source }
    }
}

impl Worker for SourceWorker {
    fn start(mut self) -> JoinHandle<Result<()>> {
        tokio::spawn(async move {
            debug!("🚰 SourceWorker started pouring...");
            while let Some(message) = self
                .source
                .next_message()
                .await
                .context("💀 The source failed while fetching the next message")?
            {
                self.tx.send(message).await.context(
                    "💀 The pipeline worker hung up on us. The channel is closed, nobody is listening.",
                )?;
            }
            info!("🏁 source ran dry, closing the channel");
            Ok(())
        })
    }
}
