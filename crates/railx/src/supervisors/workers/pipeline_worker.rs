use std::sync::Arc;

use anyhow::{Context, Result};
use async_channel::Receiver;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::Worker;
use crate::backends::{Sink, SinkBackend};
use crate::notifiers::IncidentNotifier;
use crate::pipeline::IncidentPipeline;
use crate::progress::{PipelineProgress, PipelineStats};
use crate::transforms::flatten;

/// 🔄 Drains the channel: parse → notify → flatten → store, one message at a time.
///
/// A message that fails to parse, notify or store is logged and dropped; the worker
/// keeps going. Only a sink that can't close fails the worker.
#[derive(Debug)]
pub(crate) struct PipelineWorker {
    rx: Receiver<String>,
    sink: SinkBackend,
    notifier: IncidentNotifier,
    pipeline: IncidentPipeline,
    stats: Arc<PipelineStats>,
}

impl PipelineWorker {
    pub(crate) fn new(
        rx: Receiver<String>,
        sink: SinkBackend,
        notifier: IncidentNotifier,
        pipeline: IncidentPipeline,
        stats: Arc<PipelineStats>,
    ) -> Self {
        Self {
            rx,
            sink,
            notifier,
            pipeline,
            stats,
        }
    }

    /// 🧱 One message, start to finish. Returns the number of rows stored.
    async fn handle(&mut self, xml_text: &str) -> Result<usize> {
        let record = self
            .pipeline
            .canonicalize(xml_text)
            .context("💀 Incident message could not be parsed")?;
        let incident = record.incident_number.as_deref().unwrap_or("<unnumbered>");
        let version = record.version.as_deref().unwrap_or("<unversioned>");

        let sent = self
            .notifier
            .notify(&record)
            .await
            .with_context(|| format!("💀 Notifications for incident {incident} v{version} failed"))?;
        self.stats.record_notifications(sent);

        let rows = flatten(&record);
        if rows.is_empty() {
            warn!(
                "🫥 incident {incident} v{version} has no operators or no routes, nothing to store"
            );
            return Ok(0);
        }

        let row_count = rows.len();
        self.sink
            .send(rows)
            .await
            .with_context(|| format!("💀 The sink refused incident {incident} v{version}"))?;
        info!("✅ incident {incident} v{version} recorded: {row_count} row(s)");
        Ok(row_count)
    }
}

impl Worker for PipelineWorker {
    fn start(mut self) -> JoinHandle<Result<()>> {
        tokio::spawn(async move {
            debug!("📥 PipelineWorker started draining channel...");
            let progress = PipelineProgress::new();

            while let Ok(message) = self.rx.recv().await {
                self.stats.record_received();
                match self.handle(&message).await {
                    Ok(rows) => self.stats.record_processed(rows),
                    Err(err) => {
                        error!("💀 dropping message: {err:#}");
                        self.stats.record_dropped();
                    }
                }
                progress.tick(&self.stats.snapshot());
            }

            debug!("🏁 PipelineWorker: channel closed, closing the sink");
            let elapsed = progress.finish();
            self.sink
                .close()
                .await
                .context("💀 PipelineWorker failed to close the sink")?;
            info!("🏁 pipeline drained after {elapsed}");
            Ok(())
        })
    }
}
