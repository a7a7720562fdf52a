//! 🎬 *[camera pans across a dimly lit signalling centre]*
//! 🎬 "In a world where incidents arrive at 3am..."
//! 🎬 "One supervisor dared to manage them all."
//! 🎬 *[record scratch]* 🦆
//!
//! 📦 The Supervisor module: part middle manager, part helicopter parent.
//! It builds the source, the sink and the notifier from config, wires two workers
//! together with a bounded channel, waits for both, and reports the damage.
//!
//! ```text
//!   SourceBackend ──▶ SourceWorker ──▶ async_channel(queue_capacity) ──▶ PipelineWorker
//!                                                                          │
//!                                         parse → notify → flatten → SinkBackend
//! ```
//!
//! ⚠️ Workers stay private. Like Fight Club, but for async tasks.

mod workers;

use std::sync::Arc;

use anyhow::{Context, Result};
use futures::future::join;
use tracing::info;

use crate::app_config::AppConfig;
use crate::backends::{SinkBackend, SourceBackend};
use crate::notifiers::IncidentNotifier;
use crate::pipeline::IncidentPipeline;
use crate::progress::{PipelineStats, StatsSnapshot};
use workers::{PipelineWorker, SourceWorker, Worker};

/// 📦 The Supervisor: holds the config, builds everything, hovers.
pub(crate) struct Supervisor {
    app_config: AppConfig,
}

impl Supervisor {
    pub(crate) fn new(app_config: AppConfig) -> Self {
        Self { app_config }
    }

    /// 🚀 Build the collaborators from config and run until the source runs dry.
    pub(crate) async fn run(&self) -> Result<StatsSnapshot> {
        let source = SourceBackend::from_config(&self.app_config.source_config)
            .await
            .context("💀 Could not start the incident source")?;
        let sink = SinkBackend::from_config(&self.app_config.sink_config)
            .await
            .context("💀 Could not open the incident sink")?;
        let notifier = IncidentNotifier::from_config(&self.app_config.notifier_config)
            .context("💀 Could not set up the notifier")?;
        let pipeline = IncidentPipeline::new(self.app_config.parser.clone());

        run_with(
            source,
            sink,
            notifier,
            pipeline,
            self.app_config.runtime.queue_capacity,
        )
        .await
    }
}

/// 🧵 Wire up already-built collaborators and drive them to completion.
///
/// The source worker ends the run by dropping its end of the channel. The pipeline
/// worker drains what's left, closes the sink, and exits.
pub(crate) async fn run_with(
    source: SourceBackend,
    sink: SinkBackend,
    notifier: IncidentNotifier,
    pipeline: IncidentPipeline,
    queue_capacity: usize,
) -> Result<StatsSnapshot> {
    let (tx, rx) = async_channel::bounded(queue_capacity.max(1));
    let stats = Arc::new(PipelineStats::default());

    let source_handle = SourceWorker::new(tx, source).start();
    let pipeline_handle =
        PipelineWorker::new(rx, sink, notifier, pipeline, Arc::clone(&stats)).start();

    let (source_joined, pipeline_joined) = join(source_handle, pipeline_handle).await;
    let source_result =
        source_joined.context("💀 The source worker panicked. Somewhere, a task wept.")?;
    let pipeline_result =
        pipeline_joined.context("💀 The pipeline worker panicked. Somewhere, a task wept.")?;

    // 🎯 pipeline first: if it died, the source's "channel closed" is just the echo
    pipeline_result.context("💀 The pipeline worker failed")?;
    source_result.context("💀 The source worker failed")?;

    let snapshot = stats.snapshot();
    info!("📊 run summary:\n{}", snapshot.summary_table());
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::in_mem::{InMemorySink, InMemorySource, SAMPLE_INCIDENT_XML};
    use crate::notifiers::{
        InMemoryNotifier, NotificationPolicy, NotifierBackend, NotifierBackendConfig,
        NotifierConfig, WebhookNotifierConfig,
    };
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn the_one_where_good_bad_and_duplicate_messages_walk_into_a_pipeline() -> Result<()> {
        let the_source = InMemorySource::new([
            SAMPLE_INCIDENT_XML.to_string(),
            "<<< definitely not xml".to_string(),
            SAMPLE_INCIDENT_XML.to_string(),
        ]);
        let the_sink = InMemorySink::new();
        let the_inbox = InMemoryNotifier::default();

        let the_stats = run_with(
            SourceBackend::InMemory(the_source),
            SinkBackend::InMemory(the_sink.clone()),
            IncidentNotifier::new(
                NotificationPolicy::default(),
                NotifierBackend::InMemory(the_inbox.clone()),
            ),
            IncidentPipeline::default(),
            1,
        )
        .await?;

        assert_eq!(the_stats.messages_received, 3);
        assert_eq!(the_stats.messages_processed, 2);
        assert_eq!(the_stats.messages_dropped, 1);
        // 🔁 same version twice: the sink keeps the first delivery only
        assert_eq!(the_sink.rows().await.len(), 2);
        // 📣 LE is allow-listed, SX is not, and the sample arrived twice
        assert_eq!(the_stats.notifications_sent, 2);
        assert_eq!(the_inbox.sent.lock().await.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn the_one_where_the_notification_gateway_is_down_and_the_message_is_dropped()
    -> Result<()> {
        let the_gateway = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("sms gateway on fire"))
            .expect(1)
            .mount(&the_gateway)
            .await;
        let the_sink = InMemorySink::new();

        let the_stats = run_with(
            SourceBackend::InMemory(InMemorySource::with_sample()),
            SinkBackend::InMemory(the_sink.clone()),
            IncidentNotifier::from_config(&NotifierConfig {
                backend: NotifierBackendConfig::Webhook(WebhookNotifierConfig {
                    url: the_gateway.uri(),
                }),
                ..NotifierConfig::default()
            })?,
            IncidentPipeline::default(),
            1,
        )
        .await?;

        assert_eq!(the_stats.messages_received, 1);
        assert_eq!(the_stats.messages_processed, 0);
        assert_eq!(the_stats.messages_dropped, 1);
        assert_eq!(the_stats.notifications_sent, 0);
        assert!(the_sink.rows().await.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn the_one_where_an_empty_source_is_a_quiet_success() -> Result<()> {
        let the_stats = run_with(
            SourceBackend::InMemory(InMemorySource::default()),
            SinkBackend::InMemory(InMemorySink::new()),
            IncidentNotifier::new(NotificationPolicy::default(), NotifierBackend::Disabled),
            IncidentPipeline::default(),
            10,
        )
        .await?;

        assert_eq!(the_stats, StatsSnapshot::default());
        Ok(())
    }
}
