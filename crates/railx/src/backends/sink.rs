use anyhow::Result;
use async_trait::async_trait;

use crate::app_config::SinkConfig;
use crate::backends::{elasticsearch, file, in_mem};
use crate::common::FlatIncidentRow;

/// 🕳️ A sink that stores the flattened rows of one incident version.
///
/// # Contract 📜
/// - `send` receives every row of ONE processed message, all sharing the same
///   (incident_number, version). Storing a version twice must not duplicate it.
/// - `close` flushes, finalizes, and bids the data a fond farewell. MUST be called.
///   Skipping `close` is a bug. It is also considered rude.
/// - Sinks keep every version they get. Deciding which one is "latest" happens on read.
#[async_trait]
pub(crate) trait Sink: std::fmt::Debug {
    /// 📡 Persist the rows. An empty batch is a no-op, not an error.
    async fn send(&mut self, rows: Vec<FlatIncidentRow>) -> Result<()>;
    /// 🗑️ Flush, finalize, and release. Call this. Always. Not even Fridays are exempt.
    async fn close(&mut self) -> Result<()>;
}

/// 🎭 The many faces of a Sink. Mirrors `SourceBackend` on the other end of the pipe.
#[derive(Debug)]
pub(crate) enum SinkBackend {
    InMemory(in_mem::InMemorySink),
    File(file::FileSink),
    Elasticsearch(elasticsearch::ElasticsearchSink),
}

impl SinkBackend {
    pub(crate) async fn from_config(config: &SinkConfig) -> Result<Self> {
        Ok(match config {
            SinkConfig::InMemory => Self::InMemory(in_mem::InMemorySink::new()),
            SinkConfig::File(file_config) => {
                Self::File(file::FileSink::new(file_config.clone()).await?)
            }
            SinkConfig::Elasticsearch(es_config) => {
                Self::Elasticsearch(elasticsearch::ElasticsearchSink::new(es_config.clone()).await?)
            }
        })
    }
}

#[async_trait]
impl Sink for SinkBackend {
    async fn send(&mut self, rows: Vec<FlatIncidentRow>) -> Result<()> {
        match self {
            SinkBackend::InMemory(sink) => sink.send(rows).await,
            SinkBackend::File(sink) => sink.send(rows).await,
            SinkBackend::Elasticsearch(sink) => sink.send(rows).await,
        }
    }

    async fn close(&mut self) -> Result<()> {
        match self {
            SinkBackend::InMemory(sink) => sink.close().await,
            SinkBackend::File(sink) => sink.close().await,
            SinkBackend::Elasticsearch(sink) => sink.close().await,
        }
    }
}
