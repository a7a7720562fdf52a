use anyhow::Result;
use async_trait::async_trait;

use crate::app_config::SourceConfig;
use crate::backends::{file, in_mem, stomp};

/// 🚰 A source that produces one incident document per call.
///
/// # Contract 📜
/// - `next_message` returns `Ok(Some(xml))`: one whole message body, uninterpreted.
/// - `Ok(None)` = end of stream. The feed is done, or the reconnect policy gave up.
/// - The source does NOT parse anything. It's a faucet, not a chef.
/// - `Err(...)` means the source itself is broken, not one message. The supervisor stops.
#[async_trait]
pub(crate) trait Source: std::fmt::Debug {
    /// 📨 Fetch the next message body.
    async fn next_message(&mut self) -> Result<Option<String>>;
}

/// 🎭 The many faces of a Source. The supervisor holds one of these and never asks which.
#[derive(Debug)]
pub(crate) enum SourceBackend {
    InMemory(in_mem::InMemorySource),
    File(file::FileSource),
    Stomp(stomp::StompSource),
}

impl SourceBackend {
    /// 🏗️ Config in, connected source out. The STOMP variant dials the broker right here.
    pub(crate) async fn from_config(config: &SourceConfig) -> Result<Self> {
        Ok(match config {
            SourceConfig::InMemory => Self::InMemory(in_mem::InMemorySource::with_sample()),
            SourceConfig::File(file_config) => {
                Self::File(file::FileSource::new(file_config.clone()).await?)
            }
            SourceConfig::Stomp(stomp_config) => {
                Self::Stomp(stomp::StompSource::new(stomp_config.clone()).await?)
            }
        })
    }
}

#[async_trait]
impl Source for SourceBackend {
    async fn next_message(&mut self) -> Result<Option<String>> {
        match self {
            SourceBackend::InMemory(source) => source.next_message().await,
            SourceBackend::File(source) => source.next_message().await,
            SourceBackend::Stomp(source) => source.next_message().await,
        }
    }
}
