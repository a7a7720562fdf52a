use std::collections::VecDeque;

use anyhow::Result;
use async_trait::async_trait;

use crate::backends::Source;

/// 📦 The bundled sample: Greater Anglia and Stansted Express, one route, one bad Sunday.
pub const SAMPLE_INCIDENT_XML: &str = include_str!("../../../fixtures/incident_le_sx.xml");

/// 📦 The world's most predictable message queue.
///
/// Pops messages off the front of a `VecDeque` until it runs out, then returns
/// `None` forever. No broker, no network, no heartbeat. Just vibes and heap memory.
#[derive(Debug, Default)]
pub(crate) struct InMemorySource {
    messages: VecDeque<String>,
}

impl InMemorySource {
    pub(crate) fn new(messages: impl IntoIterator<Item = String>) -> Self {
        Self {
            messages: messages.into_iter().collect(),
        }
    }

    /// 🎯 What `[source_config] InMemory` gives you: the sample incident, once.
    pub(crate) fn with_sample() -> Self {
        Self::new([SAMPLE_INCIDENT_XML.to_string()])
    }
}

#[async_trait]
impl Source for InMemorySource {
    async fn next_message(&mut self) -> Result<Option<String>> {
        Ok(self.messages.pop_front())
    }
}
