//! 🔧 App Configuration: the sacred TOML-to-struct pipeline.
//!
//! 📡 "Config not found: We looked everywhere. Under the couch. Behind the fridge.
//! In the junk drawer. Nothing." (every developer at 3am) 🦆
//!
//! 🏗️ Powered by Figment, because manually parsing env vars is a form of
//! self-harm that even the borrow checker wouldn't approve of.
//!
//! ```toml
//! [source_config.Stomp]
//! host = "datafeeds.nationalrail.co.uk"
//! username = "me@example.com"
//! password = "..."
//!
//! [sink_config.File]
//! file_name = "incidents.ndjson"
//!
//! [notifier_config]
//! backend = "Log"
//!
//! [parser]
//! legacy_duplicate_mode = false
//! ```

use std::path::Path;

use anyhow::Context;
use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::Deserialize;
use tracing::info;

use crate::backends::{
    ElasticsearchSinkConfig, FileSinkConfig, FileSourceConfig, StompSourceConfig,
};
use crate::notifiers::NotifierConfig;
use crate::transforms::ParserConfig;

/// 🚰 Where incident messages come from.
#[derive(Debug, Deserialize, Clone)]
pub enum SourceConfig {
    /// 🧪 The bundled sample incident, once. For smoke tests and demos.
    InMemory,
    File(FileSourceConfig),
    Stomp(StompSourceConfig),
}

/// 🕳️ Where flattened rows end up.
#[derive(Debug, Deserialize, Clone)]
pub enum SinkConfig {
    InMemory,
    File(FileSinkConfig),
    Elasticsearch(ElasticsearchSinkConfig),
}

fn default_queue_capacity() -> usize {
    10
}

/// ⚙️ Runtime knobs for the supervisor.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// 📬 Messages buffered between the source worker and the pipeline worker.
    #[serde(default = "default_queue_capacity", alias = "channel_size")]
    pub queue_capacity: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
        }
    }
}

/// 📦 The AppConfig: one struct to rule them all, and in the Figment bind them.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub source_config: SourceConfig,
    pub sink_config: SinkConfig,
    #[serde(default)]
    pub notifier_config: NotifierConfig,
    #[serde(default)]
    pub parser: ParserConfig,
    #[serde(default, alias = "supervisor_config")]
    pub runtime: RuntimeConfig,
}

/// 🚀 Load the config from env vars (`RAILX_*`) and, optionally, a TOML file.
///
/// 📐 If `config_file_name` is None → env vars only. If Some → env vars + TOML, merged,
/// TOML wins on conflicts. Nested keys in env vars use double underscores, e.g.
/// `RAILX_RUNTIME__QUEUE_CAPACITY=32`.
///
/// 💀 Returns an error if the config is unparseable. The error says which file.
pub fn load_config(config_file_name: Option<&Path>) -> anyhow::Result<AppConfig> {
    info!(
        "🔧 Loading configuration: {:#?}",
        config_file_name.unwrap_or(Path::new(""))
    );

    let config = Figment::new().merge(Env::prefixed("RAILX_").split("__"));
    let config = match config_file_name {
        Some(file_name) => config.merge(Toml::file(file_name)),
        None => config,
    };

    let context_msg = match config_file_name {
        Some(path) => format!(
            "💀 Failed to parse configuration from file '{}' and environment variables (RAILX_*). \
             The file exists in our hearts, but apparently not in a shape serde likes.",
            path.display()
        ),
        None => "💀 Failed to parse configuration from environment variables (RAILX_*). \
                 No file was provided, this one's all on the environment. Classic."
            .to_string(),
    };

    config.extract().context(context_msg)
}
