//! 🚆 railx: UK rail incident ingestion.
//!
//! 🎬 National Rail publishes every disruption as a namespaced XML document on a STOMP
//! topic. This crate turns each one into flat rows (one per affected operator and
//! route), texts the subscribers of each affected operator, and stores the rows
//! somewhere a dashboard can read them.
//!
//! Two ways in:
//! - [`process_message`] / [`IncidentPipeline`]: the pure core. XML text in, rows out.
//! - [`run`]: the whole service. Config in, source → pipeline → sink until the source runs dry.
//!
//! 🦆

pub mod app_config;
pub mod backends;
pub mod common;
pub mod notifiers;
pub mod pipeline;
pub(crate) mod progress;
pub(crate) mod supervisors;
pub mod transforms;

use anyhow::{Context, Result};

use crate::app_config::AppConfig;
use crate::supervisors::Supervisor;

pub use common::{
    AffectedOperator, FlatIncidentRow, IncidentRecord, RawIncident, compare_versions,
    latest_version_rows,
};
pub use pipeline::{IncidentPipeline, process_message};
pub use progress::StatsSnapshot;

/// 🚀 Run the pipeline described by `app_config` until its source ends.
///
/// With a STOMP source and the default reconnect policy that is "never", so this is
/// the long-running service entry point. Returns the final counters.
pub async fn run(app_config: AppConfig) -> Result<StatsSnapshot> {
    Supervisor::new(app_config)
        .run()
        .await
        .context("💀 The incident pipeline stopped with an error")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_config::{RuntimeConfig, SinkConfig, SourceConfig};
    use crate::backends::{FileSinkConfig, FileSourceConfig};

    #[tokio::test]
    async fn the_one_where_a_folder_of_xml_becomes_a_file_of_rows() -> Result<()> {
        let the_inbox = tempfile::tempdir()?;
        std::fs::write(
            the_inbox.path().join("001.xml"),
            backends::in_mem::SAMPLE_INCIDENT_XML,
        )?;
        std::fs::write(the_inbox.path().join("002.xml"), "not even close to xml")?;
        // 🗑️ unreadable as text: skipped by the source, the rest of the folder still runs
        std::fs::write(the_inbox.path().join("000.xml"), [0xff, 0xfe])?;
        let the_output = the_inbox.path().join("out").with_extension("ndjson");

        let the_stats = run(AppConfig {
            source_config: SourceConfig::File(FileSourceConfig {
                path: the_inbox.path().to_path_buf(),
            }),
            sink_config: SinkConfig::File(FileSinkConfig {
                file_name: the_output.to_string_lossy().into_owned(),
            }),
            notifier_config: Default::default(),
            parser: Default::default(),
            runtime: RuntimeConfig::default(),
        })
        .await?;

        assert_eq!(the_stats.messages_processed, 1);
        assert_eq!(the_stats.messages_dropped, 1);
        assert_eq!(the_stats.rows_written, 2);

        let the_lines = std::fs::read_to_string(&the_output)?;
        let the_rows = the_lines
            .lines()
            .map(serde_json::from_str::<FlatIncidentRow>)
            .collect::<Result<Vec<_>, _>>()?;
        let the_operators: Vec<Option<&str>> = the_rows
            .iter()
            .map(|row| row.affected_operator_ref.as_deref())
            .collect();
        assert_eq!(the_operators, vec![Some("LE"), Some("SX")]);
        Ok(())
    }

    #[tokio::test]
    async fn the_one_where_the_in_memory_smoke_test_just_works() -> Result<()> {
        let the_stats = run(AppConfig {
            source_config: SourceConfig::InMemory,
            sink_config: SinkConfig::InMemory,
            notifier_config: Default::default(),
            parser: Default::default(),
            runtime: RuntimeConfig::default(),
        })
        .await?;

        assert_eq!(the_stats.messages_received, 1);
        assert_eq!(the_stats.rows_written, 2);
        Ok(())
    }
}
