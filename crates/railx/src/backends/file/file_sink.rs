use std::collections::HashSet;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tokio::{
    fs::File,
    io::{self, AsyncWriteExt},
};
use tracing::{debug, trace, warn};

use crate::backends::Sink;
use crate::common::FlatIncidentRow;

// -- 🚰 FileSinkConfig: cousin of FileSourceConfig, equally traumatized by disk full errors.
#[derive(Debug, Deserialize, Clone)]
pub struct FileSinkConfig {
    pub file_name: String,
}

/// 🚰 FileSink: one JSON object per row, one row per line.
///
/// ⚠️ `File::create` truncates if the file exists. No warning. No backup. Just gone.
/// Every version of every incident gets its own lines; readers pick the latest.
/// A redelivered (incident_number, version) already written by this sink is skipped.
#[derive(Debug)]
pub(crate) struct FileSink {
    file_buf: io::BufWriter<File>,
    written_versions: HashSet<(Option<String>, Option<String>)>,
}

impl FileSink {
    pub(crate) async fn new(sink_config: FileSinkConfig) -> Result<Self> {
        let file_handle = File::create(&sink_config.file_name).await.with_context(|| {
            format!(
                "💀 The sink file '{}' could not be conjured into existence. \
                 Perhaps the parent directory doesn't exist. Perhaps permissions \
                 were set by someone who really did not want this file to exist.",
                sink_config.file_name
            )
        })?;
        Ok(Self {
            file_buf: io::BufWriter::new(file_handle),
            written_versions: HashSet::new(),
        })
    }
}

#[async_trait]
impl Sink for FileSink {
    async fn send(&mut self, rows: Vec<FlatIncidentRow>) -> Result<()> {
        trace!("📬 {} row(s) walked into the file sink", rows.len());
        let owned_key =
            |row: &FlatIncidentRow| (row.incident_number.clone(), row.version.clone());
        let offered = rows.len();
        let fresh: Vec<FlatIncidentRow> = rows
            .into_iter()
            .filter(|row| row.is_unidentified() || !self.written_versions.contains(&owned_key(row)))
            .collect();
        if fresh.len() < offered {
            debug!(
                "🔁 skipped {} row(s) for a version already in the file",
                offered - fresh.len()
            );
        }

        for row in &fresh {
            if row.is_unidentified() {
                warn!("🫥 writing a row with no incident number or version, duplicates can't be detected");
            }
            let mut line =
                serde_json::to_string(row).context("💀 A row refused to become JSON")?;
            line.push('\n');
            self.file_buf
                .write_all(line.as_bytes())
                .await
                .context("💀 Writing a row to the sink file failed")?;
        }
        self.written_versions.extend(
            fresh
                .iter()
                .filter(|row| !row.is_unidentified())
                .map(owned_key),
        );
        Ok(())
    }

    /// 🗑️ Flush the BufWriter. Without this your last rows sit in the buffer forever,
    /// warm and cozy, never making it to disk. Don't be Kevin. Always flush.
    async fn close(&mut self) -> Result<()> {
        self.file_buf
            .flush()
            .await
            .context("💀 Error flushing the sink file. The rows could SEE the disk. So close.")
    }
}
