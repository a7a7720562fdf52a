use std::collections::VecDeque;
use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, error, info};

use crate::backends::Source;

// -- 📂 FileSourceConfig: one path. A file means one message, a directory means one per *.xml.
#[derive(Debug, Deserialize, Clone)]
pub struct FileSourceConfig {
    pub path: PathBuf,
}

/// 📂 Replays captured incident documents from disk, one file per message.
///
/// The file list is resolved once, at construction. Files that appear later are not
/// picked up; this is a replay tool, not a directory watcher.
#[derive(Debug)]
pub(crate) struct FileSource {
    pending: VecDeque<PathBuf>,
}

impl FileSource {
    pub(crate) async fn new(config: FileSourceConfig) -> Result<Self> {
        let metadata = tokio::fs::metadata(&config.path).await.with_context(|| {
            format!(
                "💀 The source path '{}' could not be inspected. We stared at the path. \
                 The path stared back. One of us was wrong about whether it existed.",
                config.path.display()
            )
        })?;

        let pending = if metadata.is_dir() {
            let mut entries = tokio::fs::read_dir(&config.path).await.with_context(|| {
                format!("💀 Could not list the directory '{}'", config.path.display())
            })?;
            let mut xml_files = Vec::new();
            while let Some(entry) = entries
                .next_entry()
                .await
                .context("💀 Directory listing broke halfway through")?
            {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "xml") {
                    xml_files.push(path);
                } else {
                    debug!("🙈 skipping non-XML file {}", path.display());
                }
            }
            // 📐 name order = replay order
            xml_files.sort();
            xml_files
        } else {
            vec![config.path.clone()]
        };

        info!(
            "📂 file source ready: {} message file(s) from {}",
            pending.len(),
            config.path.display()
        );
        Ok(Self {
            pending: pending.into(),
        })
    }
}

#[async_trait]
impl Source for FileSource {
    async fn next_message(&mut self) -> Result<Option<String>> {
        while let Some(path) = self.pending.pop_front() {
            match tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("💀 Failed to read message file '{}'", path.display()))
            {
                Ok(xml_text) => {
                    debug!("📄 read {} ({} bytes)", path.display(), xml_text.len());
                    return Ok(Some(xml_text));
                }
                // 🗑️ a bad file is a dropped message; the rest of the directory still replays
                Err(err) => error!("{err:#}"),
            }
        }
        Ok(None)
    }
}
