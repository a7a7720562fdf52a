use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::backends::Sink;
use crate::common::{FlatIncidentRow, latest_version_rows};

/// 📦 A sink that never forgets. Unless it already remembers, in which case it ignores you.
///
/// Rows go into a shared Vec wrapped in a Mutex wrapped in an Arc. Clone-able because
/// tests need to peek inside after handing `self` off to the pipeline.
///
/// 🔑 Idempotent on (incident_number, version): a row whose key is already stored is
/// skipped, the in-memory cousin of `INSERT ... ON CONFLICT DO NOTHING`. Rows with
/// neither half of the key are always stored.
#[derive(Debug, Default, Clone)]
pub(crate) struct InMemorySink {
    pub(crate) received: Arc<Mutex<Vec<FlatIncidentRow>>>,
}

impl InMemorySink {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// 📋 Everything stored so far, every version, arrival order.
    pub(crate) async fn rows(&self) -> Vec<FlatIncidentRow> {
        self.received.lock().await.clone()
    }

    /// 🏁 The read-side view: only the latest version of each incident.
    pub(crate) async fn latest(&self) -> Vec<FlatIncidentRow> {
        latest_version_rows(&self.received.lock().await)
    }
}

#[async_trait]
impl Sink for InMemorySink {
    async fn send(&mut self, rows: Vec<FlatIncidentRow>) -> Result<()> {
        // 🔒 The Mutex is load-bearing. Do not remove. I know it looks optional. It isn't.
        let mut stored = self.received.lock().await;
        let offered = rows.len();
        let unidentified = rows.iter().filter(|row| row.is_unidentified()).count();
        if unidentified > 0 {
            warn!("🫥 storing {unidentified} row(s) with no incident number or version, duplicates can't be detected");
        }
        let fresh: Vec<FlatIncidentRow> = rows
            .into_iter()
            .filter(|row| {
                row.is_unidentified()
                    || !stored
                        .iter()
                        .any(|kept| kept.version_key() == row.version_key())
            })
            .collect();

        if fresh.len() < offered {
            debug!(
                "🔁 skipped {} row(s) for a version we already have",
                offered - fresh.len()
            );
        }
        stored.extend(fresh);
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        // 🗑️ Nothing to flush. We live in RAM. Just report what's in the vault.
        debug!(
            "📦 in-memory sink closing with {} row(s), {} of them in the latest versions",
            self.rows().await.len(),
            self.latest().await.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(version: &str, operator: &str) -> FlatIncidentRow {
        FlatIncidentRow {
            creation_time: None,
            incident_number: Some("INC1".to_string()),
            version: Some(version.to_string()),
            planned: Some(false),
            start_time: None,
            end_time: None,
            info_link: None,
            summary: Some("Signalling fault".to_string()),
            incident_priority: Some(1),
            affected_operator_ref: Some(operator.to_string()),
            affected_operator_name: None,
            route_affected: "Route A".to_string(),
        }
    }

    #[tokio::test]
    async fn the_one_where_the_same_version_twice_is_stored_once() -> Result<()> {
        let mut the_sink = InMemorySink::new();
        let the_peek = the_sink.clone();

        the_sink.send(vec![row("1", "LE"), row("1", "SX")]).await?;
        the_sink.send(vec![row("1", "LE"), row("1", "SX")]).await?;

        assert_eq!(the_peek.rows().await.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn the_one_where_old_and_new_versions_coexist_but_only_one_is_latest() -> Result<()> {
        let mut the_sink = InMemorySink::new();
        // 📬 v2 shows up first, v1 straggles in afterwards. Both get stored.
        the_sink.send(vec![row("2", "LE")]).await?;
        the_sink.send(vec![row("1", "LE"), row("1", "SX")]).await?;
        the_sink.close().await?;

        assert_eq!(the_sink.rows().await.len(), 3);
        let the_latest = the_sink.latest().await;
        assert_eq!(the_latest.len(), 1);
        assert_eq!(the_latest[0].version.as_deref(), Some("2"));
        Ok(())
    }

    #[tokio::test]
    async fn the_one_where_anonymous_incidents_are_not_mistaken_for_each_other() -> Result<()> {
        let anonymous = |summary: &str| FlatIncidentRow {
            incident_number: None,
            version: None,
            summary: Some(summary.to_string()),
            ..row("1", "LE")
        };
        let mut the_sink = InMemorySink::new();
        the_sink.send(vec![anonymous("Flooding at Ely")]).await?;
        the_sink.send(vec![anonymous("Trespass at Harlow")]).await?;

        assert_eq!(the_sink.rows().await.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn the_one_where_an_empty_batch_changes_nothing() -> Result<()> {
        let mut the_sink = InMemorySink::new();
        the_sink.send(Vec::new()).await?;
        assert!(the_sink.rows().await.is_empty());
        Ok(())
    }
}
