use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, trace};

use crate::backends::Sink;
use crate::common::FlatIncidentRow;

fn default_index() -> String {
    "rail-incidents".to_string()
}

// -- 📡 ElasticsearchSinkConfig: the coordinates of the cluster, and the secret handshake.
// -- api_key wins over username/password when both are set.
#[derive(Debug, Deserialize, Clone)]
pub struct ElasticsearchSinkConfig {
    pub url: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_index")]
    pub index: String,
}

impl ElasticsearchSinkConfig {
    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(ref api_key) = self.api_key {
            request.header("Authorization", format!("ApiKey {}", api_key))
        } else if let Some(ref username) = self.username {
            request.basic_auth(username, self.password.as_ref())
        } else {
            request
        }
    }
}

/// 📜 The slice of a `_bulk` response we care about.
#[derive(Debug, Deserialize)]
struct BulkResponse {
    errors: bool,
    #[serde(default)]
    items: Vec<HashMap<String, BulkItem>>,
}

#[derive(Debug, Deserialize)]
struct BulkItem {
    #[serde(default)]
    _id: Option<String>,
    status: u16,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

/// 🆔 `{incident_number}-{version}-{ordinal}`. Same message in, same ids out.
pub(crate) fn document_id(row: &FlatIncidentRow, ordinal: usize) -> String {
    format!(
        "{}-{}-{}",
        row.incident_number.as_deref().unwrap_or("unnumbered"),
        row.version.as_deref().unwrap_or("unversioned"),
        ordinal
    )
}

#[derive(Debug)]
pub(crate) struct ElasticsearchSink {
    client: reqwest::Client,
    sink_config: ElasticsearchSinkConfig,
}

impl ElasticsearchSink {
    /// 🚀 Build the client and knock on the cluster's front door before any rows show up.
    pub(crate) async fn new(config: ElasticsearchSinkConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()
            .context("💀 The HTTP client refused to be born. Probably a cursed TLS setup.")?;

        let response = config
            .authorize(client.get(&config.url))
            .send()
            .await
            .with_context(|| {
                format!(
                    "💀 Reached out to Elasticsearch at '{}' and got ghosted. \
                     Check the URL, check the cluster, check the firewall's mood.",
                    config.url
                )
            })?;
        let status = response.status();
        if !status.is_success() {
            anyhow::bail!(
                "💀 Elasticsearch at '{}' answered the ping with {}. We knocked, it did not let us in.",
                config.url,
                status
            );
        }
        debug!("✅ Elasticsearch is home, rows will go to index '{}'", config.index);

        Ok(Self {
            client,
            sink_config: config,
        })
    }

    fn render_bulk_body(&self, rows: &[FlatIncidentRow]) -> Result<String> {
        let mut body = String::new();
        for (ordinal, row) in rows.iter().enumerate() {
            let action = json!({
                "create": {
                    "_index": self.sink_config.index,
                    "_id": document_id(row, ordinal),
                }
            });
            body.push_str(&action.to_string());
            body.push('\n');
            body.push_str(&serde_json::to_string(row).context("💀 A row refused to become JSON")?);
            body.push('\n');
        }
        Ok(body)
    }

    async fn submit_bulk_request(&self, request_body: String) -> Result<()> {
        let bulk_url = format!("{}/_bulk", self.sink_config.url.trim_end_matches('/'));
        let request = self
            .client
            .post(&bulk_url)
            .header("Content-Type", "application/x-ndjson")
            .body(request_body);

        let response = self
            .sink_config
            .authorize(request)
            .send()
            .await
            .context("💀 The bulk request never made it to Elasticsearch. The network was not vibing with it.")?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .context("💀 Elasticsearch answered but the body got lost on the way back")?;
        if !status.is_success() {
            anyhow::bail!(
                "💀 The bulk request arrived, but Elasticsearch said '{}'. The response read: '{}'.",
                status,
                response_text
            );
        }

        let bulk: BulkResponse = serde_json::from_str(&response_text)
            .context("💀 The _bulk response was not the JSON we were promised")?;
        if !bulk.errors {
            trace!("🚀 bulk request landed, every row is new");
            return Ok(());
        }

        let mut conflicts = 0usize;
        for item in bulk.items.iter().flat_map(|entry| entry.values()) {
            match item.status {
                200..=299 => {}
                409 => conflicts += 1,
                failed_status => anyhow::bail!(
                    "💀 Elasticsearch rejected document {:?} with status {}: {}",
                    item._id,
                    failed_status,
                    item.error.as_ref().map(|e| e.to_string()).unwrap_or_default()
                ),
            }
        }
        debug!("🔁 {conflicts} row(s) were already stored, skipped as duplicates");
        Ok(())
    }
}

#[async_trait]
impl Sink for ElasticsearchSink {
    async fn send(&mut self, rows: Vec<FlatIncidentRow>) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let body = self.render_bulk_body(&rows)?;
        debug!("📡 sending {} row(s), {} bytes, to /_bulk", rows.len(), body.len());
        self.submit_bulk_request(body)
            .await
            .context("💀 The bulk submission stumbled at the finish line")
    }

    async fn close(&mut self) -> Result<()> {
        debug!("🗑️ Elasticsearch sink closing, no buffer to flush");
        Ok(())
    }
}
