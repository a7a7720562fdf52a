use std::io::Read;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use flate2::read::GzDecoder;
use serde::Deserialize;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, error, info, warn};

use super::frame::{self, Frame};
use super::reconnect::ReconnectPolicy;
use crate::backends::Source;

fn default_port() -> u16 {
    61613
}

fn default_topic() -> String {
    "/topic/kb.incidents".to_string()
}

fn default_client_id() -> String {
    "railx".to_string()
}

// -- 📡 StompSourceConfig: where the incidents live, and who we claim to be when we ask for them.
// -- Lives next to the StompSource, same as every other backend config in here.
#[derive(Debug, Deserialize, Clone)]
pub struct StompSourceConfig {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// 🔒 Open Data username. The broker uses it for `login` and in the durable client id.
    pub username: String,
    /// 🔒 "password123" is not a password. It is a confession.
    pub password: String,
    #[serde(default = "default_topic")]
    pub topic: String,
    /// 🏷️ Suffix of the durable subscription name. Keep it stable across restarts or
    /// the broker forgets what you missed.
    #[serde(default = "default_client_id")]
    pub client_id: String,
    #[serde(default)]
    pub reconnect: ReconnectPolicy,
}

/// 🔌 One live STOMP connection: a socket plus whatever bytes arrived ahead of a full frame.
#[derive(Debug)]
pub(crate) struct StompConnection {
    stream: TcpStream,
    buffer: Vec<u8>,
}

impl StompConnection {
    pub(crate) fn from_stream(stream: TcpStream) -> Self {
        Self {
            stream,
            buffer: Vec::with_capacity(64 * 1024),
        }
    }

    /// 🤝 Dial, CONNECT, wait for CONNECTED, SUBSCRIBE. In that order, no shortcuts.
    async fn open(config: &StompSourceConfig) -> Result<Self> {
        let stream = TcpStream::connect((config.host.as_str(), config.port))
            .await
            .with_context(|| {
                format!(
                    "💀 Could not reach the STOMP broker at {}:{}. tcp connect error, \
                     the socket said no before we even said hello.",
                    config.host, config.port
                )
            })?;
        let mut connection = Self::from_stream(stream);

        let durable_client_id = format!("{}-{}", config.username, config.client_id);
        connection
            .write_frame(
                &Frame::new("CONNECT")
                    .header("accept-version", "1.2")
                    .header("host", &config.host)
                    .header("login", &config.username)
                    .header("passcode", &config.password)
                    .header("heart-beat", "0,0")
                    .header("client-id", &durable_client_id),
            )
            .await?;

        match connection.read_frame().await? {
            Some(reply) if reply.command == "CONNECTED" => {
                debug!("🤝 broker says CONNECTED, version {:?}", reply.get_header("version"));
            }
            Some(reply) if reply.command == "ERROR" => bail!(
                "💀 The broker refused the CONNECT: {} {}",
                reply.get_header("message").unwrap_or("(no message header)"),
                String::from_utf8_lossy(&reply.body)
            ),
            Some(reply) => bail!(
                "💀 Expected CONNECTED from the broker, got '{}' instead",
                reply.command
            ),
            None => bail!("💀 The broker hung up during the STOMP handshake"),
        }

        connection
            .write_frame(
                &Frame::new("SUBSCRIBE")
                    .header("destination", &config.topic)
                    .header("id", "1")
                    .header("ack", "auto")
                    .header("activemq.subscriptionName", &config.client_id),
            )
            .await?;

        info!("📡 subscribed to {} on {}:{}", config.topic, config.host, config.port);
        Ok(connection)
    }

    /// 📥 Next complete frame, skipping heart-beats. `None` means the peer closed the socket.
    pub(crate) async fn read_frame(&mut self) -> Result<Option<Frame>> {
        loop {
            if let Some((decoded, used)) = frame::try_decode(&self.buffer)? {
                self.buffer.drain(..used);
                match decoded {
                    Some(frame) => return Ok(Some(frame)),
                    None => continue,
                }
            }

            let mut chunk = [0u8; 8192];
            let read = self
                .stream
                .read(&mut chunk)
                .await
                .context("💀 Reading from the STOMP socket failed")?;
            if read == 0 {
                return Ok(None);
            }
            self.buffer.extend_from_slice(&chunk[..read]);
        }
    }

    pub(crate) async fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        self.stream
            .write_all(&frame.encode())
            .await
            .with_context(|| format!("💀 Failed to send {} frame to the broker", frame.command))
    }
}

/// 🫁 Message bodies are XML text; some feeds gzip them first. Sniff the magic and cope.
pub(crate) fn decode_body(body: Vec<u8>) -> Result<String> {
    if body.starts_with(&[0x1f, 0x8b]) {
        let mut inflated = String::new();
        GzDecoder::new(body.as_slice())
            .read_to_string(&mut inflated)
            .context("💀 Message body looked gzipped but would not inflate into UTF-8 text")?;
        Ok(inflated)
    } else {
        String::from_utf8(body).context("💀 Message body is not valid UTF-8")
    }
}

/// 📡 StompSource: a durable topic subscription that hands out one message body per call.
///
/// Never ends on its own while the broker is reachable. When the connection drops,
/// the [`ReconnectPolicy`] decides whether to sleep and dial again or end the stream.
#[derive(Debug)]
pub(crate) struct StompSource {
    config: StompSourceConfig,
    connection: Option<StompConnection>,
    failed_attempts: u32,
}

impl StompSource {
    /// 🚀 Connects eagerly so a wrong host or password fails at startup, not at 3am.
    pub(crate) async fn new(config: StompSourceConfig) -> Result<Self> {
        let connection = StompConnection::open(&config).await?;
        Ok(Self {
            config,
            connection: Some(connection),
            failed_attempts: 0,
        })
    }

    /// 🔁 Keep dialing until connected or the policy says stop. `false` = gave up.
    async fn reconnect(&mut self) -> bool {
        loop {
            self.failed_attempts += 1;
            let Some(delay) = self.config.reconnect.next_delay(self.failed_attempts) else {
                warn!(
                    "🛑 not reconnecting to {}:{} after {} attempt(s), ending the stream",
                    self.config.host,
                    self.config.port,
                    self.failed_attempts - 1
                );
                return false;
            };

            warn!("🔌 disconnected, waiting {} seconds before reconnecting", delay.as_secs());
            tokio::time::sleep(delay).await;

            match StompConnection::open(&self.config).await {
                Ok(connection) => {
                    self.failed_attempts = 0;
                    self.connection = Some(connection);
                    return true;
                }
                Err(err) => warn!("💀 reconnect attempt {} failed: {err:#}", self.failed_attempts),
            }
        }
    }
}

#[async_trait]
impl Source for StompSource {
    async fn next_message(&mut self) -> Result<Option<String>> {
        loop {
            if self.connection.is_none() && !self.reconnect().await {
                return Ok(None);
            }
            let Some(connection) = self.connection.as_mut() else {
                continue;
            };

            match connection.read_frame().await {
                Ok(Some(frame)) => match frame.command.as_str() {
                    "MESSAGE" => {
                        debug!(
                            "📨 MESSAGE {:?} ({} bytes)",
                            frame.get_header("message-id"),
                            frame.body.len()
                        );
                        match decode_body(frame.body.clone()) {
                            Ok(body) => return Ok(Some(body)),
                            // 🗑️ one unreadable body is one lost message, not a lost connection
                            Err(err) => error!(
                                "💀 dropping MESSAGE {:?}: {err:#}",
                                frame.get_header("message-id")
                            ),
                        }
                    }
                    "ERROR" => {
                        error!(
                            "💀 broker sent ERROR: {} {}",
                            frame.get_header("message").unwrap_or_default(),
                            String::from_utf8_lossy(&frame.body)
                        );
                        self.connection = None;
                    }
                    other => debug!("🤷 ignoring {other} frame"),
                },
                Ok(None) => {
                    warn!("🔌 the broker closed the connection");
                    self.connection = None;
                }
                Err(err) => {
                    warn!("💀 STOMP connection broke: {err:#}");
                    self.connection = None;
                }
            }
        }
    }
}
