//! 📨 STOMP 1.2 frames: encode what we send, decode what the broker throws at us.
//!
//! ```text
//! COMMAND\n
//! header1:value1\n
//! header2:value2\n
//! \n
//! body bytes...\0
//! ```
//!
//! Bare EOLs between frames are heart-beats and get skipped. When a
//! `content-length` header is present the body is exactly that many bytes
//! (NULs allowed inside); otherwise the body runs to the first NUL.

use anyhow::{Context, Result, bail};
use memchr::{memchr, memmem};

/// 📏 Largest frame we are willing to buffer. Incident documents are a few KB.
pub(crate) const MAX_FRAME_BYTES: usize = 16 * 1024 * 1024;

/// 📨 One STOMP frame. Headers keep wire order; the first occurrence of a name wins.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct Frame {
    pub(crate) command: String,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: Vec<u8>,
}

impl Frame {
    pub(crate) fn new(command: &str) -> Self {
        Self {
            command: command.to_string(),
            ..Self::default()
        }
    }

    /// 🏷️ Builder-style header append.
    pub(crate) fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub(crate) fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// 📤 Serialize to wire bytes, NUL terminator included.
    ///
    /// CONNECT frames are sent unescaped, as STOMP 1.2 requires.
    pub(crate) fn encode(&self) -> Vec<u8> {
        let escape_headers = self.command != "CONNECT" && self.command != "CONNECTED";
        let mut wire = Vec::with_capacity(self.command.len() + self.body.len() + 64);
        wire.extend_from_slice(self.command.as_bytes());
        wire.push(b'\n');
        for (name, value) in &self.headers {
            if escape_headers {
                wire.extend_from_slice(escape(name).as_bytes());
                wire.push(b':');
                wire.extend_from_slice(escape(value).as_bytes());
            } else {
                wire.extend_from_slice(name.as_bytes());
                wire.push(b':');
                wire.extend_from_slice(value.as_bytes());
            }
            wire.push(b'\n');
        }
        wire.push(b'\n');
        wire.extend_from_slice(&self.body);
        wire.push(0);
        wire
    }
}

fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            ':' => escaped.push_str("\\c"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn unescape(raw: &str) -> Result<String> {
    let mut unescaped = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            unescaped.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => unescaped.push('\\'),
            Some('n') => unescaped.push('\n'),
            Some('r') => unescaped.push('\r'),
            Some('c') => unescaped.push(':'),
            other => bail!("💀 Undefined STOMP header escape sequence '\\{}'", other.unwrap_or(' ')),
        }
    }
    Ok(unescaped)
}

/// 📥 Try to decode one frame from the front of `buf`.
///
/// Returns `Ok(None)` when more bytes are needed, otherwise the frame and the number
/// of bytes consumed (leading heart-beat EOLs included). A decoded `None` frame with
/// a non-zero count means "only heart-beats so far, drop these bytes".
pub(crate) fn try_decode(buf: &[u8]) -> Result<Option<(Option<Frame>, usize)>> {
    let leading_eols = buf
        .iter()
        .take_while(|byte| **byte == b'\n' || **byte == b'\r')
        .count();
    let rest = &buf[leading_eols..];
    if rest.is_empty() {
        return Ok(if leading_eols == 0 {
            None
        } else {
            Some((None, leading_eols))
        });
    }

    // 🔍 headers end at the first blank line, LF or CRLF flavoured
    let (header_block, body_start) = match memmem::find(rest, b"\n\n") {
        Some(lf) => match memmem::find(rest, b"\r\n\r\n") {
            Some(crlf) if crlf < lf => (&rest[..crlf], crlf + 4),
            _ => (&rest[..lf], lf + 2),
        },
        None => match memmem::find(rest, b"\r\n\r\n") {
            Some(crlf) => (&rest[..crlf], crlf + 4),
            None if rest.len() > MAX_FRAME_BYTES => {
                bail!("💀 STOMP frame headers ran past {MAX_FRAME_BYTES} bytes without ending")
            }
            None => return Ok(None),
        },
    };

    let header_text = std::str::from_utf8(header_block)
        .context("💀 STOMP frame headers are not valid UTF-8")?;
    let mut lines = header_text.lines();
    let command = lines
        .next()
        .map(|line| line.trim_end_matches('\r').to_string())
        .unwrap_or_default();
    let escaped = command != "CONNECT" && command != "CONNECTED";

    let mut headers = Vec::new();
    for line in lines {
        let line = line.trim_end_matches('\r');
        let (name, value) = line
            .split_once(':')
            .with_context(|| format!("💀 STOMP header line without a colon: '{line}'"))?;
        if escaped {
            headers.push((unescape(name)?, unescape(value)?));
        } else {
            headers.push((name.to_string(), value.to_string()));
        }
    }

    let content_length = headers
        .iter()
        .find(|(name, _)| name == "content-length")
        .map(|(_, value)| value.trim().parse::<usize>())
        .transpose()
        .context("💀 STOMP content-length header is not a number")?;

    let body_region = &rest[body_start..];
    let (body, consumed_after_headers) = match content_length {
        Some(length) => {
            if length > MAX_FRAME_BYTES {
                bail!("💀 STOMP content-length {length} is over the {MAX_FRAME_BYTES} byte frame limit");
            }
            let Some(with_terminator) = length.checked_add(1) else {
                bail!("💀 STOMP content-length {length} leaves no room for the NUL terminator");
            };
            if body_region.len() < with_terminator {
                return Ok(None);
            }
            if body_region[length] != 0 {
                bail!("💀 STOMP frame body is not NUL-terminated after content-length bytes");
            }
            (body_region[..length].to_vec(), length + 1)
        }
        None => match memchr(0, body_region) {
            Some(nul) => (body_region[..nul].to_vec(), nul + 1),
            None if body_region.len() > MAX_FRAME_BYTES => {
                bail!("💀 STOMP frame body ran past {MAX_FRAME_BYTES} bytes without a NUL")
            }
            None => return Ok(None),
        },
    };

    let frame = Frame {
        command,
        headers,
        body,
    };
    Ok(Some((
        Some(frame),
        leading_eols + body_start + consumed_after_headers,
    )))
}
