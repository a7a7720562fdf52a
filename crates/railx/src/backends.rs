//! 🔌 Backends: where the real I/O happens.
//!
//! 🚰 Source backends pour incident documents in, Sink backends slurp flattened rows out.
//! And in between, we panic! (kidding, we use anyhow)
//!
//! 🎭 This module is the casting agency. Need incidents off a STOMP topic? Out of a
//! directory of XML files? Summoned from the in-memory void for a test? We've got a
//! backend for that. Rows going to Elasticsearch, an NDJSON file, or a Vec you can
//! assert on later? Also covered.
//!
//! # Knowledge Graph 🧠
//! - Pattern: trait → concrete impls → `SourceBackend` / `SinkBackend` enum dispatch
//! - Each backend owns its config struct, right next to the code that reads it
//! - The supervisor builds backends via `from_config` and never learns which one it got
//!
//! 🦆 The duck is here because every file must have one. This is law.

pub(crate) mod elasticsearch;
pub(crate) mod file;
pub(crate) mod in_mem;
mod sink;
mod source;
pub(crate) mod stomp;

pub(crate) use sink::{Sink, SinkBackend};
pub(crate) use source::{Source, SourceBackend};

// 🎯 Re-export backend-specific configs so callers can do `backends::FileSourceConfig`
// instead of spelunking into `backends::file::FileSourceConfig`.
pub use elasticsearch::ElasticsearchSinkConfig;
pub use file::{FileSinkConfig, FileSourceConfig};
pub use in_mem::SAMPLE_INCIDENT_XML;
pub use stomp::{ReconnectPolicy, StompSourceConfig};
