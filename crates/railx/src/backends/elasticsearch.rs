//! # 📡 THE ELASTICSEARCH BACKEND
//!
//! *Previously, on railx...*
//!
//! 🎬 INT. SERVER ROOM, 3:47 AM
//!
//! The dashboard glows amber. Somewhere a signal failed at Shenfield and forty
//! thousand commuters want to know why. The rows are flattened, the NDJSON is
//! rendered, and the cluster answers with a 409. Which, for once, is good news.
//!
//! 🚀 This module sends incident rows into an index with `_bulk` `create` actions.
//! Every row gets a deterministic `_id` built from incident number, version and its
//! position in the batch, so delivering the same version twice bounces off as a
//! conflict instead of duplicating anything. Conflicts are success. Everything else
//! that fails, fails the batch.
//!
//! 🦆 (mandatory duck, no context provided, none shall be requested)

mod elasticsearch_sink;

pub(crate) use elasticsearch_sink::ElasticsearchSink;
pub use elasticsearch_sink::ElasticsearchSinkConfig;
