//! # Previously, on railx...
//!
//! 🎬 The incidents were trapped. Somewhere between a STOMP broker and a database,
//! a test needed to run without either. Someone had to be brave. Someone had to write
//! a backend so simple it lives entirely in RAM, gone the moment you blink.
//!
//! That someone was this module.
//!
//! `in_mem` provides an in-memory [`Source`](crate::backends::Source) and
//! [`Sink`](crate::backends::Sink) for testing and local development. The
//! [`InMemorySource`] hands out a fixed list of XML messages and then, like my
//! motivation on a Friday afternoon, yields nothing further. The [`InMemorySink`]
//! collects rows behind an `Arc<Mutex<...>>` so callers can inspect what arrived.
//!
//! ⚠️ This is NOT for production. If you're deploying this to prod, please also
//! deploy a therapist. 🦆

mod in_mem_sink;
mod in_mem_source;

pub(crate) use in_mem_sink::InMemorySink;
pub(crate) use in_mem_source::InMemorySource;
pub use in_mem_source::SAMPLE_INCIDENT_XML;
