//! 📡 STOMP backend: the National Rail Knowledgebase incident feed, live off the wire.
//!
//! 🎬 The broker speaks STOMP 1.2 over plain TCP. We CONNECT, SUBSCRIBE to a durable
//! topic, and then sit there like a dog at the window waiting for MESSAGE frames.
//! Every MESSAGE body is one incident document.
//!
//! ```text
//!   TcpStream ──▶ frame::try_decode ──▶ MESSAGE body ──▶ (gunzip?) ──▶ String ──▶ channel
//!        ▲                                                                      │
//!        └──────────── reconnect::ReconnectPolicy ◀── disconnect / ERROR ◀──────┘
//! ```

mod frame;
mod reconnect;
mod stomp_source;

pub use reconnect::ReconnectPolicy;
pub(crate) use stomp_source::StompSource;
pub use stomp_source::StompSourceConfig;
