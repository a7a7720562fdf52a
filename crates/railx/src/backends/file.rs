//! 📂 Previously, on "Things That Could Go Wrong With A File"...
//!
//! The disk was quiet. Too quiet. A lone process had been tasked with replaying a
//! folder of captured incident XML. Simple, they said. The folder had a `.DS_Store`
//! in it. Of course it did.
//!
//! This module handles file-based I/O for railx. The source reads one XML file, or
//! every `*.xml` in a directory sorted by name, one message per file. The sink writes
//! flattened rows as NDJSON through a `BufWriter`, so we're not doing a syscall per row
//! like some kind of 1995 CGI script.
//!
//! 🚰 *.xml → FileSource → pipeline → FileSink → BufWriter → rows.ndjson
//! 💀 Disk full → your problem now
//! 🦆 (mandatory, no notes)

mod file_sink;
mod file_source;

pub(crate) use file_sink::FileSink;
pub use file_sink::FileSinkConfig;
pub(crate) use file_source::FileSource;
pub use file_source::FileSourceConfig;
