//! 🧵 Workers: the ones who actually do the work while the Supervisor takes all the
//! credit in the sprint retro. 🦆

use anyhow::Result;
use tokio::task::JoinHandle;

mod pipeline_worker;
mod source_worker;

pub(crate) use pipeline_worker::PipelineWorker;
pub(crate) use source_worker::SourceWorker;

/// 🏗️ A background worker, that does work. duh.
///
/// Returns a JoinHandle because we trust but verify. Mostly verify.
pub(crate) trait Worker {
    fn start(self) -> JoinHandle<Result<()>>;
}
