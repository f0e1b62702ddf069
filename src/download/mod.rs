//! Resumable download manager
//!
//! Streams objects to disk through presigned GETs with cooperative
//! pause/resume/cancel per request id, pushing progress and terminal-result
//! events to the embedding application over a channel.

mod manager;
mod presigned;
mod types;
mod worker;

pub use manager::TransferManager;
pub use types::{DownloadRequest, TaskState};
