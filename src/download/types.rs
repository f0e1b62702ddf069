//! Download task types

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Write buffer size for download streaming (2 MiB) - reduces I/O operations
pub(crate) const WRITE_BUFFER_SIZE: usize = 2 * 1024 * 1024;

/// Lifetime of the presigned URL backing a download GET.
pub(crate) const DOWNLOAD_URL_TTL_SECS: u64 = 3600;

/// A download to run, keyed by a caller-chosen request id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadRequest {
    /// Opaque id; the caller keeps it unique among live transfers.
    pub request_id: String,
    pub bucket: String,
    pub key: String,
    /// Destination file. Parent directories are created as needed.
    pub file_path: PathBuf,
}

/// Lifecycle of a registered download. Terminal outcomes (completed, failed,
/// cancelled) evict the registry entry instead of being represented here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Running,
    Paused,
}
