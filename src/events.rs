//! Event payloads pushed to the embedding application layer

use serde::Serialize;

/// Progress tick for a transfer, keyed by the caller's request id.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdate {
    pub request_id: String,
    pub processed_bytes: u64,
    pub target_bytes: u64,
}

/// Terminal outcome of a download attempt. Emitted exactly once per attempt;
/// pausing is not terminal and emits nothing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadResultUpdate {
    pub request_id: String,
    pub success: bool,
    /// ETag of the downloaded object; empty when the attempt failed.
    pub e_tag: String,
}

/// Everything a [`TransferManager`](crate::TransferManager) pushes over its
/// event channel.
#[derive(Debug, Clone)]
pub enum TransferEvent {
    Progress(ProgressUpdate),
    DownloadResult(DownloadResultUpdate),
}
