//! Multipart upload and resumable download bridge for Tencent Cloud COS.
//!
//! The store is driven through its S3-compatible API via `aws-sdk-s3`, which
//! owns transport, signing, and retries. This crate owns only the transfer
//! lifecycle: the multipart upload protocol (init, list parts, upload part
//! until `last`, complete or abort), a request-id-keyed download registry with
//! pause/resume/cancel, and the progress/result event stream back to the
//! embedding application.
//!
//! ```no_run
//! use cos_transfer::{
//!     create_cos_client, CosConfig, CredentialSource, DownloadRequest, PlainCredentials,
//!     TransferManager,
//! };
//!
//! # async fn run() -> Result<(), cos_transfer::TransferError> {
//! let client = create_cos_client(
//!     &CosConfig::new("ap-guangzhou"),
//!     CredentialSource::Plain(PlainCredentials {
//!         secret_id: "id".into(),
//!         secret_key: "key".into(),
//!     }),
//! );
//! let (manager, mut events) = TransferManager::new(client);
//! manager
//!     .download(DownloadRequest {
//!         request_id: "req-1".into(),
//!         bucket: "media".into(),
//!         key: "videos/clip.mp4".into(),
//!         file_path: "/tmp/clip.mp4".into(),
//!     })
//!     .await?;
//! while let Some(event) = events.recv().await {
//!     println!("{event:?}");
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod events;
mod file_info;

pub mod download;
pub mod upload;

pub use client::{
    create_cos_client, CosConfig, CredentialSource, PlainCredentials, SessionCredentialProvider,
    SessionCredentials, PLAIN_CREDENTIAL_TTL_SECS,
};
pub use download::{DownloadRequest, TaskState, TransferManager};
pub use error::{TransferError, TransferResult};
pub use events::{DownloadResultUpdate, ProgressUpdate, TransferEvent};
pub use file_info::{get_file_info, mime_for_path, FileInfo, UNKNOWN_MIME};
pub use upload::{
    abort_upload, complete_upload, init_upload, list_parts, upload_object, upload_part,
    CompletedUpload, InitiatedUpload, PartUpload, PauseToken, ProgressFn, UploadRequest,
    UploadStatus, UploadedPart, SLICE_SIZE,
};
