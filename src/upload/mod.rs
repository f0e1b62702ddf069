//! Multipart upload coordinator
//!
//! Thin shim over the store's four-phase multipart protocol (initiate, list
//! parts, upload part, complete/abort). The coordinator keeps no state of its
//! own; everything needed to resume an interrupted session is re-derivable
//! from [`list_parts`] or held by the caller.

mod driver;
mod multipart;
mod types;

pub use driver::{upload_object, PauseToken, ProgressFn, UploadRequest, UploadStatus};
pub use multipart::{abort_upload, complete_upload, init_upload, list_parts, upload_part};
pub use types::{CompletedUpload, InitiatedUpload, PartUpload, UploadedPart, SLICE_SIZE};
