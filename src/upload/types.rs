//! Multipart upload types

use serde::{Deserialize, Serialize};

/// Fixed slice size for multipart uploads: 1 MiB per part.
///
/// Not configurable. Callers drive the part loop themselves, advancing the
/// offset by the previous part's size until `last` is reported.
pub const SLICE_SIZE: u64 = 1024 * 1024;

/// Session identifiers returned by [`init_upload`](super::init_upload).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiatedUpload {
    pub upload_id: String,
    pub bucket: String,
    pub key: String,
}

/// A part the store has already received for a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedPart {
    pub part_number: i32,
    pub size: u64,
    /// Opaque verification token; preserved byte-for-byte through completion.
    pub e_tag: String,
}

/// Outcome of a single part upload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartUpload {
    pub part_number: i32,
    pub file_size: u64,
    pub part_size: u64,
    pub e_tag: String,
    /// True iff this part reaches the end of the source file.
    pub last: bool,
}

/// Final object identity after completion.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedUpload {
    pub key: String,
    pub e_tag: String,
}
