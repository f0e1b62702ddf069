//! Multipart upload operations against the store (one round trip each)

use std::path::Path;

use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart};
use aws_sdk_s3::Client;
use log::debug;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt, SeekFrom};

use super::types::{CompletedUpload, InitiatedUpload, PartUpload, UploadedPart, SLICE_SIZE};
use crate::error::{classify_sdk_error, TransferError, TransferResult};

/// Begin a multipart upload session for `bucket`/`key`.
pub async fn init_upload(
    client: &Client,
    bucket: &str,
    key: &str,
) -> TransferResult<InitiatedUpload> {
    let response = client
        .create_multipart_upload()
        .bucket(bucket)
        .key(key)
        .send()
        .await
        .map_err(classify_sdk_error)?;

    let upload_id = response
        .upload_id()
        .ok_or_else(|| TransferError::Service {
            code: None,
            message: "initiate returned no upload id".to_string(),
        })?
        .to_string();

    debug!("multipart {}: initiated for {}/{}", upload_id, bucket, key);
    Ok(InitiatedUpload {
        upload_id,
        bucket: response.bucket().unwrap_or(bucket).to_string(),
        key: response.key().unwrap_or(key).to_string(),
    })
}

/// List the parts the store has recorded for a session, for resuming an
/// interrupted upload. Follows truncated listings until the store reports the
/// final page; the store caps a page at 1000 parts. A part record missing its
/// number, size, or eTag fails the whole call rather than producing partial
/// results.
pub async fn list_parts(
    client: &Client,
    bucket: &str,
    key: &str,
    upload_id: &str,
) -> TransferResult<Vec<UploadedPart>> {
    let mut parts = Vec::new();
    let mut part_number_marker: Option<String> = None;

    loop {
        let mut request = client
            .list_parts()
            .bucket(bucket)
            .key(key)
            .upload_id(upload_id);

        if let Some(marker) = &part_number_marker {
            request = request.part_number_marker(marker);
        }

        let response = request.send().await.map_err(classify_sdk_error)?;
        let is_truncated = response.is_truncated().unwrap_or(false);
        let next_marker = response.next_part_number_marker().map(|s| s.to_string());

        for part in response.parts() {
            let part_number = part
                .part_number()
                .ok_or_else(|| malformed_part("part number"))?;
            let size = part.size().ok_or_else(|| malformed_part("size"))?;
            let size = u64::try_from(size).map_err(|_| malformed_part("size"))?;
            let e_tag = part
                .e_tag()
                .ok_or_else(|| malformed_part("eTag"))?
                .to_string();
            parts.push(UploadedPart {
                part_number,
                size,
                e_tag,
            });
        }

        if !is_truncated {
            break;
        }

        // A truncated listing without a continuation marker cannot be
        // followed; treating it as complete would resume at the wrong offset.
        part_number_marker = match next_marker {
            Some(marker) => Some(marker),
            None => {
                return Err(TransferError::Service {
                    code: None,
                    message: "truncated part listing without a continuation marker".to_string(),
                })
            }
        };
    }

    Ok(parts)
}

fn malformed_part(field: &str) -> TransferError {
    TransferError::Client(format!("list parts returned a part without a valid {field}"))
}

/// Slice length starting at `offset`, and whether that slice reaches the end
/// of the file: `min(file_size - offset, SLICE_SIZE)`.
pub(crate) fn slice_bounds(file_size: u64, offset: u64) -> (u64, bool) {
    let remaining = file_size.saturating_sub(offset);
    let part_size = remaining.min(SLICE_SIZE);
    (part_size, offset + part_size >= file_size)
}

/// Upload one slice of a local file as `part_number`.
///
/// Reads exactly `min(remaining, 1 MiB)` bytes at `offset`. For a zero-byte
/// file the single (empty) part reports `last = true` immediately.
pub async fn upload_part(
    client: &Client,
    bucket: &str,
    key: &str,
    upload_id: &str,
    part_number: i32,
    file_path: &Path,
    offset: u64,
) -> TransferResult<PartUpload> {
    let local = |source: std::io::Error| TransferError::LocalFile {
        path: file_path.to_path_buf(),
        source,
    };

    let metadata = tokio::fs::metadata(file_path).await.map_err(local)?;
    let file_size = metadata.len();
    let (part_size, last) = slice_bounds(file_size, offset);

    let mut file = File::open(file_path).await.map_err(local)?;
    file.seek(SeekFrom::Start(offset)).await.map_err(local)?;
    let mut buffer = vec![0u8; part_size as usize];
    file.read_exact(&mut buffer).await.map_err(local)?;

    let response = client
        .upload_part()
        .bucket(bucket)
        .key(key)
        .upload_id(upload_id)
        .part_number(part_number)
        .body(ByteStream::from(buffer))
        .send()
        .await
        .map_err(classify_sdk_error)?;

    let e_tag = response.e_tag().unwrap_or_default().to_string();
    debug!(
        "multipart {}: part {} uploaded ({} bytes, last={})",
        upload_id, part_number, part_size, last
    );

    Ok(PartUpload {
        part_number,
        file_size,
        part_size,
        e_tag,
        last,
    })
}

/// Finalize a session. The store verifies every supplied (partNumber, eTag)
/// pair against what it received and rejects the whole request on mismatch.
pub async fn complete_upload(
    client: &Client,
    bucket: &str,
    key: &str,
    upload_id: &str,
    parts: &[UploadedPart],
) -> TransferResult<CompletedUpload> {
    let completed_parts: Vec<CompletedPart> = parts
        .iter()
        .map(|part| {
            CompletedPart::builder()
                .part_number(part.part_number)
                .e_tag(part.e_tag.clone())
                .build()
        })
        .collect();

    let completed_upload = CompletedMultipartUpload::builder()
        .set_parts(Some(completed_parts))
        .build();

    let response = client
        .complete_multipart_upload()
        .bucket(bucket)
        .key(key)
        .upload_id(upload_id)
        .multipart_upload(completed_upload)
        .send()
        .await
        .map_err(classify_sdk_error)?;

    Ok(CompletedUpload {
        key: response.key().unwrap_or(key).to_string(),
        e_tag: response.e_tag().unwrap_or_default().to_string(),
    })
}

/// Discard a session and any uploaded-but-uncommitted parts. Aborting a
/// session the store no longer knows surfaces as a service fault.
pub async fn abort_upload(
    client: &Client,
    bucket: &str,
    key: &str,
    upload_id: &str,
) -> TransferResult<()> {
    client
        .abort_multipart_upload()
        .bucket(bucket)
        .key(key)
        .upload_id(upload_id)
        .send()
        .await
        .map_err(classify_sdk_error)?;

    debug!("multipart {}: aborted", upload_id);
    Ok(())
}
