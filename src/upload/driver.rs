//! Caller-side upload loop: resume, slice, complete

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use aws_sdk_s3::Client;
use log::info;

use super::multipart::{complete_upload, init_upload, list_parts, upload_part};
use super::types::{CompletedUpload, UploadedPart};
use crate::error::TransferResult;

/// Progress callback: (processed bytes, total bytes).
pub type ProgressFn = Box<dyn Fn(u64, u64) + Send + Sync>;

/// Cooperative pause flag shared with a running upload loop.
#[derive(Debug, Default)]
pub struct PauseToken {
    paused: AtomicBool,
}

impl PauseToken {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }
}

/// What to upload and where.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub bucket: String,
    pub key: String,
    pub file_path: PathBuf,
    /// Session to resume. When absent a new session is initiated.
    pub upload_id: Option<String>,
}

/// Where the loop stopped.
#[derive(Debug, Clone)]
pub enum UploadStatus {
    Completed(CompletedUpload),
    /// Paused before completion; pass the upload id back in to resume.
    Paused { upload_id: String },
}

/// Drive a whole multipart upload: initiate (or adopt `upload_id`), list the
/// parts the store already holds, upload the remaining 1 MiB slices in order,
/// then complete.
///
/// The next offset is always the sum of the sizes already uploaded, so a rerun
/// after an interruption picks up exactly where the previous one stopped. The
/// pause token is checked before each part; a paused loop stops without
/// completing and without error.
pub async fn upload_object(
    client: &Client,
    request: &UploadRequest,
    progress: Option<ProgressFn>,
    pause: Option<Arc<PauseToken>>,
) -> TransferResult<UploadStatus> {
    let upload_id = match &request.upload_id {
        Some(upload_id) => upload_id.clone(),
        None => {
            init_upload(client, &request.bucket, &request.key)
                .await?
                .upload_id
        }
    };

    let mut uploaded = list_parts(client, &request.bucket, &request.key, &upload_id).await?;
    let mut part_number = uploaded.len() as i32 + 1;

    loop {
        if pause.as_ref().is_some_and(|token| token.is_paused()) {
            info!("upload {}: paused after {} parts", upload_id, uploaded.len());
            return Ok(UploadStatus::Paused { upload_id });
        }

        let offset: u64 = uploaded.iter().map(|part| part.size).sum();
        let part = upload_part(
            client,
            &request.bucket,
            &request.key,
            &upload_id,
            part_number,
            &request.file_path,
            offset,
        )
        .await?;

        uploaded.push(UploadedPart {
            part_number,
            size: part.part_size,
            e_tag: part.e_tag.clone(),
        });
        if let Some(callback) = &progress {
            callback(offset + part.part_size, part.file_size);
        }

        if part.last {
            break;
        }
        part_number += 1;
    }

    let completed =
        complete_upload(client, &request.bucket, &request.key, &upload_id, &uploaded).await?;
    info!("upload {}: completed as {}", upload_id, completed.key);
    Ok(UploadStatus::Completed(completed))
}
