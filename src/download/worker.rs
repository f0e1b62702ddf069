//! Download worker: streams a presigned GET to disk with pause/cancel flags

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use aws_sdk_s3::Client;
use futures_util::StreamExt;
use log::{info, warn};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncSeekExt, AsyncWriteExt, SeekFrom};
use tokio::sync::mpsc::UnboundedSender;

use super::manager::TaskRegistry;
use super::presigned::presigned_get_url;
use super::types::{DownloadRequest, TaskState, DOWNLOAD_URL_TTL_SECS, WRITE_BUFFER_SIZE};
use crate::error::{TransferError, TransferResult};
use crate::events::{DownloadResultUpdate, ProgressUpdate, TransferEvent};

enum WorkerExit {
    Completed { e_tag: String },
    Paused,
    Cancelled,
}

/// Run one download attempt to its end, then reconcile the registry and emit
/// the terminal event. Pausing keeps the registry entry and the partial file
/// and emits nothing; every other exit evicts the entry.
pub(crate) async fn run_download(
    client: Client,
    request: DownloadRequest,
    paused: Arc<AtomicBool>,
    cancelled: Arc<AtomicBool>,
    tasks: TaskRegistry,
    events: UnboundedSender<TransferEvent>,
) {
    let outcome = stream_object(&client, &request, &paused, &cancelled, &events).await;

    match outcome {
        // A cancel can land after the worker decided to park for a pause;
        // honoring the stale pause would strand the task with no terminal
        // event, so the cancel flag is re-checked here.
        Ok(WorkerExit::Paused) if cancelled.load(Ordering::SeqCst) => {
            tasks.lock().await.remove(&request.request_id);
            let _ = tokio::fs::remove_file(&request.file_path).await;
            info!("download {}: cancelled while pausing", request.request_id);
            let _ = events.send(TransferEvent::DownloadResult(DownloadResultUpdate {
                request_id: request.request_id.clone(),
                success: false,
                e_tag: String::new(),
            }));
        }
        Ok(WorkerExit::Paused) => {
            let mut tasks = tasks.lock().await;
            if let Some(handle) = tasks.get_mut(&request.request_id) {
                handle.state = TaskState::Paused;
            }
            info!("download {}: paused", request.request_id);
        }
        Ok(WorkerExit::Completed { e_tag }) => {
            tasks.lock().await.remove(&request.request_id);
            info!("download {}: completed", request.request_id);
            let _ = events.send(TransferEvent::DownloadResult(DownloadResultUpdate {
                request_id: request.request_id.clone(),
                success: true,
                e_tag,
            }));
        }
        Ok(WorkerExit::Cancelled) => {
            tasks.lock().await.remove(&request.request_id);
            let _ = tokio::fs::remove_file(&request.file_path).await;
            info!("download {}: cancelled", request.request_id);
            let _ = events.send(TransferEvent::DownloadResult(DownloadResultUpdate {
                request_id: request.request_id.clone(),
                success: false,
                e_tag: String::new(),
            }));
        }
        Err(error) => {
            tasks.lock().await.remove(&request.request_id);
            match &error {
                TransferError::Service { .. } => {
                    warn!("download {}: store fault: {}", request.request_id, error)
                }
                _ => warn!("download {}: client fault: {}", request.request_id, error),
            }
            let _ = events.send(TransferEvent::DownloadResult(DownloadResultUpdate {
                request_id: request.request_id.clone(),
                success: false,
                e_tag: String::new(),
            }));
        }
    }
}

async fn stream_object(
    client: &Client,
    request: &DownloadRequest,
    paused: &AtomicBool,
    cancelled: &AtomicBool,
    events: &UnboundedSender<TransferEvent>,
) -> TransferResult<WorkerExit> {
    // Fresh presigned URL every attempt.
    let url = presigned_get_url(client, &request.bucket, &request.key, DOWNLOAD_URL_TTL_SECS).await?;

    // Resume from whatever a previous attempt already wrote.
    let existing_bytes = match tokio::fs::metadata(&request.file_path).await {
        Ok(metadata) => metadata.len(),
        Err(_) => 0,
    };

    let http = reqwest::Client::builder()
        .build()
        .map_err(|e| TransferError::Client(format!("failed to build http client: {e}")))?;

    let mut http_request = http.get(&url);
    if existing_bytes > 0 {
        http_request = http_request.header("Range", format!("bytes={}-", existing_bytes));
    }

    let response = http_request
        .send()
        .await
        .map_err(|e| TransferError::Client(format!("download request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() && status.as_u16() != 206 {
        let body = response.text().await.unwrap_or_default();
        return Err(TransferError::Service {
            code: Some(status.as_u16().to_string()),
            message: format!("download rejected: {} - {}", status, body),
        });
    }

    // A store that ignores the Range header replays the whole object with a
    // plain 200. Appending that would duplicate the prefix already on disk,
    // so start the file over from offset zero instead.
    let existing_bytes = if existing_bytes > 0 && status.as_u16() != 206 {
        info!(
            "download {}: range ignored by the store, restarting from zero",
            request.request_id
        );
        0
    } else {
        existing_bytes
    };

    // The object's eTag travels with the terminal result event.
    let e_tag = response
        .headers()
        .get("etag")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let target_bytes = response.content_length().unwrap_or(0) + existing_bytes;

    if let Some(parent) = request.file_path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| local(&request.file_path, source))?;
    }

    let mut file = open_destination(&request.file_path, existing_bytes).await?;

    let mut processed_bytes = existing_bytes;
    let mut write_buffer: Vec<u8> = Vec::with_capacity(WRITE_BUFFER_SIZE);
    let mut stream = response.bytes_stream();

    send_progress(events, request, processed_bytes, target_bytes);

    while let Some(chunk) = stream.next().await {
        // Unconsumed bytes are re-requested on resume; the flags win over the
        // chunk that was already pulled off the stream. The caller resolves a
        // pause and a cancel signalled together in favor of the cancel.
        if paused.load(Ordering::SeqCst) {
            flush(&mut file, &mut write_buffer, &request.file_path).await?;
            return Ok(WorkerExit::Paused);
        }
        if cancelled.load(Ordering::SeqCst) {
            return Ok(WorkerExit::Cancelled);
        }

        let chunk =
            chunk.map_err(|e| TransferError::Client(format!("failed to read chunk: {e}")))?;
        write_buffer.extend_from_slice(&chunk);
        processed_bytes += chunk.len() as u64;

        if write_buffer.len() >= WRITE_BUFFER_SIZE {
            flush(&mut file, &mut write_buffer, &request.file_path).await?;
        }

        send_progress(events, request, processed_bytes, target_bytes);
    }

    flush(&mut file, &mut write_buffer, &request.file_path).await?;
    file.flush()
        .await
        .map_err(|source| local(&request.file_path, source))?;

    send_progress(events, request, processed_bytes, target_bytes);
    Ok(WorkerExit::Completed { e_tag })
}

fn send_progress(
    events: &UnboundedSender<TransferEvent>,
    request: &DownloadRequest,
    processed_bytes: u64,
    target_bytes: u64,
) {
    let _ = events.send(TransferEvent::Progress(ProgressUpdate {
        request_id: request.request_id.clone(),
        processed_bytes: processed_bytes.min(target_bytes),
        target_bytes,
    }));
}

fn local(path: &Path, source: std::io::Error) -> TransferError {
    TransferError::LocalFile {
        path: path.to_path_buf(),
        source,
    }
}

async fn open_destination(path: &Path, existing_bytes: u64) -> TransferResult<File> {
    if existing_bytes > 0 {
        let mut file = OpenOptions::new()
            .write(true)
            .open(path)
            .await
            .map_err(|source| local(path, source))?;
        file.seek(SeekFrom::End(0))
            .await
            .map_err(|source| local(path, source))?;
        Ok(file)
    } else {
        File::create(path)
            .await
            .map_err(|source| local(path, source))
    }
}

async fn flush(file: &mut File, buffer: &mut Vec<u8>, path: &Path) -> TransferResult<()> {
    if !buffer.is_empty() {
        file.write_all(buffer)
            .await
            .map_err(|source| local(path, source))?;
        buffer.clear();
    }
    Ok(())
}
