//! Transfer task registry: request id -> in-flight download

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use aws_sdk_s3::Client;
use log::{info, warn};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::Mutex;

use super::types::{DownloadRequest, TaskState};
use super::worker;
use crate::error::{TransferError, TransferResult};
use crate::events::{DownloadResultUpdate, TransferEvent};
use crate::upload::{
    self, CompletedUpload, InitiatedUpload, PartUpload, PauseToken, ProgressFn, UploadRequest,
    UploadStatus, UploadedPart,
};

pub(crate) struct DownloadHandle {
    pub(crate) request: DownloadRequest,
    pub(crate) state: TaskState,
    pub(crate) paused: Arc<AtomicBool>,
    pub(crate) cancelled: Arc<AtomicBool>,
}

pub(crate) type TaskRegistry = Arc<Mutex<HashMap<String, DownloadHandle>>>;

/// Owns the store client and the download registry, and pushes transfer
/// events over the channel handed out at construction.
///
/// Registry entries are removed when a task reaches a terminal state
/// (completed, failed, cancelled), so a request id becomes reusable once its
/// transfer ends. A paused task keeps its entry and is resumed by calling
/// [`download`](TransferManager::download) again with the same request id.
pub struct TransferManager {
    client: Client,
    tasks: TaskRegistry,
    events: UnboundedSender<TransferEvent>,
}

impl TransferManager {
    /// Returns the manager and the receiving end of its event stream.
    pub fn new(client: Client) -> (Self, UnboundedReceiver<TransferEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        (
            Self {
                client,
                tasks: Arc::new(Mutex::new(HashMap::new())),
                events,
            },
            receiver,
        )
    }

    /// Handle to the underlying store client.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Start (or resume) a download. Fire-and-forget: the outcome arrives as
    /// a [`DownloadResultUpdate`] event, progress as
    /// [`ProgressUpdate`](crate::events::ProgressUpdate) events.
    ///
    /// A request id that is already running is left alone - no second
    /// transfer is created. A paused one is resumed from its partial file.
    pub async fn download(&self, request: DownloadRequest) -> TransferResult<()> {
        if request.file_path.file_name().is_none() {
            return Err(TransferError::Client(format!(
                "destination {} has no file name",
                request.file_path.display()
            )));
        }

        let mut tasks = self.tasks.lock().await;
        if let Some(handle) = tasks.get_mut(&request.request_id) {
            match handle.state {
                TaskState::Running => {
                    info!("download {}: already running", request.request_id);
                }
                TaskState::Paused => {
                    info!("download {}: resuming", request.request_id);
                    handle.state = TaskState::Running;
                    handle.paused = Arc::new(AtomicBool::new(false));
                    handle.cancelled = Arc::new(AtomicBool::new(false));
                    self.spawn_worker(
                        handle.request.clone(),
                        handle.paused.clone(),
                        handle.cancelled.clone(),
                    );
                }
            }
            return Ok(());
        }

        let paused = Arc::new(AtomicBool::new(false));
        let cancelled = Arc::new(AtomicBool::new(false));
        tasks.insert(
            request.request_id.clone(),
            DownloadHandle {
                request: request.clone(),
                state: TaskState::Running,
                paused: paused.clone(),
                cancelled: cancelled.clone(),
            },
        );
        drop(tasks);

        info!(
            "download {}: started for {}/{}",
            request.request_id, request.bucket, request.key
        );
        self.spawn_worker(request, paused, cancelled);
        Ok(())
    }

    fn spawn_worker(
        &self,
        request: DownloadRequest,
        paused: Arc<AtomicBool>,
        cancelled: Arc<AtomicBool>,
    ) {
        let client = self.client.clone();
        let tasks = self.tasks.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            worker::run_download(client, request, paused, cancelled, tasks, events).await;
        });
    }

    /// Signal a running download to pause. The partial file and the registry
    /// entry survive and no terminal event is emitted. Returns whether a
    /// running task was signalled; unknown ids are a no-op, never an error.
    pub async fn pause_download(&self, request_id: &str) -> bool {
        let tasks = self.tasks.lock().await;
        match tasks.get(request_id) {
            Some(handle) if handle.state == TaskState::Running => {
                handle.paused.store(true, Ordering::SeqCst);
                info!("download {}: pause requested", request_id);
                true
            }
            _ => false,
        }
    }

    /// Cancel a download. A running worker is signalled and tears itself
    /// down; a paused task is torn down here (partial file removed). Either
    /// way the terminal result event reports `success = false`. Unknown ids
    /// are a no-op.
    pub async fn cancel_download(&self, request_id: &str) {
        let mut tasks = self.tasks.lock().await;
        let paused_request = match tasks.get(request_id) {
            None => return,
            Some(handle) if handle.state == TaskState::Running => {
                handle.cancelled.store(true, Ordering::SeqCst);
                info!("download {}: cancel requested", request_id);
                return;
            }
            Some(handle) => handle.request.clone(),
        };

        tasks.remove(request_id);
        drop(tasks);

        if let Err(e) = tokio::fs::remove_file(&paused_request.file_path).await {
            warn!("download {}: could not remove partial file: {}", request_id, e);
        }
        info!("download {}: cancelled while paused", request_id);
        let _ = self
            .events
            .send(TransferEvent::DownloadResult(DownloadResultUpdate {
                request_id: request_id.to_string(),
                success: false,
                e_tag: String::new(),
            }));
    }

    /// Number of registered (running or paused) downloads.
    pub async fn task_count(&self) -> usize {
        self.tasks.lock().await.len()
    }

    /// Begin a multipart upload session.
    pub async fn init_upload(&self, bucket: &str, key: &str) -> TransferResult<InitiatedUpload> {
        upload::init_upload(&self.client, bucket, key).await
    }

    /// List the parts the store already holds for a session.
    pub async fn list_parts(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
    ) -> TransferResult<Vec<UploadedPart>> {
        upload::list_parts(&self.client, bucket, key, upload_id).await
    }

    /// Upload one 1 MiB slice of a local file.
    pub async fn upload_part(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        part_number: i32,
        file_path: &Path,
        offset: u64,
    ) -> TransferResult<PartUpload> {
        upload::upload_part(
            &self.client,
            bucket,
            key,
            upload_id,
            part_number,
            file_path,
            offset,
        )
        .await
    }

    /// Finalize a multipart upload session.
    pub async fn complete_upload(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        parts: &[UploadedPart],
    ) -> TransferResult<CompletedUpload> {
        upload::complete_upload(&self.client, bucket, key, upload_id, parts).await
    }

    /// Discard a multipart upload session and its uncommitted parts.
    pub async fn cancel_upload(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
    ) -> TransferResult<()> {
        upload::abort_upload(&self.client, bucket, key, upload_id).await
    }

    /// Drive a whole multipart upload, resuming any parts the store already
    /// holds.
    pub async fn upload_object(
        &self,
        request: &UploadRequest,
        progress: Option<ProgressFn>,
        pause: Option<Arc<PauseToken>>,
    ) -> TransferResult<UploadStatus> {
        upload::upload_object(&self.client, request, progress, pause).await
    }
}
