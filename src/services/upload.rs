//! Upload orchestration for both client modes.
//!
//! Per-file mode sends one request per file, all in flight at once, and
//! reconciles each completion on its own. Batch mode sends the staged list as
//! one multipart body and treats the outcome as a whole.

use futures::stream::{FuturesUnordered, StreamExt};
use tracing::{info, warn};

use crate::api::{ApiError, GrimoireApi};
use crate::models::{StagedFile, UploadedDocument};
use crate::session::{SessionState, Severity, UploadStatus};

pub const NO_FILE_SELECTED: &str = "No file selected.";
pub const BATCH_UPLOADED: &str = "Files uploaded successfully.";
pub const BATCH_FAILED: &str = "There was an error uploading the files.";
const UPLOAD_FAILED: &str = "Upload failed";

/// Receives per-file progress while uploads are in flight.
pub trait ProgressSink: Send + Sync {
    fn started(&self, _index: usize, _name: &str) {}
    fn finished(&self, _index: usize, _name: &str, _status: UploadStatus) {}
}

/// Sink that ignores progress.
pub struct NoProgress;

impl ProgressSink for NoProgress {}

/// Outcome of a per-file upload round.
#[derive(Debug, Default)]
pub struct UploadReport {
    /// Documents the server accepted, in completion order.
    pub uploaded: Vec<UploadedDocument>,
    /// Rejected files with the reason.
    pub failed: Vec<(String, ApiError)>,
}

impl UploadReport {
    pub fn is_empty(&self) -> bool {
        self.uploaded.is_empty() && self.failed.is_empty()
    }
}

/// Outcome of a batch submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    /// Nothing was staged; no request was made.
    NothingStaged,
    Uploaded { message: String },
    Failed { message: String },
}

pub struct UploadOrchestrator<'a> {
    api: &'a dyn GrimoireApi,
}

impl<'a> UploadOrchestrator<'a> {
    pub fn new(api: &'a dyn GrimoireApi) -> Self {
        Self { api }
    }

    /// Upload each file with its own request.
    ///
    /// A failing file never affects the others; only its progress item is
    /// marked failed.
    pub async fn upload_each(
        &self,
        session: &mut SessionState,
        files: &[StagedFile],
        progress: &dyn ProgressSink,
    ) -> UploadReport {
        let mut report = UploadReport::default();
        if files.is_empty() {
            session.flashes.push(NO_FILE_SELECTED, Severity::Error);
            return report;
        }

        session.reset_progress(files.iter().map(|f| f.name.as_str()));
        for (index, file) in files.iter().enumerate() {
            progress.started(index, &file.name);
        }

        let api = self.api;
        let mut in_flight: FuturesUnordered<_> = files
            .iter()
            .enumerate()
            .map(|(index, file)| async move { (index, api.upload_document(file).await) })
            .collect();

        while let Some((index, result)) = in_flight.next().await {
            let name = &files[index].name;
            match result {
                Ok(document) => {
                    info!("Uploaded {} as document {}", name, document.id);
                    session.set_progress(index, UploadStatus::Uploaded);
                    progress.finished(index, name, UploadStatus::Uploaded);
                    session.add_document(document.clone());
                    report.uploaded.push(document);
                }
                Err(e) => {
                    warn!("Upload of {} failed: {}", name, e);
                    session.set_progress(index, UploadStatus::Failed);
                    progress.finished(index, name, UploadStatus::Failed);
                    session.flashes.push(
                        format!("{}: {}", name, e.user_message(UPLOAD_FAILED)),
                        Severity::Error,
                    );
                    report.failed.push((name.clone(), e));
                }
            }
        }

        report
    }

    /// Submit every staged file as one batch.
    ///
    /// Success clears the staged list; failure keeps it so the user can retry.
    pub async fn submit_staged(&self, session: &mut SessionState) -> BatchOutcome {
        if session.staged().is_empty() {
            session.flashes.replace(NO_FILE_SELECTED, Severity::Error);
            return BatchOutcome::NothingStaged;
        }

        let count = session.staged().len();
        match self.api.upload_batch(session.staged()).await {
            Ok(message) => {
                info!("Batch upload of {} file(s) accepted", count);
                let message = message.unwrap_or_else(|| BATCH_UPLOADED.to_string());
                session.clear_staged();
                session.flashes.replace(message.clone(), Severity::Success);
                BatchOutcome::Uploaded { message }
            }
            Err(e) => {
                warn!("Batch upload of {} file(s) failed: {}", count, e);
                let message = e.user_message(BATCH_FAILED);
                session.flashes.replace(message.clone(), Severity::Error);
                BatchOutcome::Failed { message }
            }
        }
    }
}
