// ============================================================================
// File: src/upload.rs
// Sequential, fail-fast upload of the user's file selection
// ============================================================================

use std::sync::Arc;

use crate::api_client::Backend;
use crate::models::{FileSelection, UploadResult};
use crate::view::{StatusLine, UploadView};

pub struct UploadController {
    backend: Arc<dyn Backend>,
    view: UploadView,
}

impl UploadController {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            view: UploadView::default(),
        }
    }

    pub fn view(&self) -> &UploadView {
        &self.view
    }

    /// Upload the selection one file at a time, in selection order.
    ///
    /// The next request is only sent once the previous response arrived.
    /// The first failure sets the error status and leaves the remaining
    /// files unsent. Returns the files that were accepted before stopping.
    pub async fn submit_selected_files(&mut self, selection: FileSelection) -> Vec<UploadResult> {
        if selection.is_empty() {
            self.view.status = Some(StatusLine::error("Please select a file first."));
            return Vec::new();
        }

        self.view.status = Some(StatusLine::in_progress("Uploading & processing..."));
        tracing::info!(files = selection.len(), "starting upload batch");

        let mut accepted = Vec::with_capacity(selection.len());
        for (index, file) in selection.iter().enumerate() {
            match self.backend.upload(file).await {
                Ok(response) => {
                    tracing::debug!(
                        file = %file.name,
                        chunks = ?response.chunks_created,
                        message = ?response.message,
                        "file accepted"
                    );
                    accepted.push(UploadResult {
                        file: file.name.clone(),
                        server_filename: response.filename,
                        chunks: response.chunks_created,
                    });
                }
                Err(err) => {
                    tracing::warn!(
                        file = %file.name,
                        skipped = selection.len() - index - 1,
                        error = %err,
                        "upload failed, aborting batch"
                    );
                    self.view.status = Some(StatusLine::from_error(&err, "Upload failed."));
                    return accepted;
                }
            }
        }

        self.view.status = Some(StatusLine::success(Self::summary(&accepted)));
        accepted
    }

    /// The chunk total is only shown when every file reported a count and
    /// the sum fits.
    fn summary(results: &[UploadResult]) -> String {
        let chunks: Option<u64> = results
            .iter()
            .try_fold(0u64, |total, r| total.checked_add(r.chunks?));
        let chunk_clause = chunks
            .map(|n| format!(" ({} chunks created)", n))
            .unwrap_or_default();

        match results {
            [single] => format!("Success! {} uploaded{}.", single.display_name(), chunk_clause),
            _ => format!(
                "Success! {} files uploaded: {}{}.",
                results.len(),
                results
                    .iter()
                    .map(UploadResult::display_name)
                    .collect::<Vec<_>>()
                    .join(", "),
                chunk_clause
            ),
        }
    }
}
