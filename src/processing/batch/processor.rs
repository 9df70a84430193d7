use std::sync::Arc;
use tracing::{debug, info, warn};
use crate::api::ImageApi;
use crate::auth::Session;
use crate::core::{Progress, ProgressType, UploadFailure, UploadFile, UploadSummary};
use crate::processing::validation::validate_upload;
use crate::utils::GalleryResult;

/// Uploads a batch of files one at a time.
///
/// Every file gets an attempt regardless of earlier failures, and the summary
/// lists successes and failures in input order.
pub struct UploadBatchProcessor {
    api: Arc<dyn ImageApi>,
    max_upload_bytes: u64,
}

impl UploadBatchProcessor {
    pub fn new(api: Arc<dyn ImageApi>, max_upload_bytes: u64) -> Self {
        Self {
            api,
            max_upload_bytes,
        }
    }

    /// Validates and uploads a single file
    async fn upload_one(&self, session: &Session, file: &UploadFile) -> GalleryResult<()> {
        let format = validate_upload(file, self.max_upload_bytes)?;
        debug!("Uploading {} ({} bytes, {})", file.name, file.size(), format.mime_type());
        self.api.upload(session, file).await?;
        Ok(())
    }

    /// Processes the batch sequentially with per-file progress reporting
    pub async fn process_batch(
        &self,
        session: &Session,
        files: &[UploadFile],
        progress_callback: impl Fn(Progress),
    ) -> UploadSummary {
        let total = files.len();
        info!("Uploading batch of {} files", total);
        progress_callback(Progress::new(ProgressType::Start, 0, total, "Starting upload"));

        let mut summary = UploadSummary::default();

        for (index, file) in files.iter().enumerate() {
            match self.upload_one(session, file).await {
                Ok(()) => {
                    summary.success.push(file.name.clone());
                    progress_callback(
                        Progress::new(ProgressType::Progress, index + 1, total, "Uploaded")
                            .with_file(&file.name),
                    );
                }
                Err(e) => {
                    warn!("Upload of {} failed: {}", file.name, e);
                    let error = e.to_string();
                    progress_callback(
                        Progress::new(ProgressType::Error, index + 1, total, "Upload failed")
                            .with_file(&file.name)
                            .with_error(&error),
                    );
                    summary.failed.push(UploadFailure {
                        name: file.name.clone(),
                        error,
                    });
                }
            }
        }

        if !summary.failed.is_empty() {
            warn!(
                "Upload batch completed with {} failed files out of {}",
                summary.failed.len(),
                total
            );
        } else {
            info!("Upload batch completed successfully: {} files uploaded", total);
        }

        progress_callback(Progress::new(ProgressType::Complete, total, total, "Upload complete"));
        summary
    }
}
