//! Sequential batch upload with pacing and rate-limit short-circuit.

use std::time::Duration;

use mediadrop_core::models::{BatchUploadResult, UploadFile, UploadOutcome};
use mediadrop_core::validation::validate_batch;
use mediadrop_core::{BatchRejection, UploadLimits};
use uuid::Uuid;

use super::service::UploadService;

/// Runs a batch through [`UploadService`] one file at a time.
///
/// Files are processed strictly in input order with a fixed delay before every file but
/// the first. The first rate-limited outcome stops the batch: every file not yet attempted
/// is reported as skipped, so the result always holds exactly one outcome per input file.
#[derive(Clone)]
pub struct BatchUploader {
    service: UploadService,
    limits: UploadLimits,
    pacing: Duration,
}

impl BatchUploader {
    pub fn new(service: UploadService, limits: UploadLimits, pacing: Duration) -> Self {
        Self {
            service,
            limits,
            pacing,
        }
    }

    #[tracing::instrument(skip(self, files), fields(file_count = files.len(), folder = ?folder))]
    pub async fn upload_batch(
        &self,
        files: Vec<UploadFile>,
        folder: Option<&str>,
        user_id: Option<Uuid>,
    ) -> Result<BatchUploadResult, BatchRejection> {
        validate_batch(&files, &self.limits)?;

        let total = files.len();
        let mut outcomes = Vec::with_capacity(total);
        let mut pending = files.into_iter().enumerate();

        while let Some((index, file)) = pending.next() {
            if index > 0 && !self.pacing.is_zero() {
                tokio::time::sleep(self.pacing).await;
            }

            let outcome = self.service.upload(file, folder, user_id).await;
            let rate_limited = outcome.is_rate_limited();
            outcomes.push(outcome);

            if rate_limited {
                let skipped = total - index - 1;
                tracing::warn!(
                    index,
                    skipped,
                    "Storage rate limit hit, skipping remaining files"
                );
                outcomes.extend(
                    pending
                        .by_ref()
                        .map(|(_, file)| UploadOutcome::skipped_rate_limited(file.filename)),
                );
                break;
            }
        }

        let result = BatchUploadResult::from_outcomes(outcomes);
        tracing::info!(
            total_files = result.total_files,
            successful_uploads = result.successful_uploads,
            failed_uploads = result.failed_uploads(),
            rate_limit_hit = result.rate_limit_hit,
            "Batch upload finished"
        );
        Ok(result)
    }
}
