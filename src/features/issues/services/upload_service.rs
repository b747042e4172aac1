use std::sync::Arc;

use crate::core::error::Result;
use crate::features::analysis::ImageAnalyzer;
use crate::features::issues::models::Issue;
use crate::features::issues::services::IssueService;
use crate::modules::exif;
use crate::modules::storage::LocalImageStore;

/// The upload pipeline: image persistence, record creation, GPS enrichment,
/// classification, and the single finalizing update.
///
/// Partial-failure policy:
/// - storing the image or creating the record aborts the whole operation;
/// - GPS extraction never fails the upload, coordinates just stay unset;
/// - classification failure propagates, leaving the record with its
///   placeholder fields.
pub struct UploadService {
    issue_service: Arc<IssueService>,
    store: Arc<LocalImageStore>,
    analyzer: Arc<dyn ImageAnalyzer>,
}

impl UploadService {
    pub fn new(
        issue_service: Arc<IssueService>,
        store: Arc<LocalImageStore>,
        analyzer: Arc<dyn ImageAnalyzer>,
    ) -> Self {
        Self {
            issue_service,
            store,
            analyzer,
        }
    }

    pub async fn process_upload(&self, data: &[u8], content_type: &str) -> Result<Issue> {
        // Step 1: persist the image, then the record. Nothing may survive a
        // failure here, so an orphaned image is removed when the insert fails.
        let image_path = self.store.save(data, content_type)?;

        let issue = match self.issue_service.create(&image_path).await {
            Ok(issue) => issue,
            Err(e) => {
                if let Err(cleanup) = self.store.delete(&image_path) {
                    tracing::warn!(
                        "Failed to remove orphaned image {} after create failure: {}",
                        image_path,
                        cleanup
                    );
                }
                return Err(e);
            }
        };

        // Step 2: optional enrichment; absent or unreadable GPS metadata
        // leaves the coordinates unset.
        let coordinates = exif::extract_gps_from_path(&self.store.absolute_path(&image_path));
        match coordinates {
            Some((lat, lon)) => {
                tracing::debug!("Issue {}: EXIF coordinates ({}, {})", issue.id, lat, lon)
            }
            None => tracing::debug!("Issue {}: no EXIF coordinates", issue.id),
        }

        // Step 3: mandatory enrichment. The record stays as created; the
        // error is the caller's to handle.
        let classification = self
            .analyzer
            .analyze(data, content_type)
            .await
            .map_err(|e| {
                tracing::error!("Classification failed for issue {}: {}", issue.id, e);
                e
            })?;

        // Step 4: apply classification and coordinates as one update
        self.issue_service
            .apply_classification(issue.id, &classification, coordinates)
            .await
    }
}
