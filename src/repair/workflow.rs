use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use super::detector::DuplicateDetector;
use super::error::{IntakeError, IntakeResult};
use super::types::{AnalysisResult, ImageInput, IntakeOutcome, IntakeRequest, NewReport};
use crate::providers::{EmbeddingProvider, VisionAnalyzer};
use crate::store::{ImageStore, ReportStore, run_blocking};

#[derive(Clone)]
/// Sequences one repair intake: embed, detect duplicates, then analyze and store only
/// if the report is new.
///
/// Duplicate detection gates the vision call, so the expensive analysis is never paid
/// for a duplicate. All collaborators are injected; the workflow holds no state of its
/// own beyond them.
pub struct ReportIntakeWorkflow {
    embedder: Arc<dyn EmbeddingProvider>,
    analyzer: Arc<dyn VisionAnalyzer>,
    reports: Arc<dyn ReportStore>,
    images: Arc<dyn ImageStore>,
    detector: DuplicateDetector,
}

impl std::fmt::Debug for ReportIntakeWorkflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportIntakeWorkflow")
            .field("detector", &self.detector)
            .field("stored_reports", &self.reports.len())
            .finish()
    }
}

impl ReportIntakeWorkflow {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        analyzer: Arc<dyn VisionAnalyzer>,
        reports: Arc<dyn ReportStore>,
        images: Arc<dyn ImageStore>,
        detector: DuplicateDetector,
    ) -> Self {
        Self {
            embedder,
            analyzer,
            reports,
            images,
            detector,
        }
    }

    pub fn detector(&self) -> &DuplicateDetector {
        &self.detector
    }

    pub fn reports(&self) -> &Arc<dyn ReportStore> {
        &self.reports
    }

    #[instrument(skip(self, request), fields(floor = %request.location.floor, room = ?request.location.room))]
    pub async fn intake(&self, request: IntakeRequest) -> IntakeResult<IntakeOutcome> {
        let IntakeRequest {
            image,
            precomputed_vector,
            location,
            description,
            candidate_ids,
        } = request;

        let image_bytes = resolve_image(&image).await?;

        let vector = match precomputed_vector.filter(|v| !v.is_empty()) {
            Some(vector) => vector,
            None => match self.embedder.embed_image(&image_bytes).await {
                Ok(vector) => vector,
                Err(e) => {
                    warn!(error = %e, "Image embedding failed; treating report as having no vector");
                    Vec::new()
                }
            },
        };

        let existing = self.reports.list_by_ids(&candidate_ids)?;
        debug!(
            candidates = candidate_ids.len(),
            resolved = existing.len(),
            "Checking for duplicate reports"
        );

        let matches = self.detector.detect(
            &vector,
            &location.floor,
            location.room.as_deref(),
            &existing,
        );

        if !matches.is_empty() {
            // The staged image is dropped here; it is never analyzed or stored.
            drop(image_bytes);
            info!(
                outcome = "duplicate",
                duplicates = matches.len(),
                top_report_id = matches[0].report_id,
                top_similarity = matches[0].similarity,
                "Repair report is a duplicate"
            );
            return Ok(IntakeOutcome::Duplicate { matches });
        }

        let analysis = match self.analyzer.analyze(&image_bytes).await {
            Ok(analysis) => analysis,
            Err(e) => {
                warn!(error = %e, "Vision analysis failed; using fallback result");
                AnalysisResult::fallback(&e)
            }
        };

        let description = description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| analysis.description.clone());

        if vector.is_empty() {
            warn!("Storing report without a vector; it will never match future intakes");
        }

        let (image_url, stored_image) = match &image {
            ImageInput::Path(path) => (path.to_string_lossy().into_owned(), None),
            ImageInput::Bytes(_) => {
                let images = self.images.clone();
                let stored = run_blocking(move || images.put(&image_bytes)).await?;
                (stored.url.clone(), Some(stored))
            }
        };

        let reports = self.reports.clone();
        let appended = run_blocking(move || {
            reports.append(NewReport {
                location,
                description,
                vector,
                image_url: Some(image_url),
            })
        })
        .await;

        let report = match appended {
            Ok(report) => report,
            Err(e) => {
                // Identical content stored earlier may back another report.
                if let Some(stored) = stored_image.filter(|s| s.created) {
                    self.discard_image(stored.url).await;
                }
                return Err(e.into());
            }
        };

        info!(
            outcome = "new",
            report_id = report.id,
            severity = %analysis.severity,
            priority = analysis.priority_score,
            "Repair report accepted"
        );

        Ok(IntakeOutcome::New {
            report_id: report.id,
            analysis,
        })
    }

    async fn discard_image(&self, url: String) {
        let images = self.images.clone();
        let target = url.clone();
        match run_blocking(move || images.discard(&target)).await {
            Ok(()) => debug!(image = %url, "Discarded image of unsaved report"),
            Err(e) => warn!(image = %url, error = %e, "Failed to discard image of unsaved report"),
        }
    }
}

async fn resolve_image(image: &ImageInput) -> IntakeResult<Vec<u8>> {
    let bytes = match image {
        ImageInput::Path(path) => {
            tokio::fs::read(path)
                .await
                .map_err(|e| IntakeError::UnresolvableInput {
                    reason: format!("cannot read image {}: {}", path.display(), e),
                })?
        }
        ImageInput::Bytes(bytes) => bytes.clone(),
    };

    if bytes.is_empty() {
        return Err(IntakeError::UnresolvableInput {
            reason: "image is empty".to_string(),
        });
    }

    Ok(bytes)
}
