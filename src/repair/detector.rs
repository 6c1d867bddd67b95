use std::cmp::Ordering;

use tracing::{debug, warn};

use super::types::{DuplicateMatch, Report};
use crate::constants::DEFAULT_DUPLICATE_THRESHOLD;
use crate::vector::clamped_similarity;

#[derive(Debug, Clone, Copy, PartialEq)]
/// Classifies a new report against existing reports at the same floor and room.
pub struct DuplicateDetector {
    threshold: f32,
}

impl Default for DuplicateDetector {
    fn default() -> Self {
        Self::new(DEFAULT_DUPLICATE_THRESHOLD)
    }
}

impl DuplicateDetector {
    /// Creates a detector with an inclusive similarity `threshold`.
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Returns `true` if `similarity` is at or above the threshold.
    #[inline]
    pub fn is_duplicate(&self, similarity: f32) -> bool {
        similarity >= self.threshold
    }

    /// Returns every location-matching report at or above the threshold, most similar first.
    ///
    /// Building scoping is assumed to have happened upstream; only floor and room are
    /// checked here. Ties keep the order of `reports`.
    pub fn detect(
        &self,
        query: &[f32],
        floor: &str,
        room: Option<&str>,
        reports: &[Report],
    ) -> Vec<DuplicateMatch> {
        let mut matches: Vec<DuplicateMatch> = reports
            .iter()
            .filter(|report| report.location.same_floor_and_room(floor, room))
            .filter_map(|report| {
                let similarity = match clamped_similarity(query, &report.vector) {
                    Ok(s) => s,
                    Err(e) => {
                        warn!(report_id = report.id, error = %e, "Skipping report vector");
                        return None;
                    }
                };

                debug!(report_id = report.id, similarity, "Compared against report");

                self.is_duplicate(similarity).then(|| DuplicateMatch {
                    report_id: report.id,
                    similarity,
                    description: report.description.clone(),
                    location: report.location.to_string(),
                    image_url: report.image_url.clone(),
                })
            })
            .collect();

        matches.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(Ordering::Equal)
        });

        matches
    }
}
