use std::sync::Arc;

use chrono::Utc;
use tempfile::TempDir;

use super::*;
use crate::providers::{MockEmbeddingProvider, MockVisionAnalyzer};
use crate::store::{
    FileImageStore, ImageStore, InMemoryReportStore, MockImageStore, ReportStore, StoreError,
    StoreResult,
};

const IMAGE: &[u8] = b"\xFF\xD8\xFFfake-jpeg-bytes";

fn report(id: u64, floor: &str, room: Option<&str>, vector: Vec<f32>) -> Report {
    Report {
        id,
        location: Location::new("Dorm A", floor, room.map(str::to_string)),
        description: format!("report {}", id),
        vector,
        image_url: None,
        created_at: Utc::now(),
    }
}

/// Unit vector whose cosine against `[1, 0]` is `sim`.
fn vector_with_similarity(sim: f32) -> Vec<f32> {
    vec![sim, (1.0 - sim * sim).sqrt()]
}

fn sample_analysis() -> AnalysisResult {
    AnalysisResult {
        item: "toilet".to_string(),
        issue: "clogged".to_string(),
        severity: Severity::Critical,
        priority_score: 9,
        reasoning: "Hygiene issue".to_string(),
        description: "Toilet is backing up.".to_string(),
    }
}

struct Harness {
    workflow: ReportIntakeWorkflow,
    embedder: MockEmbeddingProvider,
    analyzer: MockVisionAnalyzer,
    reports: Arc<InMemoryReportStore>,
    images: MockImageStore,
}

fn harness_with(embedder: MockEmbeddingProvider, analyzer: MockVisionAnalyzer) -> Harness {
    let reports = Arc::new(InMemoryReportStore::new());
    let images = MockImageStore::new();
    let workflow = ReportIntakeWorkflow::new(
        Arc::new(embedder.clone()),
        Arc::new(analyzer.clone()),
        reports.clone(),
        Arc::new(images.clone()),
        DuplicateDetector::default(),
    );
    Harness {
        workflow,
        embedder,
        analyzer,
        reports,
        images,
    }
}

fn harness() -> Harness {
    harness_with(
        MockEmbeddingProvider::new().with_image(IMAGE, vec![1.0, 0.0]),
        MockVisionAnalyzer::returning(sample_analysis()),
    )
}

fn request(floor: &str, room: Option<&str>, candidate_ids: Vec<u64>) -> IntakeRequest {
    IntakeRequest {
        image: ImageInput::Bytes(IMAGE.to_vec()),
        precomputed_vector: None,
        location: Location::new("Dorm A", floor, room.map(str::to_string)),
        description: None,
        candidate_ids,
    }
}

fn seed(store: &InMemoryReportStore, floor: &str, room: Option<&str>, vector: Vec<f32>) -> u64 {
    store
        .append(NewReport {
            location: Location::new("Dorm A", floor, room.map(str::to_string)),
            description: "existing".to_string(),
            vector,
            image_url: Some("old.jpg".to_string()),
        })
        .expect("seed report")
        .id
}

// --- DuplicateDetector ---

#[test]
fn test_threshold_boundary_inclusive() {
    let detector = DuplicateDetector::default();
    assert_eq!(detector.threshold(), 0.80);
    assert!(detector.is_duplicate(0.80));
    assert!(!detector.is_duplicate(0.799999));
    assert!(detector.is_duplicate(1.0));
}

#[test]
fn test_room_report_never_matches_common_area_query() {
    let detector = DuplicateDetector::default();
    let reports = vec![report(1, "3", Some("301"), vec![1.0, 0.0])];

    let matches = detector.detect(&[1.0, 0.0], "3", None, &reports);
    assert!(matches.is_empty());
}

#[test]
fn test_common_area_report_never_matches_room_query() {
    let detector = DuplicateDetector::default();
    let reports = vec![report(1, "3", None, vec![1.0, 0.0])];

    let matches = detector.detect(&[1.0, 0.0], "3", Some("301"), &reports);
    assert!(matches.is_empty());
}

#[test]
fn test_common_area_matches_common_area() {
    let detector = DuplicateDetector::default();
    let reports = vec![report(1, "3", None, vec![1.0, 0.0])];

    let matches = detector.detect(&[1.0, 0.0], "3", None, &reports);
    assert_eq!(matches.len(), 1);
}

#[test]
fn test_different_floor_never_matches() {
    let detector = DuplicateDetector::default();
    let reports = vec![report(1, "4", Some("301"), vec![1.0, 0.0])];

    let matches = detector.detect(&[1.0, 0.0], "3", Some("301"), &reports);
    assert!(matches.is_empty());
}

#[test]
fn test_detect_filters_below_threshold_and_sorts() {
    let detector = DuplicateDetector::default();
    let reports = vec![
        report(1, "3", Some("301"), vector_with_similarity(0.85)),
        report(2, "3", Some("301"), vector_with_similarity(0.50)),
        report(3, "3", Some("301"), vector_with_similarity(0.97)),
    ];

    let matches = detector.detect(&[1.0, 0.0], "3", Some("301"), &reports);
    let ids: Vec<u64> = matches.iter().map(|m| m.report_id).collect();
    assert_eq!(ids, vec![3, 1]);
    assert!((matches[0].similarity - 0.97).abs() < 1e-4);
}

#[test]
fn test_detect_ties_keep_report_order() {
    let detector = DuplicateDetector::default();
    let reports = vec![
        report(5, "1", None, vec![2.0, 0.0]),
        report(2, "1", None, vec![1.0, 0.0]),
    ];

    let matches = detector.detect(&[1.0, 0.0], "1", None, &reports);
    let ids: Vec<u64> = matches.iter().map(|m| m.report_id).collect();
    assert_eq!(ids, vec![5, 2]);
}

#[test]
fn test_detect_skips_mismatched_dimension() {
    let detector = DuplicateDetector::default();
    let reports = vec![
        report(1, "1", None, vec![1.0, 0.0, 0.0]),
        report(2, "1", None, vec![1.0, 0.0]),
    ];

    let matches = detector.detect(&[1.0, 0.0], "1", None, &reports);
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].report_id, 2);
}

#[test]
fn test_anticorrelated_similarity_clamps_to_zero() {
    let detector = DuplicateDetector::new(0.0);
    let reports = vec![report(1, "1", None, vec![-1.0, 0.0])];

    // Clamped to 0.0, which meets a zero threshold.
    let matches = detector.detect(&[1.0, 0.0], "1", None, &reports);
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].similarity, 0.0);
}

// --- Types ---

#[test]
fn test_location_display() {
    let room = Location::new("Dorm A", "3", Some("301".to_string()));
    assert_eq!(room.to_string(), "Dorm A 3F 301");

    let common = Location::new("Dorm A", "3", None);
    assert_eq!(common.to_string(), "Dorm A 3F (common area)");
    assert!(common.is_common_area());
}

#[test]
fn test_fallback_analysis() {
    let fallback = AnalysisResult::fallback("timeout");
    assert_eq!(fallback.severity, Severity::Medium);
    assert_eq!(fallback.priority_score, 5);
    assert!(fallback.reasoning.contains("timeout"));
}

#[test]
fn test_duplicate_match_wire_names() {
    let m = DuplicateMatch {
        report_id: 10,
        similarity: 0.95,
        description: "clogged".to_string(),
        location: "Dorm A 3F".to_string(),
        image_url: None,
    };
    let json = serde_json::to_value(&m).unwrap();
    assert_eq!(json["reportId"], 10);
    assert!(json.get("image_url").is_some());
}

// --- ReportIntakeWorkflow ---

#[tokio::test]
async fn test_duplicate_short_circuits_analysis() {
    let h = harness();
    let existing = seed(&h.reports, "3", Some("301"), vector_with_similarity(0.95));

    let outcome = h
        .workflow
        .intake(request("3", Some("301"), vec![existing]))
        .await
        .expect("intake should succeed");

    assert!(!outcome.is_new());
    assert_eq!(outcome.report_id(), None);
    assert!(outcome.analysis().is_none());
    assert_eq!(outcome.duplicates().len(), 1);
    assert_eq!(outcome.duplicates()[0].report_id, existing);
    assert!((outcome.duplicates()[0].similarity - 0.95).abs() < 1e-4);

    assert_eq!(h.analyzer.calls(), 0, "analysis must be skipped");
    assert_eq!(h.images.stored_count(), 0, "staged image must be discarded");
    assert_eq!(h.reports.len(), 1, "no report may be stored");
}

#[tokio::test]
async fn test_new_report_is_analyzed_and_stored() {
    let h = harness();
    seed(&h.reports, "3", Some("301"), vec![1.0, 0.0]);
    seed(&h.reports, "3", Some("302"), vec![1.0, 0.0]);
    let prior = h.reports.len() as u64;

    let outcome = h
        .workflow
        .intake(request("5", Some("501"), vec![1, 2]))
        .await
        .expect("intake should succeed");

    assert!(outcome.is_new());
    assert_eq!(outcome.report_id(), Some(prior + 1));
    assert_eq!(outcome.analysis(), Some(&sample_analysis()));
    assert!(outcome.duplicates().is_empty());

    assert_eq!(h.analyzer.calls(), 1);
    assert_eq!(h.images.stored_count(), 1);

    let stored = h.reports.list_by_ids(&[prior + 1]).unwrap();
    assert_eq!(stored[0].vector, vec![1.0, 0.0]);
    assert_eq!(stored[0].description, "Toilet is backing up.");
    assert_eq!(stored[0].location.room.as_deref(), Some("501"));
}

#[tokio::test]
async fn test_stored_report_is_found_by_next_intake() {
    let h = harness();

    let first = h
        .workflow
        .intake(request("2", None, vec![]))
        .await
        .unwrap();
    let first_id = first.report_id().expect("first intake is new");

    let second = h
        .workflow
        .intake(request("2", None, vec![first_id]))
        .await
        .unwrap();

    assert!(!second.is_new());
    assert_eq!(second.duplicates()[0].report_id, first_id);
    assert_eq!(h.analyzer.calls(), 1);
}

#[tokio::test]
async fn test_candidates_outside_caller_set_are_ignored() {
    let h = harness();
    seed(&h.reports, "3", Some("301"), vec![1.0, 0.0]);

    let outcome = h
        .workflow
        .intake(request("3", Some("301"), vec![]))
        .await
        .unwrap();

    assert!(outcome.is_new());
}

#[tokio::test]
async fn test_analyzer_failure_uses_fallback() {
    let h = harness_with(
        MockEmbeddingProvider::new().with_image(IMAGE, vec![1.0, 0.0]),
        MockVisionAnalyzer::malformed(),
    );

    let outcome = h.workflow.intake(request("1", None, vec![])).await.unwrap();

    let analysis = outcome.analysis().expect("new report carries analysis");
    assert_eq!(analysis.severity, Severity::Medium);
    assert_eq!(analysis.priority_score, 5);
    assert_eq!(outcome.report_id(), Some(1));
}

#[tokio::test]
async fn test_embedding_failure_is_not_fatal() {
    let h = harness_with(
        MockEmbeddingProvider::failing(),
        MockVisionAnalyzer::returning(sample_analysis()),
    );
    let existing = seed(&h.reports, "1", None, vec![1.0, 0.0]);

    let outcome = h
        .workflow
        .intake(request("1", None, vec![existing]))
        .await
        .unwrap();

    assert!(outcome.is_new());
    assert_eq!(h.embedder.image_calls(), 1);
}

#[tokio::test]
async fn test_precomputed_vector_skips_embedding() {
    let h = harness();
    let existing = seed(&h.reports, "1", None, vec![0.0, 1.0]);

    let mut req = request("1", None, vec![existing]);
    req.precomputed_vector = Some(vec![0.0, 1.0]);

    let outcome = h.workflow.intake(req).await.unwrap();

    assert!(!outcome.is_new());
    assert_eq!(h.embedder.image_calls(), 0);
}

#[tokio::test]
async fn test_unreadable_image_path_is_unresolvable() {
    let h = harness();
    let dir = TempDir::new().unwrap();

    let mut req = request("1", None, vec![]);
    req.image = ImageInput::Path(dir.path().join("missing.jpg"));

    let err = h.workflow.intake(req).await.unwrap_err();
    assert!(matches!(err, IntakeError::UnresolvableInput { .. }));
    assert_eq!(h.analyzer.calls(), 0);
    assert!(h.reports.is_empty());
}

#[tokio::test]
async fn test_empty_upload_is_unresolvable() {
    let h = harness();
    let mut req = request("1", None, vec![]);
    req.image = ImageInput::Bytes(Vec::new());

    let err = h.workflow.intake(req).await.unwrap_err();
    assert!(matches!(err, IntakeError::UnresolvableInput { .. }));
}

#[tokio::test]
async fn test_image_path_is_kept_as_reference() {
    let h = harness();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("leak.jpg");
    std::fs::write(&path, IMAGE).unwrap();

    let mut req = request("1", None, vec![]);
    req.image = ImageInput::Path(path.clone());
    req.description = Some("  Sink leaking  ".to_string());

    let outcome = h.workflow.intake(req).await.unwrap();
    let id = outcome.report_id().unwrap();
    let stored = h.reports.list_by_ids(&[id]).unwrap();

    assert_eq!(stored[0].image_url.as_deref(), Some(path.to_str().unwrap()));
    assert_eq!(stored[0].description, "Sink leaking");
    assert_eq!(h.images.stored_count(), 0);
}

#[tokio::test]
async fn test_concurrent_intakes_get_unique_ids() {
    let h = harness();
    let workflow = Arc::new(h.workflow);

    let mut handles = Vec::new();
    for i in 0..16 {
        let workflow = workflow.clone();
        handles.push(tokio::spawn(async move {
            // Distinct floors so no intake duplicates another.
            workflow
                .intake(request(&format!("{}", i + 10), None, vec![]))
                .await
        }));
    }

    let mut ids = Vec::new();
    for handle in handles {
        let outcome = handle.await.unwrap().unwrap();
        ids.push(outcome.report_id().unwrap());
    }
    ids.sort_unstable();

    assert_eq!(ids, (1..=16).collect::<Vec<u64>>());
    assert_eq!(h.reports.len(), 16);
}

struct RejectingReportStore;

impl ReportStore for RejectingReportStore {
    fn append(&self, _report: NewReport) -> StoreResult<Report> {
        Err(StoreError::Io(std::io::Error::other("disk full")))
    }

    fn list_by_ids(&self, _ids: &[u64]) -> StoreResult<Vec<Report>> {
        Ok(Vec::new())
    }

    fn next_id(&self) -> u64 {
        1
    }

    fn len(&self) -> usize {
        0
    }
}

fn rejecting_workflow(images: Arc<dyn ImageStore>) -> ReportIntakeWorkflow {
    ReportIntakeWorkflow::new(
        Arc::new(MockEmbeddingProvider::new().with_image(IMAGE, vec![1.0, 0.0])),
        Arc::new(MockVisionAnalyzer::returning(sample_analysis())),
        Arc::new(RejectingReportStore),
        images,
        DuplicateDetector::default(),
    )
}

#[tokio::test]
async fn test_failed_append_discards_new_image() {
    let images = MockImageStore::new();
    let workflow = rejecting_workflow(Arc::new(images.clone()));

    let err = workflow.intake(request("1", None, vec![])).await.unwrap_err();

    assert!(matches!(err, IntakeError::Store(StoreError::Io(_))));
    assert_eq!(images.stored_count(), 0);
}

#[tokio::test]
async fn test_failed_append_keeps_previously_stored_image() {
    let dir = TempDir::new().unwrap();
    let images = Arc::new(FileImageStore::new(dir.path().to_path_buf()));
    let existing = images.put(IMAGE).unwrap();
    let workflow = rejecting_workflow(images.clone());

    assert!(workflow.intake(request("1", None, vec![])).await.is_err());
    assert!(std::path::Path::new(&existing.url).exists());
}
