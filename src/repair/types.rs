use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::FALLBACK_PRIORITY;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Where a repair issue is. `room == None` means a shared (common-area) facility.
pub struct Location {
    pub building: String,
    pub floor: String,
    pub room: Option<String>,
}

impl Location {
    pub fn new(
        building: impl Into<String>,
        floor: impl Into<String>,
        room: Option<String>,
    ) -> Self {
        Self {
            building: building.into(),
            floor: floor.into(),
            room,
        }
    }

    /// Returns `true` for a shared facility (no room number).
    pub fn is_common_area(&self) -> bool {
        self.room.is_none()
    }

    /// Exact floor and room equality; a common area only matches a common area.
    pub fn same_floor_and_room(&self, floor: &str, room: Option<&str>) -> bool {
        self.floor == floor && self.room.as_deref() == room
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let building = self.building.trim();
        if !building.is_empty() {
            write!(f, "{} ", building)?;
        }
        write!(f, "{}F", self.floor)?;
        match &self.room {
            Some(room) => write!(f, " {}", room),
            None => write!(f, " (common area)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// A stored repair report. Never mutated after creation.
pub struct Report {
    pub id: u64,
    pub location: Location,
    pub description: String,
    pub vector: Vec<f32>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
/// A report before the store assigns its id.
pub struct NewReport {
    pub location: Location,
    pub description: String,
    pub vector: Vec<f32>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
/// Four-level urgency scale.
pub enum Severity {
    #[serde(alias = "critical", alias = "Critical")]
    Critical,
    #[serde(alias = "high", alias = "High")]
    High,
    #[serde(alias = "medium", alias = "Medium")]
    Medium,
    #[serde(alias = "low", alias = "Low")]
    Low,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Critical => "CRITICAL",
            Severity::High => "HIGH",
            Severity::Medium => "MEDIUM",
            Severity::Low => "LOW",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Vision-model assessment of a new repair issue.
pub struct AnalysisResult {
    /// Broken item (faucet, light, ...).
    pub item: String,
    /// Observed problem.
    pub issue: String,
    pub severity: Severity,
    /// Urgency from 1 (lowest) to 10.
    pub priority_score: u8,
    /// Why this priority was chosen.
    pub reasoning: String,
    /// Human-readable summary.
    pub description: String,
}

impl AnalysisResult {
    /// Fixed result used when the analyzer fails or returns unusable output.
    pub fn fallback(reason: impl fmt::Display) -> Self {
        Self {
            item: "unknown".to_string(),
            issue: "unknown".to_string(),
            severity: Severity::Medium,
            priority_score: FALLBACK_PRIORITY,
            reasoning: format!("Automatic analysis failed: {}", reason),
            description: "Image analysis failed; a staff member should review this report."
                .to_string(),
        }
    }

    /// Clamps `priority_score` into `1..=10`.
    pub fn normalized(mut self) -> Self {
        self.priority_score = self.priority_score.clamp(1, 10);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// An existing report the new intake duplicates.
pub struct DuplicateMatch {
    #[serde(rename = "reportId")]
    pub report_id: u64,
    pub similarity: f32,
    pub description: String,
    pub location: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone)]
/// Image supplied with an intake.
pub enum ImageInput {
    /// Image already on disk, referenced by path. Kept as the report's image reference.
    Path(PathBuf),
    /// Uploaded bytes, staged in memory. Persisted only if the report is new.
    Bytes(Vec<u8>),
}

#[derive(Debug, Clone)]
/// One repair-report intake.
pub struct IntakeRequest {
    pub image: ImageInput,
    /// Vector computed ahead of time; skips the embedding call when non-empty.
    pub precomputed_vector: Option<Vec<f32>>,
    pub location: Location,
    pub description: Option<String>,
    /// Existing reports the caller already filtered to the same building.
    pub candidate_ids: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq)]
/// Terminal state of an intake.
pub enum IntakeOutcome {
    /// Not a duplicate: analyzed and stored under `report_id`.
    New {
        report_id: u64,
        analysis: AnalysisResult,
    },
    /// Duplicates an existing report; nothing was analyzed or stored.
    Duplicate { matches: Vec<DuplicateMatch> },
}

impl IntakeOutcome {
    pub fn is_new(&self) -> bool {
        matches!(self, IntakeOutcome::New { .. })
    }

    pub fn report_id(&self) -> Option<u64> {
        match self {
            IntakeOutcome::New { report_id, .. } => Some(*report_id),
            IntakeOutcome::Duplicate { .. } => None,
        }
    }

    pub fn analysis(&self) -> Option<&AnalysisResult> {
        match self {
            IntakeOutcome::New { analysis, .. } => Some(analysis),
            IntakeOutcome::Duplicate { .. } => None,
        }
    }

    pub fn duplicates(&self) -> &[DuplicateMatch] {
        match self {
            IntakeOutcome::New { .. } => &[],
            IntakeOutcome::Duplicate { matches } => matches,
        }
    }
}
