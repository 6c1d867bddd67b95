//! Repair-report intake with location-scoped duplicate detection.
//!
//! A new report is compared only against existing reports on the same floor and in
//! the same room (a common-area report only against common-area reports). The caller
//! narrows candidates to the same building beforehand.
//!
//! ```text
//! Pending ──embed──► detect ──matches──► Duplicate (no analysis, no id)
//!                        └──none─────► analyze ► store ► New(id)
//! ```

pub mod detector;
pub mod error;
pub mod types;
pub mod workflow;

#[cfg(test)]
mod tests;

pub use detector::DuplicateDetector;
pub use error::{IntakeError, IntakeResult};
pub use types::{
    AnalysisResult, DuplicateMatch, ImageInput, IntakeOutcome, IntakeRequest, Location,
    NewReport, Report, Severity,
};
pub use workflow::ReportIntakeWorkflow;
