//! Roomfix library crate (used by the server and integration tests).
//!
//! Two services share one vector toolkit:
//!
//! - **Matching** ranks roommate candidates for a seeker by structured tags, checklist
//!   preferences, and self-description/criteria text similarity.
//! - **Repair** takes a facility-repair photo, checks it against existing reports on the
//!   same floor and room, and only analyzes and stores it when it is new.
//!
//! # Public API Surface
//!
//! - [`Config`], [`ConfigError`] - Server configuration
//! - [`CandidateRanker`], [`Profile`], [`Preferences`], [`RankedResult`] - Matching
//! - [`ReportIntakeWorkflow`], [`DuplicateDetector`], [`IntakeOutcome`] - Repair intake
//! - [`EmbeddingProvider`], [`VisionAnalyzer`] - External model seams
//! - [`VectorStore`], [`ReportStore`], [`ImageStore`] - Persistence seams
//! - [`cosine_similarity`], [`normalize`] - Vector math
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod config;
pub mod constants;
pub mod gateway;
pub mod matching;
pub mod providers;
pub mod repair;
pub mod store;
pub mod vector;

pub use config::{Config, ConfigError};
pub use matching::{
    CandidateRanker, MatchDetails, PreferenceKind, Preferences, Profile, RankedResult,
    RankerConfig, generate_profile_vectors, resolve_match_vectors, resolve_profile_vectors,
};
pub use providers::{
    EmbeddingKind, EmbeddingProvider, OfflineEmbeddingProvider, OfflineVisionAnalyzer,
    ProviderError, VisionAnalyzer,
};
pub use repair::{
    AnalysisResult, DuplicateDetector, DuplicateMatch, ImageInput, IntakeError, IntakeOutcome,
    IntakeRequest, Location, Report, ReportIntakeWorkflow, Severity,
};
pub use store::{
    FileImageStore, FileVectorStore, ImageStore, InMemoryReportStore, JsonlReportStore,
    ReportStore, StoreError, VectorKind, VectorStore,
};
pub use vector::{VectorError, cosine_similarity, normalize};
