//! Roommate candidate ranking.
//!
//! A candidate's total (0 to 100) is the sum of three independent components:
//!
//! - tag score (40): age closeness, sleep/wake schedule, cleaning and drinking habits;
//! - preference score (30): share of the seeker's enabled toggles the candidate meets;
//! - text score (30): cosine similarity of the seeker's roommate criteria vector and the
//!   candidate's self-description vector.
//!
//! Missing vectors only zero the text component. Eligibility filtering (gender, age
//! range, dorm) is the caller's job; the ranker scores whatever it is given.

pub mod ranker;
pub mod scorer;
pub mod types;
pub mod vectors;


pub use ranker::{CandidateRanker, RankerConfig};
pub use scorer::TagScore;
pub use types::{
    CleaningCycle, DrinkingStyle, MatchDetails, PreferenceKind, Preferences, Profile,
    RankedResult,
};
pub use vectors::{
    ProfileVectorReport, VectorSaveStatus, generate_profile_vectors, resolve_match_vectors,
    resolve_profile_vectors,
};
