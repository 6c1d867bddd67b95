//! Cross-cutting, shared constants.
//!
//! Scoring weights are expressed in points out of [`MAX_TOTAL_SCORE`]. Prefer deriving
//! secondary values (e.g. the tag weight) from the primary component weights to avoid drift.

/// Upper bound of a candidate's total score.
pub const MAX_TOTAL_SCORE: f32 = 100.0;

/// Age sub-component of the tag score.
pub const AGE_WEIGHT: f32 = 5.0;
/// Sleep/wake schedule sub-component of the tag score.
pub const TIME_WEIGHT: f32 = 20.0;
/// Cleaning/drinking habit sub-component of the tag score.
pub const HABIT_WEIGHT: f32 = 15.0;
/// Total weight of structured profile comparisons.
pub const TAG_WEIGHT: f32 = AGE_WEIGHT + TIME_WEIGHT + HABIT_WEIGHT;

/// Weight of the preference-satisfaction score.
pub const PREFERENCE_WEIGHT: f32 = 30.0;

/// Weight of the text (embedding) similarity score.
pub const TEXT_WEIGHT: f32 = 30.0;

/// Points deducted from the 100-point age scale per year of difference.
pub const AGE_PENALTY_PER_YEAR: f32 = 10.0;

/// Schedule difference (hours) at which the time term reaches zero.
pub const SCHEDULE_MAX_DIFF: f32 = 6.0;

/// Span of the cleaning-cycle ordinal (DAILY=0 .. NEVER=4).
pub const CLEANING_RANGE: f32 = 4.0;

/// Span of the drinking-style ordinal (RARELY=0 .. FREQUENTLY=2).
pub const DRINKING_RANGE: f32 = 2.0;

/// Default cap on the number of ranked results returned.
pub const DEFAULT_MAX_RESULTS: usize = 20;

/// Default similarity at or above which a report is a duplicate.
pub const DEFAULT_DUPLICATE_THRESHOLD: f32 = 0.80;

/// Priority assigned to the fallback analysis when the vision model fails.
pub const FALLBACK_PRIORITY: u8 = 5;
