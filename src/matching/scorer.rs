//! Component scores. Each function is pure and bounded by its weight.

use crate::constants::{
    AGE_PENALTY_PER_YEAR, AGE_WEIGHT, CLEANING_RANGE, DRINKING_RANGE, HABIT_WEIGHT,
    PREFERENCE_WEIGHT, SCHEDULE_MAX_DIFF, TEXT_WEIGHT, TIME_WEIGHT,
};

use super::types::{Preferences, Profile};

#[derive(Debug, Clone, Copy, PartialEq)]
/// Structured-comparison score split into its three parts.
pub struct TagScore {
    pub age: f32,
    pub time: f32,
    pub habit: f32,
}

impl TagScore {
    pub fn total(&self) -> f32 {
        self.age + self.time + self.habit
    }
}

/// `1.0` for equal values, falling linearly to `0.0` at `max_range` apart.
#[inline]
pub fn linear_decay(a: f32, b: f32, max_range: f32) -> f32 {
    let diff = (a - b).abs().min(max_range);
    (1.0 - diff / max_range).max(0.0)
}

/// Age part: 100 points minus 10 per year of difference, scaled to [`AGE_WEIGHT`].
pub fn age_score(age_diff: i32) -> f32 {
    let points = (100.0 - age_diff.unsigned_abs() as f32 * AGE_PENALTY_PER_YEAR).max(0.0);
    points * (AGE_WEIGHT / 100.0)
}

/// Schedule part: mean closeness of bedtime and wake-up time, scaled to [`TIME_WEIGHT`].
pub fn time_score(seeker: &Profile, candidate: &Profile) -> f32 {
    let sleep = linear_decay(seeker.sleep_time, candidate.sleep_time, SCHEDULE_MAX_DIFF);
    let wake = linear_decay(seeker.wake_time, candidate.wake_time, SCHEDULE_MAX_DIFF);
    (sleep + wake) / 2.0 * TIME_WEIGHT
}

/// Habit part: mean closeness of cleaning and drinking ranks, scaled to [`HABIT_WEIGHT`].
pub fn habit_score(seeker: &Profile, candidate: &Profile) -> f32 {
    let cleaning = linear_decay(
        seeker.cleaning_cycle.rank() as f32,
        candidate.cleaning_cycle.rank() as f32,
        CLEANING_RANGE,
    );
    let drinking = linear_decay(
        seeker.drinking_style.rank() as f32,
        candidate.drinking_style.rank() as f32,
        DRINKING_RANGE,
    );
    (cleaning + drinking) / 2.0 * HABIT_WEIGHT
}

/// All structured comparisons between `seeker` and `candidate` in `reference_year`.
pub fn tag_score(seeker: &Profile, candidate: &Profile, reference_year: i32) -> TagScore {
    let age_diff = seeker
        .age_in(reference_year)
        .saturating_sub(candidate.age_in(reference_year));
    TagScore {
        age: age_score(age_diff),
        time: time_score(seeker, candidate),
        habit: habit_score(seeker, candidate),
    }
}

/// Share of enabled preferences `candidate` satisfies, scaled to [`PREFERENCE_WEIGHT`].
///
/// No enabled preference means nothing to miss: the full weight is awarded.
pub fn preference_score(preferences: &Preferences, candidate: &Profile) -> f32 {
    let (active, matched) = preferences
        .active()
        .fold((0usize, 0usize), |(active, matched), kind| {
            (active + 1, matched + kind.is_satisfied_by(candidate) as usize)
        });

    if active == 0 {
        return PREFERENCE_WEIGHT;
    }

    PREFERENCE_WEIGHT * (matched as f32 / active as f32)
}

/// Text part from a similarity in `[0, 1]`, scaled to [`TEXT_WEIGHT`].
#[inline]
pub fn text_score(similarity: f32) -> f32 {
    similarity.clamp(0.0, 1.0) * TEXT_WEIGHT
}

/// Rounds to one decimal place for presentation.
#[inline]
pub fn round1(value: f32) -> f32 {
    (value * 10.0).round() / 10.0
}
