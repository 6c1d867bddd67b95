use std::cmp::Ordering;

use tracing::debug;

use super::scorer::{preference_score, round1, tag_score, text_score};
use super::types::{MatchDetails, Preferences, Profile, RankedResult, current_year};
use crate::constants::{DEFAULT_MAX_RESULTS, MAX_TOTAL_SCORE};
use crate::vector::similarity_map;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankerConfig {
    /// Length cap of the returned shortlist.
    pub max_results: usize,
}

impl Default for RankerConfig {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

impl RankerConfig {
    pub fn with_max_results(max_results: usize) -> Self {
        Self { max_results }
    }
}

#[derive(Debug, Clone)]
struct ScoredCandidate<'a> {
    candidate: &'a Profile,
    total: f32,
    tag: f32,
    preference: f32,
    text: f32,
    age: i32,
}

#[derive(Debug, Clone, Default)]
/// Ranks candidates for a seeker by tag, preference, and text similarity.
///
/// Stateless apart from its config; safe to share across requests.
pub struct CandidateRanker {
    config: RankerConfig,
}

impl CandidateRanker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RankerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RankerConfig {
        &self.config
    }

    /// Ranks `candidates` with ages computed for the current year.
    pub fn rank(
        &self,
        seeker: &Profile,
        preferences: &Preferences,
        candidates: &[Profile],
    ) -> Vec<RankedResult> {
        self.rank_in_year(seeker, preferences, candidates, current_year())
    }

    /// Ranks `candidates` with ages computed for `reference_year`.
    ///
    /// The seeker is never ranked against themselves. Ordering uses unrounded totals;
    /// equal totals keep input order. At most `max_results` entries are returned,
    /// ranked `1..=N`.
    pub fn rank_in_year(
        &self,
        seeker: &Profile,
        preferences: &Preferences,
        candidates: &[Profile],
        reference_year: i32,
    ) -> Vec<RankedResult> {
        let eligible: Vec<&Profile> = candidates.iter().filter(|c| c.id != seeker.id).collect();

        let similarities = match seeker.criteria_vector() {
            Some(query) => similarity_map(
                query,
                eligible
                    .iter()
                    .enumerate()
                    .map(|(idx, c)| (idx, c.self_vector())),
            ),
            None => Default::default(),
        };

        let mut scored: Vec<ScoredCandidate<'_>> = eligible
            .iter()
            .enumerate()
            .map(|(idx, candidate)| {
                let tag = tag_score(seeker, candidate, reference_year).total();
                let preference = preference_score(preferences, candidate);
                let text = text_score(similarities.get(&idx).copied().unwrap_or(0.0));
                let total = (tag + preference + text).clamp(0.0, MAX_TOTAL_SCORE);

                ScoredCandidate {
                    candidate,
                    total,
                    tag,
                    preference,
                    text,
                    age: candidate.age_in(reference_year),
                }
            })
            .collect();

        // Stable: equal totals keep input order.
        scored.sort_by(|a, b| b.total.partial_cmp(&a.total).unwrap_or(Ordering::Equal));
        scored.truncate(self.config.max_results);

        debug!(
            seeker_id = seeker.id,
            candidates = candidates.len(),
            eligible = eligible.len(),
            with_text_signal = similarities.len(),
            returned = scored.len(),
            "Ranked candidates"
        );

        scored
            .into_iter()
            .enumerate()
            .map(|(idx, s)| RankedResult {
                user_id: s.candidate.id,
                name: s.candidate.name.clone(),
                total_score: round1(s.total),
                rank: idx + 1,
                match_details: MatchDetails {
                    tag_score: round1(s.tag),
                    pref_score: round1(s.preference),
                    text_score: round1(s.text),
                    age: s.age,
                },
            })
            .collect()
    }
}
