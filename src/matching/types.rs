use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
/// How often a person cleans. Lower rank is tidier.
pub enum CleaningCycle {
    Daily,
    EveryTwoDays,
    Weekly,
    Monthly,
    Never,
}

impl CleaningCycle {
    /// Ordinal rank, `0` (daily) to `4` (never).
    pub fn rank(&self) -> u8 {
        match self {
            CleaningCycle::Daily => 0,
            CleaningCycle::EveryTwoDays => 1,
            CleaningCycle::Weekly => 2,
            CleaningCycle::Monthly => 3,
            CleaningCycle::Never => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
/// How often a person drinks. Lower rank is dryer.
pub enum DrinkingStyle {
    Rarely,
    Sometimes,
    Frequently,
}

impl DrinkingStyle {
    /// Ordinal rank, `0` (rarely) to `2` (frequently).
    pub fn rank(&self) -> u8 {
        match self {
            DrinkingStyle::Rarely => 0,
            DrinkingStyle::Sometimes => 1,
            DrinkingStyle::Frequently => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// A seeker or candidate, as sent by the backend.
pub struct Profile {
    /// Unique within one ranking request.
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub gender: String,
    pub birth_year: i32,
    #[serde(default)]
    pub kakao_id: Option<String>,
    #[serde(default)]
    pub mbti: Option<String>,

    pub smoker: bool,
    pub snoring: bool,
    pub bug_killer: bool,
    #[serde(default)]
    pub heavy_sleeper: bool,
    #[serde(default)]
    pub good_at_waking: bool,

    /// Usual bedtime on a 0-24 scale.
    pub sleep_time: f32,
    /// Usual wake-up time on a 0-24 scale.
    pub wake_time: f32,

    pub cleaning_cycle: CleaningCycle,
    pub drinking_style: DrinkingStyle,

    #[serde(default)]
    pub absent_days: Option<Vec<String>>,
    #[serde(default)]
    pub hobby: Option<String>,

    #[serde(default)]
    pub self_description: Option<String>,
    #[serde(default)]
    pub roommate_description: Option<String>,

    /// Vector of `self_description`; what candidates are searched by.
    #[serde(default, rename = "selfIntroductionEmbedding")]
    pub self_embedding: Option<Vec<f32>>,
    /// Vector of `roommate_description`; the seeker's query.
    #[serde(default, rename = "roommateCriteriaEmbedding")]
    pub criteria_embedding: Option<Vec<f32>>,
}

impl Profile {
    /// Age in `reference_year`. Saturates on out-of-range birth years.
    pub fn age_in(&self, reference_year: i32) -> i32 {
        reference_year.saturating_sub(self.birth_year)
    }

    /// Age in the current calendar year.
    pub fn age(&self) -> i32 {
        self.age_in(current_year())
    }

    /// Self-description vector, if present and non-empty.
    pub fn self_vector(&self) -> Option<&[f32]> {
        self.self_embedding.as_deref().filter(|v| !v.is_empty())
    }

    /// Roommate-criteria vector, if present and non-empty.
    pub fn criteria_vector(&self) -> Option<&[f32]> {
        self.criteria_embedding.as_deref().filter(|v| !v.is_empty())
    }
}

/// Current calendar year (UTC).
pub fn current_year() -> i32 {
    Utc::now().year()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// One checklist item a seeker may require of a candidate.
pub enum PreferenceKind {
    NonSmoker,
    GoodAtBugs,
    QuietSleeper,
    NonDrinker,
    HeavySleeper,
    GoodAtWaking,
}

impl PreferenceKind {
    pub const ALL: [PreferenceKind; 6] = [
        PreferenceKind::NonSmoker,
        PreferenceKind::GoodAtBugs,
        PreferenceKind::QuietSleeper,
        PreferenceKind::NonDrinker,
        PreferenceKind::HeavySleeper,
        PreferenceKind::GoodAtWaking,
    ];

    /// Whether `candidate` satisfies this preference.
    pub fn is_satisfied_by(&self, candidate: &Profile) -> bool {
        match self {
            PreferenceKind::NonSmoker => !candidate.smoker,
            PreferenceKind::GoodAtBugs => candidate.bug_killer,
            PreferenceKind::QuietSleeper => !candidate.snoring,
            PreferenceKind::NonDrinker => candidate.drinking_style == DrinkingStyle::Rarely,
            PreferenceKind::HeavySleeper => candidate.heavy_sleeper,
            PreferenceKind::GoodAtWaking => candidate.good_at_waking,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// The seeker's checklist. Every enabled toggle weighs the same.
pub struct Preferences {
    #[serde(default)]
    pub prefer_non_smoker: bool,
    #[serde(default)]
    pub prefer_good_at_bugs: bool,
    #[serde(default)]
    pub prefer_quiet_sleeper: bool,
    #[serde(default)]
    pub prefer_non_drinker: bool,
    #[serde(default)]
    pub prefer_heavy_sleeper: bool,
    #[serde(default)]
    pub prefer_good_at_waking: bool,

    /// Accepted for compatibility; hard filtering happens upstream, not in the ranker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_gender: Option<String>,
    /// Accepted for compatibility; see `target_gender`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_age_range: Option<(i32, i32)>,
}

impl Preferences {
    /// Whether the toggle for `kind` is on.
    pub fn is_enabled(&self, kind: PreferenceKind) -> bool {
        match kind {
            PreferenceKind::NonSmoker => self.prefer_non_smoker,
            PreferenceKind::GoodAtBugs => self.prefer_good_at_bugs,
            PreferenceKind::QuietSleeper => self.prefer_quiet_sleeper,
            PreferenceKind::NonDrinker => self.prefer_non_drinker,
            PreferenceKind::HeavySleeper => self.prefer_heavy_sleeper,
            PreferenceKind::GoodAtWaking => self.prefer_good_at_waking,
        }
    }

    /// Enabled toggles, in declaration order.
    pub fn active(&self) -> impl Iterator<Item = PreferenceKind> + '_ {
        PreferenceKind::ALL
            .into_iter()
            .filter(move |kind| self.is_enabled(*kind))
    }

    /// Turns `kind` on (builder style).
    pub fn with(mut self, kind: PreferenceKind) -> Self {
        match kind {
            PreferenceKind::NonSmoker => self.prefer_non_smoker = true,
            PreferenceKind::GoodAtBugs => self.prefer_good_at_bugs = true,
            PreferenceKind::QuietSleeper => self.prefer_quiet_sleeper = true,
            PreferenceKind::NonDrinker => self.prefer_non_drinker = true,
            PreferenceKind::HeavySleeper => self.prefer_heavy_sleeper = true,
            PreferenceKind::GoodAtWaking => self.prefer_good_at_waking = true,
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Per-component scores of one ranked candidate, rounded to one decimal.
pub struct MatchDetails {
    pub tag_score: f32,
    pub pref_score: f32,
    pub text_score: f32,
    pub age: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// One entry of the seeker's shortlist.
pub struct RankedResult {
    pub user_id: i64,
    pub name: String,
    /// Sum of the components, rounded to one decimal.
    pub total_score: f32,
    /// 1-based position in the returned list.
    pub rank: usize,
    pub match_details: MatchDetails,
}
