//! The six volleyball skills and the per-skill attempt record.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::score::{ScoreValue, MAX_POINTS};

/// Number of attempt slots tracked per skill.
pub const MAX_ATTEMPTS: usize = 10;

/// Number of skills in every [`crate::MatchData`].
pub const SKILL_COUNT: usize = 6;

/// A tracked skill. Serialized by its localized label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Skill {
    #[serde(rename = "Saque")]
    Serve,
    #[serde(rename = "Passe")]
    Pass,
    #[serde(rename = "Ataque")]
    Attack,
    #[serde(rename = "Bloqueio")]
    Block,
    #[serde(rename = "Levantamento")]
    Set,
    #[serde(rename = "Coletividade")]
    Teamwork,
}

impl Skill {
    /// Every skill, in display order.
    pub const ALL: [Skill; SKILL_COUNT] = [
        Skill::Serve,
        Skill::Pass,
        Skill::Attack,
        Skill::Block,
        Skill::Set,
        Skill::Teamwork,
    ];

    /// Display label, also the snapshot key.
    pub fn label(self) -> &'static str {
        match self {
            Skill::Serve => "Saque",
            Skill::Pass => "Passe",
            Skill::Attack => "Ataque",
            Skill::Block => "Bloqueio",
            Skill::Set => "Levantamento",
            Skill::Teamwork => "Coletividade",
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Skill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A skill name that is neither an English name nor a localized label.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown skill `{0}`")]
pub struct UnknownSkill(pub String);

impl FromStr for Skill {
    type Err = UnknownSkill;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "serve" | "saque" => Ok(Skill::Serve),
            "pass" | "passe" => Ok(Skill::Pass),
            "attack" | "ataque" => Ok(Skill::Attack),
            "block" | "bloqueio" => Ok(Skill::Block),
            "set" | "levantamento" => Ok(Skill::Set),
            "teamwork" | "coletividade" => Ok(Skill::Teamwork),
            unknown => Err(UnknownSkill(unknown.to_string())),
        }
    }
}

/// Aggregates derived from a sequence of attempts.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SkillSummary {
    pub success_count: u32,
    pub error_count: u32,
    /// Percentage of available points earned, in `[0, 100]`.
    pub efficiency: f64,
}

/// Reduce attempts to their aggregates. Empty slots are ignored entirely.
pub fn summarize(attempts: &[ScoreValue]) -> SkillSummary {
    let mut recorded = 0u32;
    let mut points = 0u32;
    let mut summary = SkillSummary::default();

    for value in attempts {
        let Some(p) = value.points() else {
            continue;
        };
        recorded += 1;
        points += p;
        if value.is_success() {
            summary.success_count += 1;
        }
        if value.is_error() {
            summary.error_count += 1;
        }
    }

    if recorded > 0 {
        summary.efficiency = points as f64 / (recorded * MAX_POINTS) as f64 * 100.0;
    }
    summary
}

/// Round to one decimal place, the precision efficiencies are shown with.
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// The attempt slots of one skill for one athlete.
///
/// The counts and efficiency are a cache of [`summarize`] over `attempts`
/// and are refreshed on every write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SkillStatsRecord", rename_all = "camelCase")]
pub struct SkillStats {
    attempts: [ScoreValue; MAX_ATTEMPTS],
    success_count: u32,
    error_count: u32,
    efficiency: f64,
}

/// Wire form accepted when loading. Stored aggregates are ignored and
/// recomputed from the attempts. Attempts that are not a valid ordinal
/// load as empty slots.
#[derive(Deserialize)]
struct SkillStatsRecord {
    #[serde(default)]
    attempts: Vec<serde_json::Value>,
}

impl From<SkillStatsRecord> for SkillStats {
    fn from(record: SkillStatsRecord) -> Self {
        let values: Vec<ScoreValue> = record.attempts.iter().map(lenient_score).collect();
        Self::from_attempts(&values)
    }
}

fn lenient_score(raw: &serde_json::Value) -> ScoreValue {
    let parsed = raw
        .as_i64()
        .and_then(|n| i8::try_from(n).ok())
        .and_then(|n| ScoreValue::try_from(n).ok());
    match parsed {
        Some(value) => value,
        None => {
            tracing::warn!(%raw, "treating invalid attempt value as empty");
            ScoreValue::Empty
        }
    }
}

impl Default for SkillStats {
    fn default() -> Self {
        Self::new()
    }
}

impl SkillStats {
    /// All slots empty.
    pub fn new() -> Self {
        Self {
            attempts: [ScoreValue::Empty; MAX_ATTEMPTS],
            success_count: 0,
            error_count: 0,
            efficiency: 0.0,
        }
    }

    /// Build from any number of attempts: extra values are dropped and
    /// missing slots are left empty.
    pub fn from_attempts(values: &[ScoreValue]) -> Self {
        let mut stats = Self::new();
        for (slot, value) in stats.attempts.iter_mut().zip(values) {
            *slot = *value;
        }
        stats.refresh();
        stats
    }

    /// Every slot in order, empty ones included.
    pub fn attempts(&self) -> &[ScoreValue; MAX_ATTEMPTS] {
        &self.attempts
    }

    /// Attempts scored good or excellent.
    pub fn success_count(&self) -> u32 {
        self.success_count
    }

    /// Attempts scored as errors.
    pub fn error_count(&self) -> u32 {
        self.error_count
    }

    /// Unrounded efficiency percentage.
    pub fn efficiency(&self) -> f64 {
        self.efficiency
    }

    /// Efficiency rounded to one decimal, as displayed.
    pub fn efficiency_rounded(&self) -> f64 {
        round_one_decimal(self.efficiency)
    }

    /// Cached aggregates as a [`SkillSummary`].
    pub fn summary(&self) -> SkillSummary {
        SkillSummary {
            success_count: self.success_count,
            error_count: self.error_count,
            efficiency: self.efficiency,
        }
    }

    /// Write `value` into slot `index` and refresh the aggregates.
    ///
    /// Returns `false` without touching anything when `index` is out of range.
    pub fn set(&mut self, index: usize, value: ScoreValue) -> bool {
        let Some(slot) = self.attempts.get_mut(index) else {
            return false;
        };
        *slot = value;
        self.refresh();
        true
    }

    /// Number of non-empty slots.
    pub fn recorded_count(&self) -> usize {
        self.attempts.iter().filter(|a| !a.is_empty()).count()
    }

    /// Every slot recorded.
    pub fn is_full(&self) -> bool {
        self.first_empty_slot().is_none()
    }

    /// Lowest slot still empty.
    pub fn first_empty_slot(&self) -> Option<usize> {
        self.attempts.iter().position(|a| a.is_empty())
    }

    /// Highest slot holding a recorded attempt.
    pub fn last_filled_slot(&self) -> Option<usize> {
        self.attempts.iter().rposition(|a| !a.is_empty())
    }

    fn refresh(&mut self) {
        let summary = summarize(&self.attempts);
        self.success_count = summary.success_count;
        self.error_count = summary.error_count;
        self.efficiency = summary.efficiency;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use crate::score::ScoreValue::*;

    fn padded(values: &[ScoreValue]) -> Vec<ScoreValue> {
        let mut v = values.to_vec();
        v.resize(MAX_ATTEMPTS, Empty);
        v
    }

    #[test]
    fn all_empty_has_zero_efficiency() {
        let summary = summarize(&[Empty; MAX_ATTEMPTS]);
        assert_eq!(summary, SkillSummary::default());
    }

    #[test]
    fn mixed_attempts_summary() {
        let summary = summarize(&padded(&[Excellent, Good, Error]));
        assert_eq!(summary.success_count, 2);
        assert_eq!(summary.error_count, 1);
        // 100 * (3 + 2 + 0) / (3 * 3)
        assert_eq!(round_one_decimal(summary.efficiency), 55.6);
    }

    #[test]
    fn poor_counts_as_neither_success_nor_error() {
        let summary = summarize(&padded(&[Poor, Poor]));
        assert_eq!(summary.success_count, 0);
        assert_eq!(summary.error_count, 0);
        assert!((summary.efficiency - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn empty_slots_between_values_are_ignored() {
        let sparse = summarize(&[Good, Empty, Empty, Excellent]);
        let dense = summarize(&[Good, Excellent]);
        assert_eq!(sparse, dense);
    }

    #[test]
    fn set_refreshes_aggregates() {
        let mut stats = SkillStats::new();
        assert!(stats.set(0, Excellent));
        assert_eq!(stats.success_count(), 1);
        assert_eq!(stats.efficiency(), 100.0);

        assert!(stats.set(0, Error));
        assert_eq!(stats.success_count(), 0);
        assert_eq!(stats.error_count(), 1);
        assert_eq!(stats.efficiency(), 0.0);
    }

    #[test]
    fn set_out_of_range_is_ignored() {
        let mut stats = SkillStats::new();
        assert!(!stats.set(MAX_ATTEMPTS, Good));
        assert_eq!(stats, SkillStats::new());
    }

    #[test]
    fn slot_lookups() {
        let stats = SkillStats::from_attempts(&[Good, Empty, Poor]);
        assert_eq!(stats.first_empty_slot(), Some(1));
        assert_eq!(stats.last_filled_slot(), Some(2));
        assert_eq!(stats.recorded_count(), 2);
        assert!(!stats.is_full());

        let full = SkillStats::from_attempts(&[Good; MAX_ATTEMPTS]);
        assert!(full.is_full());
        assert_eq!(SkillStats::new().last_filled_slot(), None);
    }

    #[test]
    fn loading_recomputes_cached_fields() {
        let json = r#"{"attempts":[3,2,0,-1],"successCount":9,"errorCount":9,"efficiency":1.0}"#;
        let stats: SkillStats = serde_json::from_str(json).unwrap();
        assert_eq!(stats.attempts().len(), MAX_ATTEMPTS);
        assert_eq!(stats.success_count(), 2);
        assert_eq!(stats.error_count(), 1);
        assert_eq!(stats.efficiency_rounded(), 55.6);
    }

    #[test]
    fn invalid_attempts_load_as_empty() {
        let json = r#"{"attempts":[3,7,"2",null,0]}"#;
        let stats: SkillStats = serde_json::from_str(json).unwrap();
        assert_eq!(stats.attempts()[0], ScoreValue::Excellent);
        assert_eq!(stats.attempts()[1], ScoreValue::Empty);
        assert_eq!(stats.attempts()[2], ScoreValue::Empty);
        assert_eq!(stats.attempts()[4], ScoreValue::Error);
        assert_eq!(stats.recorded_count(), 2);
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let stats = SkillStats::from_attempts(&[Good]);
        let value = serde_json::to_value(&stats).unwrap();
        assert_eq!(value["successCount"], 1);
        assert_eq!(value["errorCount"], 0);
        assert_eq!(value["attempts"][0], 2);
        assert_eq!(value["attempts"][1], -1);
    }

    #[test]
    fn skill_parses_english_and_labels() {
        assert_eq!("serve".parse::<Skill>().unwrap(), Skill::Serve);
        assert_eq!("Levantamento".parse::<Skill>().unwrap(), Skill::Set);
        assert!("dig".parse::<Skill>().is_err());
        assert_eq!(Skill::Teamwork.to_string(), "Coletividade");
    }

    fn score_value() -> impl Strategy<Value = ScoreValue> {
        prop_oneof![
            Just(Empty),
            Just(Error),
            Just(Poor),
            Just(Good),
            Just(Excellent),
        ]
    }

    proptest! {
        #[test]
        fn efficiency_is_a_percentage(
            attempts in prop::collection::vec(score_value(), MAX_ATTEMPTS)
        ) {
            let summary = summarize(&attempts);
            prop_assert!((0.0..=100.0).contains(&summary.efficiency));
        }

        #[test]
        fn counts_never_exceed_recorded(
            attempts in prop::collection::vec(score_value(), MAX_ATTEMPTS)
        ) {
            let summary = summarize(&attempts);
            let recorded = attempts.iter().filter(|a| !a.is_empty()).count() as u32;
            prop_assert!(summary.success_count + summary.error_count <= recorded);
        }

        #[test]
        fn clearing_an_empty_slot_is_idempotent(
            attempts in prop::collection::vec(score_value(), MAX_ATTEMPTS),
            index in 0..MAX_ATTEMPTS,
        ) {
            let mut stats = SkillStats::from_attempts(&attempts);
            stats.set(index, Empty);
            let before = stats.clone();
            stats.set(index, Empty);
            prop_assert_eq!(stats, before);
        }

        #[test]
        fn cache_matches_reducer(
            writes in prop::collection::vec((0..MAX_ATTEMPTS + 2, score_value()), 0..40)
        ) {
            let mut stats = SkillStats::new();
            for (index, value) in writes {
                stats.set(index, value);
            }
            prop_assert_eq!(stats.summary(), summarize(stats.attempts()));
        }
    }
}
