//! One athlete's full attempt record: a [`SkillStats`] for every skill.

use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::score::ScoreValue;
use crate::skill::{round_one_decimal, summarize, Skill, SkillStats, SKILL_COUNT};

/// Stats for every [`Skill`]. No skill can be added or removed, only the
/// attempts inside each one change.
///
/// Serialized as a JSON object keyed by skill label. Skills missing from
/// the input come back empty and unknown labels are skipped.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(from = "BTreeMap<String, SkillStats>")]
pub struct MatchData {
    skills: [SkillStats; SKILL_COUNT],
}

impl From<BTreeMap<Skill, SkillStats>> for MatchData {
    fn from(mut map: BTreeMap<Skill, SkillStats>) -> Self {
        let mut data = Self::new();
        for skill in Skill::ALL {
            if let Some(stats) = map.remove(&skill) {
                data.skills[skill.index()] = stats;
            }
        }
        data
    }
}

impl From<BTreeMap<String, SkillStats>> for MatchData {
    fn from(map: BTreeMap<String, SkillStats>) -> Self {
        let mut known = BTreeMap::new();
        for (label, stats) in map {
            match label.parse::<Skill>() {
                Ok(skill) => {
                    known.insert(skill, stats);
                }
                Err(_) => tracing::warn!(%label, "skipping stats for unknown skill"),
            }
        }
        Self::from(known)
    }
}

impl Serialize for MatchData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(SKILL_COUNT))?;
        for (skill, stats) in self.iter() {
            map.serialize_entry(skill.label(), stats)?;
        }
        map.end()
    }
}

/// Efficiency band used to colour a chart bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    Strong,
    Average,
    Weak,
}

/// One bar of the per-skill efficiency chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartBar {
    pub skill: Skill,
    /// Efficiency rounded to one decimal.
    pub efficiency: f64,
}

impl ChartBar {
    /// Strong from 70%, average from 40%, weak below.
    pub fn band(&self) -> Band {
        if self.efficiency >= 70.0 {
            Band::Strong
        } else if self.efficiency >= 40.0 {
            Band::Average
        } else {
            Band::Weak
        }
    }
}

/// Aggregates across every skill of a [`MatchData`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Totals {
    pub recorded: usize,
    pub success_count: u32,
    pub error_count: u32,
    pub efficiency: f64,
}

impl MatchData {
    /// Every skill with all slots empty.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stats of one skill.
    pub fn get(&self, skill: Skill) -> &SkillStats {
        &self.skills[skill.index()]
    }

    pub(crate) fn get_mut(&mut self, skill: Skill) -> &mut SkillStats {
        &mut self.skills[skill.index()]
    }

    /// Skills and their stats in display order.
    pub fn iter(&self) -> impl Iterator<Item = (Skill, &SkillStats)> {
        Skill::ALL.into_iter().zip(self.skills.iter())
    }

    /// No attempt recorded in any skill.
    pub fn is_blank(&self) -> bool {
        self.skills.iter().all(|s| s.recorded_count() == 0)
    }

    /// Rounded efficiency per skill, for the bar chart.
    pub fn chart_data(&self) -> Vec<ChartBar> {
        self.iter()
            .map(|(skill, stats)| ChartBar {
                skill,
                efficiency: stats.efficiency_rounded(),
            })
            .collect()
    }

    /// Reduce every attempt of every skill as one sequence.
    pub fn totals(&self) -> Totals {
        let all: Vec<ScoreValue> = self
            .skills
            .iter()
            .flat_map(|s| s.attempts().iter().copied())
            .collect();
        let summary = summarize(&all);
        Totals {
            recorded: self.skills.iter().map(SkillStats::recorded_count).sum(),
            success_count: summary.success_count,
            error_count: summary.error_count,
            efficiency: round_one_decimal(summary.efficiency),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skill::MAX_ATTEMPTS;

    #[test]
    fn new_match_data_is_blank_for_every_skill() {
        let data = MatchData::new();
        assert_eq!(data.iter().count(), SKILL_COUNT);
        for (_, stats) in data.iter() {
            assert_eq!(stats.attempts(), &[ScoreValue::Empty; MAX_ATTEMPTS]);
            assert_eq!(stats.success_count(), 0);
            assert_eq!(stats.error_count(), 0);
            assert_eq!(stats.efficiency(), 0.0);
        }
        assert!(data.is_blank());
    }

    #[test]
    fn serializes_keyed_by_label() {
        let value = serde_json::to_value(MatchData::new()).unwrap();
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        for skill in Skill::ALL {
            assert!(keys.contains(&skill.label().to_string()));
        }
    }

    #[test]
    fn missing_skills_are_filled_on_load() {
        let json = r#"{"Saque":{"attempts":[3,3]}}"#;
        let data: MatchData = serde_json::from_str(json).unwrap();
        assert_eq!(data.get(Skill::Serve).success_count(), 2);
        assert_eq!(data.get(Skill::Block), &SkillStats::new());
    }

    #[test]
    fn unknown_skill_key_is_skipped() {
        let json = r#"{"Defesa":{"attempts":[3]},"Saque":{"attempts":[2,0]}}"#;
        let data: MatchData = serde_json::from_str(json).unwrap();
        assert_eq!(data.get(Skill::Serve).recorded_count(), 2);
        assert_eq!(data.totals().recorded, 2);
    }

    #[test]
    fn chart_data_rounds_and_bands() {
        let mut data = MatchData::new();
        let attack = data.get_mut(Skill::Attack);
        attack.set(0, ScoreValue::Excellent);
        attack.set(1, ScoreValue::Good);
        attack.set(2, ScoreValue::Error);
        data.get_mut(Skill::Serve).set(0, ScoreValue::Excellent);

        let chart = data.chart_data();
        assert_eq!(chart.len(), SKILL_COUNT);
        let attack = chart.iter().find(|b| b.skill == Skill::Attack).unwrap();
        assert_eq!(attack.efficiency, 55.6);
        assert_eq!(attack.band(), Band::Average);
        assert_eq!(chart[0].band(), Band::Strong);
        assert_eq!(chart[1].band(), Band::Weak);
    }

    #[test]
    fn totals_span_all_skills() {
        let mut data = MatchData::new();
        data.get_mut(Skill::Serve).set(0, ScoreValue::Good);
        data.get_mut(Skill::Pass).set(3, ScoreValue::Error);
        data.get_mut(Skill::Teamwork).set(9, ScoreValue::Poor);

        let totals = data.totals();
        assert_eq!(totals.recorded, 3);
        assert_eq!(totals.success_count, 1);
        assert_eq!(totals.error_count, 1);
        assert_eq!(totals.efficiency, 33.3);
    }
}
