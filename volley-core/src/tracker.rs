//! The roster of athletes, their stats, and the operations that mutate them.
//!
//! A [`Tracker`] owns every athlete together with their [`MatchData`], so an
//! athlete can never exist without stats or the other way round. It also
//! holds the selection: the athlete whose stats attempt updates apply to.

use std::collections::BTreeMap;

use crate::athlete::{Athlete, AthleteId, Position};
use crate::match_data::MatchData;
use crate::score::ScoreValue;
use crate::skill::Skill;
use crate::storage::Snapshot;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TrackerError {
    /// Removing the athlete would leave the roster empty.
    #[error("cannot remove {0}: the roster must keep at least one athlete")]
    LastAthlete(String),

    #[error("no athlete with id `{0}`")]
    UnknownAthlete(AthleteId),
}

/// A single slot write that actually happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptUpdate {
    pub athlete: AthleteId,
    pub skill: Skill,
    pub slot: usize,
    pub value: ScoreValue,
}

#[derive(Debug, Clone, PartialEq)]
struct Entry {
    athlete: Athlete,
    stats: MatchData,
}

impl Entry {
    fn new(athlete: Athlete) -> Self {
        Self {
            athlete,
            stats: MatchData::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tracker {
    entries: Vec<Entry>,
    selected: usize,
}

impl Default for Tracker {
    fn default() -> Self {
        Self::new()
    }
}

impl Tracker {
    /// A roster holding only the example athlete, selected.
    pub fn new() -> Self {
        Self {
            entries: vec![Entry::new(Athlete::example())],
            selected: 0,
        }
    }

    /// Rebuild from a stored snapshot, repairing anything that would break
    /// the roster invariants.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let Snapshot {
            athletes,
            mut stats_by_athlete,
        } = snapshot;

        let mut entries: Vec<Entry> = Vec::with_capacity(athletes.len());
        for athlete in athletes {
            if entries.iter().any(|e| e.athlete.id == athlete.id) {
                tracing::warn!(id = %athlete.id, "dropping athlete with duplicate id");
                continue;
            }
            let stats = stats_by_athlete.remove(&athlete.id).unwrap_or_else(|| {
                tracing::warn!(id = %athlete.id, "athlete had no stats, starting empty");
                MatchData::new()
            });
            entries.push(Entry { athlete, stats });
        }

        for id in stats_by_athlete.keys() {
            tracing::warn!(%id, "dropping stats of unknown athlete");
        }

        if entries.is_empty() {
            tracing::warn!("snapshot had no athletes, starting from the default roster");
            return Self::new();
        }

        Self {
            entries,
            selected: 0,
        }
    }

    /// Roster and stats in their stored form.
    pub fn to_snapshot(&self) -> Snapshot {
        Snapshot {
            athletes: self.athletes().cloned().collect(),
            stats_by_athlete: self
                .entries
                .iter()
                .map(|e| (e.athlete.id.clone(), e.stats.clone()))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    // ------------------------------------------------------------------
    // Roster
    // ------------------------------------------------------------------

    /// Athletes in roster order.
    pub fn athletes(&self) -> impl Iterator<Item = &Athlete> {
        self.entries.iter().map(|e| &e.athlete)
    }

    /// Number of athletes, never zero.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false`; present for symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up an athlete by id.
    pub fn athlete(&self, id: &AthleteId) -> Option<&Athlete> {
        self.position_of(id).map(|i| &self.entries[i].athlete)
    }

    /// Stats of the athlete with `id`.
    pub fn stats(&self, id: &AthleteId) -> Option<&MatchData> {
        self.position_of(id).map(|i| &self.entries[i].stats)
    }

    /// Append a new athlete with empty stats. The selection is left alone.
    ///
    /// Returns `None` when the trimmed name is empty.
    pub fn add(&mut self, name: &str, position: Position) -> Option<AthleteId> {
        let name = name.trim();
        if name.is_empty() {
            tracing::debug!("ignoring athlete with empty name");
            return None;
        }
        let id = AthleteId::generate(|id| self.position_of(id).is_some());
        self.entries.push(Entry::new(Athlete {
            id: id.clone(),
            name: name.to_string(),
            position,
        }));
        tracing::info!(%id, %name, %position, "athlete added");
        Some(id)
    }

    /// Rename and reposition an athlete. Id and stats are untouched.
    ///
    /// Returns `false` for an unknown id or an empty trimmed name.
    pub fn edit(&mut self, id: &AthleteId, name: &str, position: Position) -> bool {
        let name = name.trim();
        let Some(index) = self.position_of(id) else {
            tracing::debug!(%id, "ignoring edit of unknown athlete");
            return false;
        };
        if name.is_empty() {
            tracing::debug!(%id, "ignoring edit with empty name");
            return false;
        }
        let athlete = &mut self.entries[index].athlete;
        athlete.name = name.to_string();
        athlete.position = position;
        tracing::info!(%id, %name, %position, "athlete edited");
        true
    }

    /// Remove an athlete together with their stats.
    ///
    /// If the removed athlete was selected, the first remaining athlete
    /// becomes selected.
    pub fn remove(&mut self, id: &AthleteId) -> Result<Athlete, TrackerError> {
        let index = self
            .position_of(id)
            .ok_or_else(|| TrackerError::UnknownAthlete(id.clone()))?;
        if self.entries.len() == 1 {
            return Err(TrackerError::LastAthlete(
                self.entries[index].athlete.name.clone(),
            ));
        }

        let removed = self.entries.remove(index);
        if index == self.selected {
            self.selected = 0;
        } else if index < self.selected {
            self.selected -= 1;
        }
        tracing::info!(%id, name = %removed.athlete.name, "athlete removed");
        Ok(removed.athlete)
    }

    /// Drop every athlete and start over from the default roster.
    pub fn full_reset(&mut self) {
        *self = Self::new();
        tracing::info!("roster reset to defaults");
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    /// Point the selection at `id`. Returns `false` for an unknown id.
    pub fn select(&mut self, id: &AthleteId) -> bool {
        match self.position_of(id) {
            Some(index) => {
                self.selected = index;
                true
            }
            None => false,
        }
    }

    /// The athlete the mutation controller writes to.
    pub fn selected(&self) -> &Athlete {
        &self.entries[self.selected].athlete
    }

    /// Id of the selected athlete.
    pub fn selected_id(&self) -> &AthleteId {
        &self.selected().id
    }

    /// Stats of the selected athlete.
    pub fn selected_stats(&self) -> &MatchData {
        &self.entries[self.selected].stats
    }

    // ------------------------------------------------------------------
    // Attempts of the selected athlete
    // ------------------------------------------------------------------

    /// Write `value` into `slot` of `skill`. `ScoreValue::Empty` clears it.
    ///
    /// An out-of-range slot is ignored and yields `None`.
    pub fn set_attempt(
        &mut self,
        skill: Skill,
        slot: usize,
        value: ScoreValue,
    ) -> Option<AttemptUpdate> {
        let entry = &mut self.entries[self.selected];
        if !entry.stats.get_mut(skill).set(slot, value) {
            tracing::debug!(%skill, slot, "ignoring out-of-range slot");
            return None;
        }
        tracing::debug!(athlete = %entry.athlete.id, %skill, slot, %value, "attempt recorded");
        Some(AttemptUpdate {
            athlete: entry.athlete.id.clone(),
            skill,
            slot,
            value,
        })
    }

    /// Record `value` in the lowest empty slot of `skill`.
    ///
    /// Does nothing when every slot is filled or `value` is empty.
    pub fn quick_add(&mut self, skill: Skill, value: ScoreValue) -> Option<AttemptUpdate> {
        if value.is_empty() {
            return None;
        }
        let slot = self.selected_stats().get(skill).first_empty_slot()?;
        self.set_attempt(skill, slot, value)
    }

    /// Clear the highest filled slot of `skill`. Other slots keep their
    /// positions, so the next quick add lands in the slot just cleared
    /// unless a lower one is empty.
    pub fn undo_last(&mut self, skill: Skill) -> Option<AttemptUpdate> {
        let slot = self.selected_stats().get(skill).last_filled_slot()?;
        self.set_attempt(skill, slot, ScoreValue::Empty)
    }

    /// Replace every skill of an athlete with empty stats.
    pub fn reset_skills(&mut self, id: &AthleteId) -> bool {
        let Some(index) = self.position_of(id) else {
            return false;
        };
        self.entries[index].stats = MatchData::new();
        tracing::info!(%id, "athlete stats reset");
        true
    }

    fn position_of(&self, id: &AthleteId) -> Option<usize> {
        self.entries.iter().position(|e| e.athlete.id == *id)
    }
}
