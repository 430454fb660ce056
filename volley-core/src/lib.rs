//! Attempt tracking and statistics for volleyball athletes.
//!
//! Every athlete in a [`Tracker`] owns a [`MatchData`]: ten attempt slots
//! for each of six skills, scored from error to excellent. The tracker
//! applies single-slot writes to the selected athlete and keeps each
//! skill's success count, error count and efficiency in step with its
//! attempts. [`Persistence`] saves and restores the whole roster through a
//! [`KeyValueStore`], and a [`Coach`] turns stats into a written report.

pub mod athlete;
pub mod coach;
pub mod config;
pub mod match_data;
pub mod ollama;
pub mod score;
pub mod skill;
pub mod storage;
pub mod tracker;

pub use athlete::{Athlete, AthleteId, Position};
pub use coach::{
    analyze_with_fallback, build_coaching_prompt, spawn_analysis, stats_summary, AnalysisError,
    AnalysisOutcome, AnalysisTask, Coach,
};
pub use config::{CoachBackend, Config, ConfigError};
pub use match_data::{Band, ChartBar, MatchData, Totals};
pub use score::{ScoreOption, ScoreValue, SCORE_OPTIONS};
pub use skill::{summarize, Skill, SkillStats, SkillSummary, MAX_ATTEMPTS};
pub use storage::{
    FileStore, KeyValueStore, MemoryStore, Persistence, Snapshot, StorageError, Theme,
};
pub use tracker::{AttemptUpdate, Tracker, TrackerError};
