//! Operations shared by one-shot invocations and the interactive shell.

use std::sync::Arc;

use anyhow::{bail, Context as _, Result};
use clap::{Subcommand, ValueEnum};
use llm_coach::LlmCoach;
use rule_coach::RuleCoach;
use volley_core::{
    spawn_analysis, AthleteId, AttemptUpdate, Coach, CoachBackend, Config, KeyValueStore,
    Persistence, Position, ScoreValue, Skill, Theme, Tracker,
};

use crate::render;

#[derive(Debug, Clone, Subcommand)]
pub enum Action {
    /// List athletes
    #[command(alias = "ls")]
    List,

    /// Show the attempt grid of the selected athlete
    Show,

    /// Switch to another athlete and show their grid
    Select { id: String },

    /// Register a new athlete and select them
    Add {
        /// Athlete name
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,

        /// Court position (setter, outside, middle, opposite, libero)
        #[arg(long, short, default_value = "ponteiro")]
        position: Position,
    },

    /// Change an athlete's name or position
    Edit {
        id: String,

        /// New name
        #[arg(long, num_args = 1..)]
        name: Option<Vec<String>>,

        /// New position
        #[arg(long, short)]
        position: Option<Position>,
    },

    /// Delete an athlete and all of their stats
    #[command(alias = "rm")]
    Remove {
        id: String,

        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },

    /// Record a value in the next empty slot of a skill
    Score {
        skill: Skill,
        #[arg(value_parser = parse_scored)]
        value: ScoreValue,
    },

    /// Record a value in a specific slot (1-10)
    Set {
        skill: Skill,
        slot: usize,
        value: ScoreValue,
    },

    /// Empty a specific slot (1-10)
    Clear { skill: Skill, slot: usize },

    /// Empty the last recorded slot of a skill
    Undo { skill: Skill },

    /// Clear every skill of the selected athlete
    ResetStats {
        #[arg(long, short)]
        yes: bool,
    },

    /// Delete all athletes and saved data
    FullReset {
        #[arg(long, short)]
        yes: bool,
    },

    /// Efficiency chart of the selected athlete
    Chart,

    /// Ask the coach for a report on the selected athlete
    Analyze {
        /// Override the configured coach backend
        #[arg(long, value_enum)]
        backend: Option<BackendArg>,
    },

    /// Show, set or toggle the colour theme
    Theme { choice: Option<ThemeChoice> },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum BackendArg {
    Ollama,
    Rules,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ThemeChoice {
    Light,
    Dark,
    Toggle,
}

/// How an action left the saved data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Change {
    #[default]
    None,
    /// In-memory state differs from what is saved.
    Unsaved,
    /// The whole state was written out.
    Saved,
}

/// What an action produced.
#[derive(Debug, Default)]
pub struct Reply {
    pub text: String,
    pub change: Change,
}

impl Reply {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            change: Change::None,
        }
    }

    fn unsaved(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            change: Change::Unsaved,
        }
    }

    fn saved(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            change: Change::Saved,
        }
    }
}

/// Asks the user to confirm a destructive action.
pub type Confirm<'a> = &'a mut dyn FnMut(&str) -> bool;

/// The tracker and where it is saved.
pub struct App<S> {
    pub tracker: Tracker,
    pub persistence: Persistence<S>,
    pub config: Config,
}

impl<S: KeyValueStore> App<S> {
    pub fn load(persistence: Persistence<S>, config: Config) -> Self {
        let tracker = persistence.load_tracker();
        Self {
            tracker,
            persistence,
            config,
        }
    }

    pub fn save(&mut self) -> Result<()> {
        self.persistence
            .save_tracker(&self.tracker)
            .context("failed to save data")
    }

    pub fn theme(&self) -> Theme {
        self.persistence
            .load_theme()
            .unwrap_or(self.config.ui.default_theme)
    }

    pub fn select(&mut self, id: &str) -> Result<()> {
        if !self.tracker.select(&AthleteId::new(id)) {
            bail!("no athlete with id `{}`", id);
        }
        Ok(())
    }

    pub fn execute(&mut self, action: Action, confirm: Confirm<'_>) -> Result<Reply> {
        match action {
            Action::List => Ok(Reply::text(render::roster(&self.tracker))),
            Action::Show => Ok(Reply::text(self.grid(None))),
            Action::Select { id } => {
                self.select(&id)?;
                Ok(Reply::text(self.grid(None)))
            }
            Action::Chart => Ok(Reply::text(render::chart(self.tracker.selected_stats()))),

            Action::Add { name, position } => {
                let name = name.join(" ");
                let Some(id) = self.tracker.add(&name, position) else {
                    return Ok(Reply::text("Nome vazio, nada foi cadastrado."));
                };
                self.tracker.select(&id);
                self.save()?;
                Ok(Reply::saved(format!("Cadastrado: {} [{}]", self.tracker.selected(), id)))
            }

            Action::Edit { id, name, position } => {
                let id = AthleteId::new(id);
                let Some(current) = self.tracker.athlete(&id).cloned() else {
                    bail!("no athlete with id `{}`", id);
                };
                let name = name.map(|n| n.join(" ")).unwrap_or(current.name);
                let position = position.unwrap_or(current.position);
                if !self.tracker.edit(&id, &name, position) {
                    return Ok(Reply::text("Nome vazio, nada foi alterado."));
                }
                self.save()?;
                let athlete = self.tracker.athlete(&id).map(|a| a.to_string()).unwrap_or_default();
                Ok(Reply::saved(format!("Atualizado: {}", athlete)))
            }

            Action::Remove { id, yes } => {
                let id = AthleteId::new(id);
                let Some(athlete) = self.tracker.athlete(&id).cloned() else {
                    bail!("no athlete with id `{}`", id);
                };
                if self.tracker.len() > 1
                    && !yes
                    && !confirm(&format!(
                        "Deseja realmente remover {}? Todos os seus dados serão apagados.",
                        athlete.name
                    ))
                {
                    return Ok(Reply::text("Cancelado."));
                }
                let removed = self.tracker.remove(&id)?;
                self.save()?;
                Ok(Reply::saved(format!(
                    "Removido: {}. Selecionado: {}",
                    removed,
                    self.tracker.selected()
                )))
            }

            Action::Score { skill, value } => {
                if value.is_empty() {
                    return Ok(Reply::text(CLEAR_HINT));
                }
                let update = self.tracker.quick_add(skill, value);
                Ok(self.attempt_reply(skill, update, "Todas as tentativas já foram registradas."))
            }

            Action::Set { skill, slot, value } => {
                let update = self.tracker.set_attempt(skill, slot_index(slot), value);
                Ok(self.attempt_reply(skill, update, "Tentativa fora do intervalo 1-10."))
            }

            Action::Clear { skill, slot } => {
                let update = self
                    .tracker
                    .set_attempt(skill, slot_index(slot), ScoreValue::Empty);
                Ok(self.attempt_reply(skill, update, "Tentativa fora do intervalo 1-10."))
            }

            Action::Undo { skill } => {
                let update = self.tracker.undo_last(skill);
                Ok(self.attempt_reply(skill, update, "Nenhuma tentativa para desfazer."))
            }

            Action::ResetStats { yes } => {
                let athlete = self.tracker.selected().clone();
                if !yes
                    && !confirm(&format!(
                        "Isso limpará APENAS as estatísticas atuais de {}. Continuar?",
                        athlete.name
                    ))
                {
                    return Ok(Reply::text("Cancelado."));
                }
                self.tracker.reset_skills(&athlete.id);
                Ok(Reply::unsaved(self.grid(None)))
            }

            Action::FullReset { yes } => {
                if !yes
                    && !confirm(
                        "Isso apagará TODOS os atletas e estatísticas salvos permanentemente. Deseja continuar?",
                    )
                {
                    return Ok(Reply::text("Cancelado."));
                }
                self.persistence
                    .full_reset(&mut self.tracker)
                    .context("failed to purge saved data")?;
                Ok(Reply::saved(render::roster(&self.tracker)))
            }

            Action::Analyze { backend } => {
                let backend = match backend {
                    Some(BackendArg::Ollama) => CoachBackend::Ollama,
                    Some(BackendArg::Rules) => CoachBackend::Rules,
                    None => self.config.coach.backend,
                };
                let coach = self.coach(backend);
                eprintln!("Analisando dados ({})...", coach.name());
                let task = spawn_analysis(coach, self.tracker.selected_stats().clone());
                let outcome = task.wait();
                Ok(Reply::text(format!(
                    "Relatório do Treinador: {}\n\n{}",
                    self.tracker.selected(),
                    outcome.text()
                )))
            }

            Action::Theme { choice } => {
                let current = self.theme();
                let theme = match choice {
                    None => return Ok(Reply::text(render::theme(current))),
                    Some(ThemeChoice::Light) => Theme::Light,
                    Some(ThemeChoice::Dark) => Theme::Dark,
                    Some(ThemeChoice::Toggle) => current.toggle(),
                };
                self.persistence
                    .save_theme(theme)
                    .context("failed to save theme")?;
                Ok(Reply::text(render::theme(theme)))
            }
        }
    }

    fn coach(&self, backend: CoachBackend) -> Arc<dyn Coach> {
        match backend {
            CoachBackend::Ollama => Arc::new(
                LlmCoach::new(&self.config.coach.host, &self.config.coach.model)
                    .with_timeout(self.config.coach.timeout()),
            ),
            CoachBackend::Rules => Arc::new(RuleCoach),
        }
    }

    fn grid(&self, highlight: Option<&AttemptUpdate>) -> String {
        render::match_grid(
            self.tracker.selected(),
            self.tracker.selected_stats(),
            highlight,
        )
    }

    fn attempt_reply(&self, skill: Skill, update: Option<AttemptUpdate>, noop: &str) -> Reply {
        match update {
            Some(update) => Reply::unsaved(self.grid(Some(&update))),
            None => {
                let stats = self.tracker.selected_stats().get(skill);
                Reply::text(format!("{}\n{}", noop, render::skill_row(skill, stats, None)))
            }
        }
    }
}

const CLEAR_HINT: &str = "Use `clear` ou `undo` para apagar uma tentativa.";

/// A value that can be recorded; clearing goes through `clear` or `undo`.
fn parse_scored(s: &str) -> Result<ScoreValue, String> {
    let value = s.parse::<ScoreValue>().map_err(|e| e.to_string())?;
    if value.is_empty() {
        return Err(CLEAR_HINT.to_string());
    }
    Ok(value)
}

/// Slots are numbered from 1 on the command line. Slot 0 maps past the end
/// so it is rejected like any other out-of-range slot.
fn slot_index(slot: usize) -> usize {
    slot.checked_sub(1).unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use volley_core::MemoryStore;

    fn app() -> App<MemoryStore> {
        App::load(Persistence::new(MemoryStore::new()), Config::default())
    }

    fn run(app: &mut App<MemoryStore>, action: Action) -> Reply {
        app.execute(action, &mut |_| true).unwrap()
    }

    #[test]
    fn add_selects_and_saves_immediately() {
        let mut app = app();
        run(
            &mut app,
            Action::Add {
                name: vec!["Ana".into(), "Paula".into()],
                position: Position::Libero,
            },
        );
        assert_eq!(app.tracker.selected().name, "Ana Paula");
        let saved = app.persistence.load().unwrap();
        assert_eq!(saved.athletes.len(), 2);
    }

    #[test]
    fn scores_are_dirty_until_saved() {
        let mut app = app();
        let reply = run(
            &mut app,
            Action::Score {
                skill: Skill::Serve,
                value: ScoreValue::Excellent,
            },
        );
        assert_eq!(reply.change, Change::Unsaved);
        assert!(reply.text.contains("<3>"));
        assert!(app.persistence.load().is_none());

        app.save().unwrap();
        let saved = Tracker::from_snapshot(app.persistence.load().unwrap());
        assert_eq!(saved.selected_stats().get(Skill::Serve).success_count(), 1);
    }

    #[test]
    fn score_rejects_empty_value() {
        assert!(parse_scored("x").is_err());
        assert_eq!(parse_scored("bom"), Ok(ScoreValue::Good));

        let mut app = app();
        let reply = run(
            &mut app,
            Action::Score {
                skill: Skill::Serve,
                value: ScoreValue::Empty,
            },
        );
        assert_eq!(reply.text, CLEAR_HINT);
        assert_eq!(reply.change, Change::None);
    }

    #[test]
    fn slots_are_one_based() {
        let mut app = app();
        run(
            &mut app,
            Action::Set {
                skill: Skill::Pass,
                slot: 10,
                value: ScoreValue::Good,
            },
        );
        assert_eq!(
            app.tracker.selected_stats().get(Skill::Pass).last_filled_slot(),
            Some(9)
        );

        let reply = run(
            &mut app,
            Action::Clear {
                skill: Skill::Pass,
                slot: 0,
            },
        );
        assert_eq!(reply.change, Change::None);
        assert_eq!(app.tracker.selected_stats().get(Skill::Pass).recorded_count(), 1);
    }

    #[test]
    fn removing_only_athlete_is_an_error() {
        let mut app = app();
        let result = app.execute(
            Action::Remove {
                id: "1".into(),
                yes: true,
            },
            &mut |_| true,
        );
        assert!(result.is_err());
        assert_eq!(app.tracker.len(), 1);
    }

    #[test]
    fn declined_confirmation_keeps_athlete() {
        let mut app = app();
        let id = app.tracker.add("Ana", Position::Libero).unwrap();
        let reply = app
            .execute(
                Action::Remove {
                    id: id.to_string(),
                    yes: false,
                },
                &mut |_| false,
            )
            .unwrap();
        assert_eq!(reply.text, "Cancelado.");
        assert_eq!(app.tracker.len(), 2);
    }

    #[test]
    fn theme_toggle_is_persisted() {
        let mut app = app();
        assert_eq!(app.theme(), Theme::Light);
        run(
            &mut app,
            Action::Theme {
                choice: Some(ThemeChoice::Toggle),
            },
        );
        assert_eq!(app.persistence.load_theme(), Some(Theme::Dark));
    }

    #[test]
    fn offline_analysis_returns_report() {
        let mut app = app();
        run(
            &mut app,
            Action::Score {
                skill: Skill::Attack,
                value: ScoreValue::Excellent,
            },
        );
        let reply = run(
            &mut app,
            Action::Analyze {
                backend: Some(BackendArg::Rules),
            },
        );
        assert!(reply.text.contains("Pontos fortes: Ataque"));
    }

    #[test]
    fn full_reset_purges_saved_roster() {
        let mut app = app();
        app.tracker.add("Ana", Position::Libero);
        app.save().unwrap();

        run(&mut app, Action::FullReset { yes: true });
        assert!(app.persistence.load().is_none());
        assert_eq!(app.tracker, Tracker::new());
    }
}
