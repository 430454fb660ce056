//! `volley`: record volleyball attempts per athlete and skill.
//!
//! Without a subcommand the interactive shell starts. Every other
//! subcommand loads the saved data, applies one action and saves again.

mod commands;
mod render;
mod shell;

use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use volley_core::{Config, FileStore, KeyValueStore, Persistence};

use crate::commands::{Action, App, Change};

#[derive(Parser)]
#[command(name = "volley", version)]
#[command(about = "Volleyball athlete performance tracker", long_about = None)]
struct Cli {
    /// Config file path (defaults to ./volley.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding saved data
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Athlete id to act on instead of the first one
    #[arg(short, long)]
    athlete: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive session (default)
    Shell,

    #[command(flatten)]
    Action(Action),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        config.storage.data_dir = dir;
    }
    init_logging(&config);

    let store = FileStore::new(config.storage.data_dir.clone());
    let persistence = Persistence::with_keys(
        store,
        config.storage.snapshot_key.clone(),
        config.storage.theme_key.clone(),
    );
    let mut app = App::load(persistence, config);
    if let Some(id) = &cli.athlete {
        app.select(id)?;
    }

    match cli.command.unwrap_or(Command::Shell) {
        Command::Shell => {
            let mut input = io::stdin().lock();
            let mut out = io::stdout().lock();
            shell::run(&mut app, &mut input, &mut out)?;
        }
        Command::Action(action) => {
            let text = one_shot(&mut app, action)?;
            println!("{}", text);
        }
    }
    Ok(())
}

fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log.filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Run one action and save whatever it left unsaved. Confirmations are
/// refused; destructive actions need `--yes`.
fn one_shot<S: KeyValueStore>(app: &mut App<S>, action: Action) -> Result<String> {
    let mut refuse = |question: &str| {
        eprintln!("{} (use --yes para confirmar)", question);
        false
    };
    let reply = app.execute(action, &mut refuse)?;
    if reply.change == Change::Unsaved {
        app.save()?;
    }
    Ok(reply.text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use volley_core::{ScoreValue, Skill};

    fn open(dir: &TempDir) -> App<FileStore> {
        App::load(Persistence::new(FileStore::new(dir.path())), Config::default())
    }

    #[test]
    fn one_shot_actions_persist_between_runs() {
        let dir = TempDir::new().unwrap();

        let mut app = open(&dir);
        one_shot(
            &mut app,
            Action::Score {
                skill: Skill::Block,
                value: ScoreValue::Good,
            },
        )
        .unwrap();

        let app = open(&dir);
        let block = app.tracker.selected_stats().get(Skill::Block);
        assert_eq!(block.success_count(), 1);
    }

    #[test]
    fn destructive_one_shot_needs_yes() {
        let dir = TempDir::new().unwrap();

        let mut app = open(&dir);
        one_shot(
            &mut app,
            Action::Score {
                skill: Skill::Serve,
                value: ScoreValue::Excellent,
            },
        )
        .unwrap();
        let text = one_shot(&mut app, Action::ResetStats { yes: false }).unwrap();
        assert_eq!(text, "Cancelado.");

        one_shot(&mut app, Action::ResetStats { yes: true }).unwrap();
        let app = open(&dir);
        assert!(app.tracker.selected_stats().is_blank());
    }

    #[test]
    fn score_with_empty_value_is_refused_by_parser() {
        assert!(Cli::try_parse_from(["volley", "score", "serve", "x"]).is_err());
        assert!(Cli::try_parse_from(["volley", "score", "serve", "3"]).is_ok());
    }

    #[test]
    fn cli_parses_flattened_actions() {
        let cli = Cli::try_parse_from(["volley", "--athlete", "1", "set", "pass", "4", "x"]).unwrap();
        assert_eq!(cli.athlete.as_deref(), Some("1"));
        assert!(matches!(
            cli.command,
            Some(Command::Action(Action::Set {
                skill: Skill::Pass,
                slot: 4,
                value: ScoreValue::Empty,
            }))
        ));
    }
}
