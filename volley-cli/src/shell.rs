//! Interactive session. Attempts stay in memory until `save`.

use std::io::{BufRead, Write};

use anyhow::Result;
use clap::{Parser, Subcommand};
use volley_core::KeyValueStore;

use crate::commands::{Action, App, Change};
use crate::render;

#[derive(Debug, Parser)]
#[command(no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Debug, Subcommand)]
enum ShellCommand {
    /// Write the roster and stats to disk
    Save,

    /// Leave the shell
    #[command(alias = "exit")]
    Quit,

    #[command(flatten)]
    Action(Action),
}

pub fn run<S: KeyValueStore>(
    app: &mut App<S>,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<()> {
    writeln!(out, "Volleyball Stats Pro. Digite `help` para ver os comandos.")?;
    writeln!(out, "{}", render::score_legend())?;
    writeln!(out, "{}", render::roster(&app.tracker))?;

    let mut unsaved = false;
    loop {
        write!(out, "{}> ", app.tracker.selected().name)?;
        out.flush()?;

        let Some(line) = read_line(input)? else {
            break;
        };
        let words: Vec<&str> = line.split_whitespace().collect();
        if words.is_empty() {
            continue;
        }

        let command = match ShellLine::try_parse_from(&words) {
            Ok(parsed) => parsed.command,
            Err(err) => {
                writeln!(out, "{}", err.render().to_string().trim_end())?;
                continue;
            }
        };

        match command {
            ShellCommand::Save => match app.save() {
                Ok(()) => {
                    unsaved = false;
                    writeln!(out, "Dados salvos com sucesso!")?;
                }
                Err(err) => writeln!(out, "erro: {:#}", err)?,
            },
            ShellCommand::Quit => {
                if unsaved
                    && !ask(input, out, "Há alterações não salvas. Sair mesmo assim?")?
                {
                    continue;
                }
                break;
            }
            ShellCommand::Action(action) => {
                let mut confirm = |question: &str| ask(input, out, question).unwrap_or(false);
                match app.execute(action, &mut confirm) {
                    Ok(reply) => {
                        match reply.change {
                            Change::None => {}
                            Change::Unsaved => unsaved = true,
                            Change::Saved => unsaved = false,
                        }
                        writeln!(out, "{}", reply.text)?;
                    }
                    Err(err) => writeln!(out, "erro: {:#}", err)?,
                }
            }
        }
    }

    if unsaved {
        tracing::info!("shell closed with unsaved attempts");
    }
    Ok(())
}

fn read_line(input: &mut impl BufRead) -> Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}

fn ask(input: &mut impl BufRead, out: &mut impl Write, question: &str) -> Result<bool> {
    write!(out, "{} [s/N] ", question)?;
    out.flush()?;
    let answer = read_line(input)?.unwrap_or_default();
    Ok(matches!(
        answer.trim().to_lowercase().as_str(),
        "s" | "sim" | "y" | "yes"
    ))
}
