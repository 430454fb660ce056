//! Coaching reports generated from an athlete's stats.
//!
//! A [`Coach`] turns a [`MatchData`] into free-form text. Callers go through
//! [`analyze_with_fallback`] or [`spawn_analysis`], which never fail: any
//! error becomes a fixed user-facing message.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::match_data::MatchData;

/// Shown when the coach answered with nothing.
pub const EMPTY_REPORT_MESSAGE: &str = "Não foi possível gerar a análise no momento.";
/// Shown when the coach could not be reached or failed.
pub const FAILURE_MESSAGE: &str = "Erro ao conectar com a inteligência do treinador.";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalysisError {
    #[error("connection failed: {0}")]
    Connection(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("empty response")]
    EmptyResponse,
}

/// Something that can write a coaching report.
pub trait Coach: Send + Sync {
    fn name(&self) -> &'static str;

    fn analyze(&self, data: &MatchData) -> Result<String, AnalysisError>;
}

/// One line per skill: efficiency, successes and errors.
pub fn stats_summary(data: &MatchData) -> String {
    data.iter()
        .map(|(skill, stats)| {
            format!(
                "{}: Eficiência {:.1}%, Acertos {}, Erros {}",
                skill.label(),
                stats.efficiency(),
                stats.success_count(),
                stats.error_count()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// The full prompt sent to a language model.
pub fn build_coaching_prompt(data: &MatchData) -> String {
    let mut s = String::new();
    s.push_str("Como um técnico de vôlei profissional, analise as seguintes estatísticas de um jogador/equipe e forneça um relatório curto e motivacional:\n\n");
    s.push_str(&stats_summary(data));
    s.push_str("\n\n");
    s.push_str("Identifique os pontos fortes, os pontos a melhorar e dê 3 dicas práticas baseadas nesses dados.\n");
    s.push_str("Responda em Português do Brasil com tom profissional e encorajador.\n");
    s
}

/// Result of a coaching request as seen by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisOutcome {
    Report(String),
    Fallback {
        reason: AnalysisError,
        message: &'static str,
    },
}

impl AnalysisOutcome {
    /// The text to show the user.
    pub fn text(&self) -> &str {
        match self {
            AnalysisOutcome::Report(text) => text.as_str(),
            AnalysisOutcome::Fallback { message, .. } => *message,
        }
    }

    /// Whether the coach produced a real report.
    pub fn is_report(&self) -> bool {
        matches!(self, AnalysisOutcome::Report(_))
    }
}

/// Ask `coach` for a report, converting any failure into a fallback.
pub fn analyze_with_fallback(coach: &dyn Coach, data: &MatchData) -> AnalysisOutcome {
    match coach.analyze(data) {
        Ok(text) if !text.trim().is_empty() => AnalysisOutcome::Report(text.trim().to_string()),
        Ok(_) => AnalysisOutcome::Fallback {
            reason: AnalysisError::EmptyResponse,
            message: EMPTY_REPORT_MESSAGE,
        },
        Err(AnalysisError::EmptyResponse) => AnalysisOutcome::Fallback {
            reason: AnalysisError::EmptyResponse,
            message: EMPTY_REPORT_MESSAGE,
        },
        Err(reason) => {
            tracing::error!(coach = coach.name(), error = %reason, "coaching analysis failed");
            AnalysisOutcome::Fallback {
                reason,
                message: FAILURE_MESSAGE,
            }
        }
    }
}

/// A coaching request running on its own thread.
///
/// The thread works on its own copy of the stats, so the roster can keep
/// changing while it runs.
#[derive(Debug)]
pub struct AnalysisTask {
    handle: JoinHandle<AnalysisOutcome>,
}

/// Start a coaching request in the background.
pub fn spawn_analysis(coach: Arc<dyn Coach>, data: MatchData) -> AnalysisTask {
    let handle = thread::spawn(move || analyze_with_fallback(coach.as_ref(), &data));
    AnalysisTask { handle }
}

impl AnalysisTask {
    /// Whether the background thread is done.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Block until the report is ready.
    pub fn wait(self) -> AnalysisOutcome {
        self.handle.join().unwrap_or_else(|_| {
            tracing::error!("coaching analysis thread panicked");
            AnalysisOutcome::Fallback {
                reason: AnalysisError::Connection("analysis thread panicked".into()),
                message: FAILURE_MESSAGE,
            }
        })
    }

    /// The outcome if the request has finished, otherwise the task back.
    pub fn try_finish(self) -> Result<AnalysisOutcome, AnalysisTask> {
        if self.is_finished() {
            Ok(self.wait())
        } else {
            Err(self)
        }
    }
}
