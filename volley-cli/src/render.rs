//! Plain-text views of the roster and stats.

use std::fmt::Write;

use volley_core::{
    Athlete, AttemptUpdate, Band, MatchData, Skill, SkillStats, Theme, Tracker, MAX_ATTEMPTS,
    SCORE_OPTIONS,
};

const BAR_WIDTH: f64 = 30.0;

/// Every athlete, the selected one marked with `>`.
pub fn roster(tracker: &Tracker) -> String {
    let mut out = String::new();
    for athlete in tracker.athletes() {
        let marker = if athlete.id == *tracker.selected_id() {
            '>'
        } else {
            ' '
        };
        let totals = tracker
            .stats(&athlete.id)
            .map(MatchData::totals)
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "{} {:<15} {:<22} {:<12} {:>3} tentativas {:>6.1}%",
            marker,
            athlete.id,
            athlete.name,
            athlete.position.label(),
            totals.recorded,
            totals.efficiency
        );
    }
    out
}

/// One row per skill. The slot named by `highlight` is drawn as `<v>`.
pub fn match_grid(athlete: &Athlete, data: &MatchData, highlight: Option<&AttemptUpdate>) -> String {
    let mut out = format!("{} [{}]\n", athlete, athlete.id);
    for (skill, stats) in data.iter() {
        let slot = highlight
            .filter(|update| update.skill == skill && update.athlete == athlete.id)
            .map(|update| update.slot);
        out.push_str(&skill_row(skill, stats, slot));
        out.push('\n');
    }
    out
}

pub fn skill_row(skill: Skill, stats: &SkillStats, highlight: Option<usize>) -> String {
    let slots: String = stats
        .attempts()
        .iter()
        .enumerate()
        .map(|(i, value)| {
            let mark = if value.is_empty() {
                " ".to_string()
            } else {
                value.to_string()
            };
            if highlight == Some(i) {
                format!("<{}>", mark)
            } else {
                format!("[{}]", mark)
            }
        })
        .collect();

    format!(
        "{:<13}{}  {:>5.1}%  acertos {:>2}  erros {:>2}  {:>2}/{}",
        skill.label(),
        slots,
        stats.efficiency_rounded(),
        stats.success_count(),
        stats.error_count(),
        stats.recorded_count(),
        MAX_ATTEMPTS
    )
}

/// Horizontal efficiency bars, one per skill.
pub fn chart(data: &MatchData) -> String {
    let mut out = String::from("Eficiência por Fundamento\n");
    for bar in data.chart_data() {
        let width = (bar.efficiency / 100.0 * BAR_WIDTH).round() as usize;
        let band = match bar.band() {
            Band::Strong => "forte",
            Band::Average => "médio",
            Band::Weak => "fraco",
        };
        let _ = writeln!(
            out,
            "{:<13}{:<30} {:>5.1}% {}",
            bar.skill.label(),
            "#".repeat(width),
            bar.efficiency,
            band
        );
    }
    out
}

/// The accepted score values and their labels.
pub fn score_legend() -> String {
    SCORE_OPTIONS
        .iter()
        .map(|opt| format!("{}={}", opt.value, opt.label))
        .collect::<Vec<_>>()
        .join("  ")
}

pub fn theme(theme: Theme) -> String {
    match theme {
        Theme::Light => "Tema: claro".to_string(),
        Theme::Dark => "Tema: escuro".to_string(),
    }
}
