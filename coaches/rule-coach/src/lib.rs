use volley_core::coach::{AnalysisError, Coach};
use volley_core::{Band, MatchData, Skill, SkillStats};

/// RuleCoach writes a short report without any network access.
///
/// Strategy:
/// - Skills at or above 70% efficiency are listed as strengths
/// - Skills below 40%, and the skill with the most errors, need work
/// - Three tips are picked for the weakest recorded skills, padded with
///   general advice when fewer than three skills have attempts
pub struct RuleCoach;

const NO_DATA_REPORT: &str =
    "Ainda não há tentativas registradas. Marque algumas jogadas para receber uma análise.";

const GENERAL_TIPS: [&str; 3] = [
    "Registre mais tentativas em cada fundamento para uma leitura mais confiável.",
    "Mantenha a comunicação constante com os colegas durante o rali.",
    "Revise os vídeos dos treinos e compare com os números registrados.",
];

fn skill_tip(skill: Skill) -> &'static str {
    match skill {
        Skill::Serve => "Saque: treine séries de 10 saques mirando zonas específicas da quadra.",
        Skill::Pass => "Passe: trabalhe a base baixa e o ângulo da plataforma em recepções de saque flutuante.",
        Skill::Attack => "Ataque: varie direção e altura, alternando bolas fortes com largadas.",
        Skill::Block => "Bloqueio: foque no tempo de salto e na leitura do levantador adversário.",
        Skill::Set => "Levantamento: repita levantamentos para as pontas buscando a mesma altura e distância.",
        Skill::Teamwork => "Coletividade: combine chamadas claras de bola e posicionamento de cobertura.",
    }
}

fn recorded(data: &MatchData) -> Vec<(Skill, &SkillStats)> {
    data.iter()
        .filter(|(_, stats)| stats.recorded_count() > 0)
        .collect()
}

fn describe(skills: &[(Skill, &SkillStats)]) -> String {
    skills
        .iter()
        .map(|(skill, stats)| format!("{} ({:.1}%)", skill.label(), stats.efficiency()))
        .collect::<Vec<_>>()
        .join(", ")
}

impl RuleCoach {
    fn strengths<'a>(&self, data: &'a MatchData) -> Vec<(Skill, &'a SkillStats)> {
        data.chart_data()
            .into_iter()
            .filter(|bar| bar.band() == Band::Strong)
            .map(|bar| (bar.skill, data.get(bar.skill)))
            .collect()
    }

    fn weaknesses<'a>(&self, data: &'a MatchData) -> Vec<(Skill, &'a SkillStats)> {
        let mut weak: Vec<_> = recorded(data)
            .into_iter()
            .filter(|(_, stats)| stats.efficiency() < 40.0)
            .collect();

        let most_errors = recorded(data)
            .into_iter()
            .filter(|(_, stats)| stats.error_count() > 0)
            .max_by_key(|(_, stats)| stats.error_count());
        if let Some((skill, stats)) = most_errors {
            if !weak.iter().any(|(s, _)| *s == skill) {
                weak.push((skill, stats));
            }
        }
        weak
    }

    /// Tips for the weakest recorded skills first, then general ones.
    fn tips(&self, data: &MatchData) -> Vec<&'static str> {
        let mut ranked = recorded(data);
        ranked.sort_by(|a, b| {
            a.1.efficiency()
                .partial_cmp(&b.1.efficiency())
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(b.1.error_count().cmp(&a.1.error_count()))
        });

        ranked
            .into_iter()
            .map(|(skill, _)| skill_tip(skill))
            .chain(GENERAL_TIPS)
            .take(3)
            .collect()
    }
}

impl Coach for RuleCoach {
    fn name(&self) -> &'static str {
        "rule-coach"
    }

    fn analyze(&self, data: &MatchData) -> Result<String, AnalysisError> {
        if data.is_blank() {
            return Ok(NO_DATA_REPORT.to_string());
        }

        let totals = data.totals();
        let strengths = self.strengths(data);
        let weaknesses = self.weaknesses(data);

        let mut s = String::new();
        s.push_str(&format!(
            "Resumo: {} tentativas, {} acertos, {} erros, eficiência geral de {:.1}%.\n\n",
            totals.recorded, totals.success_count, totals.error_count, totals.efficiency
        ));

        s.push_str("Pontos fortes: ");
        if strengths.is_empty() {
            s.push_str("nenhum fundamento acima de 70% ainda, mas a evolução vem com repetição.");
        } else {
            s.push_str(&describe(&strengths));
            s.push('.');
        }
        s.push('\n');

        s.push_str("Pontos a melhorar: ");
        if weaknesses.is_empty() {
            s.push_str("nenhum fundamento crítico. Continue assim!");
        } else {
            s.push_str(&describe(&weaknesses));
            s.push('.');
        }
        s.push_str("\n\nDicas práticas:\n");

        for (i, tip) in self.tips(data).iter().enumerate() {
            s.push_str(&format!("{}. {}\n", i + 1, tip));
        }
        Ok(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use volley_core::{ScoreValue, Tracker};

    fn data_with(entries: &[(Skill, &[ScoreValue])]) -> MatchData {
        let mut tracker = Tracker::new();
        for (skill, values) in entries {
            for value in *values {
                tracker.quick_add(*skill, *value);
            }
        }
        tracker.selected_stats().clone()
    }

    #[test]
    fn blank_stats_get_no_data_report() {
        let report = RuleCoach.analyze(&MatchData::new()).unwrap();
        assert_eq!(report, NO_DATA_REPORT);
    }

    #[test]
    fn lists_strengths_and_weaknesses() {
        use volley_core::ScoreValue::*;
        let data = data_with(&[
            (Skill::Serve, &[Excellent, Excellent, Good]),
            (Skill::Block, &[Error, Error, Poor]),
        ]);
        let report = RuleCoach.analyze(&data).unwrap();

        assert!(report.contains("Pontos fortes: Saque (88.9%)"));
        assert!(report.contains("Pontos a melhorar: Bloqueio (11.1%)"));
        assert!(report.contains("1. Bloqueio:"));
        assert!(report.contains("2. Saque:"));
        assert!(report.contains("3. Registre mais tentativas"));
    }

    #[test]
    fn most_errors_flagged_even_when_efficient_enough() {
        use volley_core::ScoreValue::*;
        let data = data_with(&[(Skill::Attack, &[Excellent, Excellent, Error, Good])]);
        let weak = RuleCoach.weaknesses(&data);
        assert_eq!(weak.len(), 1);
        assert_eq!(weak[0].0, Skill::Attack);
    }

    #[test]
    fn always_three_tips() {
        use volley_core::ScoreValue::*;
        let poor: &[ScoreValue] = &[Poor];
        let all: Vec<(Skill, &[ScoreValue])> = Skill::ALL.iter().map(|s| (*s, poor)).collect();
        let data = data_with(&all);
        assert_eq!(RuleCoach.tips(&data).len(), 3);

        let one = data_with(&[(Skill::Pass, &[Good])]);
        assert_eq!(RuleCoach.tips(&one).len(), 3);
    }
}
