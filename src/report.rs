use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::MatchError;
use crate::pipeline::runtime::TranslationMatcher;
use crate::types::{CandidateScore, MatchInput, TokenizationMode};

pub const REPORT_SCHEMA_VERSION: u32 = 1;
const OUTLIER_TOP_N: usize = 20;

/// One graded attempt: what the learner said and what they were shown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradingCase {
    pub id: String,
    pub language: String,
    pub utterance: String,
    pub candidates: Vec<String>,
    pub correct: String,
}

impl GradingCase {
    pub fn to_input(&self) -> MatchInput {
        MatchInput {
            utterance: self.utterance.clone(),
            candidates: self.candidates.clone(),
            correct_candidate: self.correct.clone(),
            language_code: self.language.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub schema_version: u32,
    pub meta: Meta,
    pub cases: Vec<CaseReport>,
    pub aggregates: AggregateReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct Meta {
    pub generated_at: String,
    pub shared_char_threshold: f32,
    pub shared_char_multiplier: f32,
    pub match_threshold: f32,
    pub case_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Correct,
    Incorrect,
    NoMatch,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Correct => "correct",
            Self::Incorrect => "incorrect",
            Self::NoMatch => "no_match",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CaseReport {
    pub id: String,
    pub language: String,
    pub mode: TokenizationMode,
    pub utterance: String,
    pub expected: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<String>,
    pub outcome: Outcome,
    /// Winner score minus runner-up score.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin: Option<f32>,
    pub user_token_count: u32,
    pub candidates: Vec<CandidateTrace>,
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CandidateTrace {
    pub candidate: String,
    pub is_correct: bool,
    pub candidate_token_count: u32,
    pub matched_count: u32,
    pub word_match_ratio: f32,
    pub average_word_score: f32,
    pub length_penalty: f32,
    pub score: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct AggregateReport {
    pub counts: AggregateCounts,
    pub accuracy: f32,
    pub no_match_rate: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin: Option<MetricDistribution>,
    pub by_language: BTreeMap<String, LanguageAggregate>,
    pub outliers: OutlierReport,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AggregateCounts {
    pub total: u32,
    pub correct: u32,
    pub incorrect: u32,
    pub no_match: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct LanguageAggregate {
    pub counts: AggregateCounts,
    pub accuracy: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricDistribution {
    pub mean: f32,
    pub p10: f32,
    pub p50: f32,
    pub p90: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutlierReport {
    /// Correct answers that barely beat a decoy.
    pub narrowest_correct: Vec<OutlierEntry>,
    /// Wrong winners, most confident first.
    pub widest_incorrect: Vec<OutlierEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutlierEntry {
    pub id: String,
    pub language: String,
    pub value: f32,
}

pub fn compute_case_report(
    case: &GradingCase,
    matcher: &TranslationMatcher,
) -> Result<CaseReport, MatchError> {
    let evaluation = matcher.score_candidates(&case.to_input())?;
    let mut notes = Vec::new();

    if evaluation.user_token_count == 0 {
        notes.push("empty_utterance".to_string());
    }
    if !case.candidates.iter().any(|c| c == &case.correct) {
        notes.push("correct_not_in_candidates".to_string());
    }
    let negative = evaluation.scores.iter().filter(|s| s.score < 0.0).count();
    if negative > 0 {
        notes.push(format!("negative_scores={negative}"));
    }

    let winner = evaluation.winning_candidate().map(str::to_string);
    let outcome = match winner.as_deref() {
        None => Outcome::NoMatch,
        Some(w) if w == case.correct => Outcome::Correct,
        Some(_) => Outcome::Incorrect,
    };
    let margin = evaluation
        .margin()
        .map(|m| checked_f32(m, "case.margin"))
        .transpose()?;

    let candidates = evaluation
        .scores
        .iter()
        .map(|score| candidate_trace(score, &case.correct))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CaseReport {
        id: case.id.clone(),
        language: case.language.clone(),
        mode: evaluation.mode,
        utterance: case.utterance.clone(),
        expected: case.correct.clone(),
        winner,
        outcome,
        margin,
        user_token_count: to_u32(evaluation.user_token_count),
        candidates,
        notes,
    })
}

pub fn aggregate_reports(cases: &[CaseReport]) -> AggregateReport {
    let counts = count_outcomes(cases.iter());

    let mut languages: BTreeMap<String, Vec<&CaseReport>> = BTreeMap::new();
    for case in cases {
        languages.entry(case.language.clone()).or_default().push(case);
    }
    let by_language = languages
        .into_iter()
        .map(|(language, reports)| {
            let counts = count_outcomes(reports.into_iter());
            (
                language,
                LanguageAggregate {
                    accuracy: ratio(counts.correct, counts.total),
                    counts,
                },
            )
        })
        .collect();

    let margins: Vec<f64> = cases
        .iter()
        .filter_map(|case| case.margin.map(f64::from))
        .collect();

    AggregateReport {
        accuracy: ratio(counts.correct, counts.total),
        no_match_rate: ratio(counts.no_match, counts.total),
        counts,
        margin: distribution_or_none(&margins),
        by_language,
        outliers: build_outliers(cases, OUTLIER_TOP_N),
    }
}

fn candidate_trace(score: &CandidateScore, correct: &str) -> Result<CandidateTrace, MatchError> {
    Ok(CandidateTrace {
        candidate: score.candidate.clone(),
        is_correct: score.candidate == correct,
        candidate_token_count: to_u32(score.candidate_token_count),
        matched_count: to_u32(score.matched_count),
        word_match_ratio: checked_f32(score.word_match_ratio, "candidate.word_match_ratio")?,
        average_word_score: checked_f32(score.average_word_score, "candidate.average_word_score")?,
        length_penalty: checked_f32(score.length_penalty, "candidate.length_penalty")?,
        score: checked_f32(score.score, "candidate.score")?,
    })
}

fn count_outcomes<'a>(cases: impl Iterator<Item = &'a CaseReport>) -> AggregateCounts {
    let mut counts = AggregateCounts::default();
    for case in cases {
        counts.total += 1;
        match case.outcome {
            Outcome::Correct => counts.correct += 1,
            Outcome::Incorrect => counts.incorrect += 1,
            Outcome::NoMatch => counts.no_match += 1,
        }
    }
    counts
}

fn build_outliers(cases: &[CaseReport], top_n: usize) -> OutlierReport {
    let mut narrowest_correct = outlier_entries(cases, Outcome::Correct);
    narrowest_correct.sort_by(|a, b| {
        a.value
            .partial_cmp(&b.value)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });
    narrowest_correct.truncate(top_n);

    let mut widest_incorrect = outlier_entries(cases, Outcome::Incorrect);
    widest_incorrect.sort_by(|a, b| {
        b.value
            .partial_cmp(&a.value)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });
    widest_incorrect.truncate(top_n);

    OutlierReport {
        narrowest_correct,
        widest_incorrect,
    }
}

fn outlier_entries(cases: &[CaseReport], outcome: Outcome) -> Vec<OutlierEntry> {
    cases
        .iter()
        .filter(|case| case.outcome == outcome)
        .filter_map(|case| {
            case.margin.map(|value| OutlierEntry {
                id: case.id.clone(),
                language: case.language.clone(),
                value,
            })
        })
        .collect()
}

fn distribution_or_none(values: &[f64]) -> Option<MetricDistribution> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let mean_value = sorted.iter().sum::<f64>() / sorted.len() as f64;

    Some(MetricDistribution {
        mean: checked_f32(mean_value, "aggregate.mean").ok()?,
        p10: checked_f32(percentile_sorted(&sorted, 0.1), "aggregate.p10").ok()?,
        p50: checked_f32(percentile_sorted(&sorted, 0.5), "aggregate.p50").ok()?,
        p90: checked_f32(percentile_sorted(&sorted, 0.9), "aggregate.p90").ok()?,
    })
}

fn percentile_sorted(sorted_values: &[f64], percentile: f64) -> f64 {
    if sorted_values.is_empty() {
        return 0.0;
    }
    if sorted_values.len() == 1 {
        return sorted_values[0];
    }

    let clamped = percentile.clamp(0.0, 1.0);
    let max_index = (sorted_values.len() - 1) as f64;
    let rank = clamped * max_index;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        sorted_values[lower]
    } else {
        let weight = rank - lower as f64;
        sorted_values[lower] * (1.0 - weight) + sorted_values[upper] * weight
    }
}

fn ratio(part: u32, total: u32) -> f32 {
    if total == 0 {
        0.0
    } else {
        part as f32 / total as f32
    }
}

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

fn checked_f32(value: f64, metric_name: &str) -> Result<f32, MatchError> {
    if !value.is_finite() {
        return Err(MatchError::invalid_input(format!(
            "metric '{metric_name}' produced non-finite value: {value}"
        )));
    }
    if value < f32::MIN as f64 || value > f32::MAX as f64 {
        return Err(MatchError::invalid_input(format!(
            "metric '{metric_name}' out of f32 range: {value}"
        )));
    }
    Ok(value as f32)
}
