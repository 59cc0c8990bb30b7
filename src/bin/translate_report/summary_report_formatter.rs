use std::fmt::Write;

use lingo_match::report::{AggregateCounts, CaseReport};
use lingo_match::Report;

const UTTERANCE_WIDTH: usize = 32;

/// Plain-text summary: one row per case, then per-language totals.
pub fn render_summary(report: &Report) -> String {
    let mut out = String::new();
    let id_width = report
        .cases
        .iter()
        .map(|case| case.id.chars().count())
        .max()
        .unwrap_or(2)
        .max(2);

    let _ = writeln!(
        out,
        "{:<id_width$}  {:<4}  {:<9}  {:>7}  {:<UTTERANCE_WIDTH$}  winner",
        "id", "lang", "outcome", "margin", "utterance"
    );
    for case in &report.cases {
        let _ = writeln!(out, "{}", case_row(case, id_width));
    }

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{:<8}  {:>5}  {:>7}  {:>9}  {:>8}  {:>8}",
        "language", "total", "correct", "incorrect", "no_match", "accuracy"
    );
    for (language, aggregate) in &report.aggregates.by_language {
        let _ = writeln!(out, "{}", totals_row(language, &aggregate.counts, aggregate.accuracy));
    }
    let _ = writeln!(
        out,
        "{}",
        totals_row("all", &report.aggregates.counts, report.aggregates.accuracy)
    );

    if let Some(margin) = report.aggregates.margin.as_ref() {
        let _ = writeln!(
            out,
            "margin mean={:.3} p10={:.3} p50={:.3} p90={:.3}",
            margin.mean, margin.p10, margin.p50, margin.p90
        );
    }
    out
}

fn case_row(case: &CaseReport, id_width: usize) -> String {
    let margin = case
        .margin
        .map(|m| format!("{m:.3}"))
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{:<id_width$}  {:<4}  {:<9}  {:>7}  {:<UTTERANCE_WIDTH$}  {}",
        case.id,
        case.language,
        case.outcome.as_str(),
        margin,
        truncate(&case.utterance, UTTERANCE_WIDTH),
        case.winner.as_deref().unwrap_or("-"),
    )
}

fn totals_row(label: &str, counts: &AggregateCounts, accuracy: f32) -> String {
    format!(
        "{:<8}  {:>5}  {:>7}  {:>9}  {:>8}  {:>7.1}%",
        label,
        counts.total,
        counts.correct,
        counts.incorrect,
        counts.no_match,
        accuracy * 100.0
    )
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut shortened: String = text.chars().take(width.saturating_sub(1)).collect();
    shortened.push('…');
    shortened
}
