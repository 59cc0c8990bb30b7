use crate::config::AggregateWeights;
use crate::types::{AlignmentSummary, CandidateScore};

/// Folds one alignment into the weighted candidate score.
///
/// Both ratios are guarded so an empty utterance or a candidate with no
/// matched token reduces to zero terms instead of dividing by zero.
pub fn score_candidate(
    candidate: &str,
    user_token_count: usize,
    candidate_token_count: usize,
    alignment: &AlignmentSummary,
    weights: AggregateWeights,
    length_penalty_per_token: f64,
) -> CandidateScore {
    let matched_count = alignment.matched_count();
    let word_match_ratio = if user_token_count == 0 {
        0.0
    } else {
        matched_count as f64 / user_token_count as f64
    };
    let average_word_score = if matched_count == 0 {
        0.0
    } else {
        alignment.total_score / matched_count as f64
    };
    let length_penalty =
        user_token_count.abs_diff(candidate_token_count) as f64 * length_penalty_per_token;

    let score = weights.match_ratio * word_match_ratio + weights.average_score * average_word_score
        - weights.length_penalty * length_penalty;

    CandidateScore {
        candidate: candidate.to_string(),
        candidate_token_count,
        matched_count,
        total_score: alignment.total_score,
        word_match_ratio,
        average_word_score,
        length_penalty,
        score,
    }
}

/// Index of the winning candidate, if any.
///
/// Only candidates with at least one matched token are eligible; among
/// those the strictly highest score wins and ties keep the earliest.
pub fn select_best(scores: &[CandidateScore]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (idx, candidate) in scores.iter().enumerate() {
        if candidate.matched_count == 0 {
            continue;
        }
        let should_replace = match best {
            None => true,
            Some(current) => candidate.score > scores[current].score,
        };
        if should_replace {
            best = Some(idx);
        }
    }
    best
}

/// Best score minus runner-up score among eligible candidates.
pub fn winner_margin(scores: &[CandidateScore]) -> Option<f64> {
    let winner = select_best(scores)?;
    let runner_up = scores
        .iter()
        .enumerate()
        .filter(|&(idx, s)| idx != winner && s.matched_count > 0)
        .map(|(_, s)| s.score)
        .fold(None, |acc: Option<f64>, s| Some(acc.map_or(s, |a| a.max(s))));
    Some(scores[winner].score - runner_up.unwrap_or(0.0))
}
