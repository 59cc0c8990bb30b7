use serde::Serialize;

use crate::config::{CascadeScores, SharedCharRule};
use crate::types::Token;

/// Which step of the cascade produced a pair score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreRule {
    Exact,
    NearContainment,
    NearEdit,
    Containment,
    SharedCharacters,
    NoMatch,
}

impl ScoreRule {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::NearContainment => "near_containment",
            Self::NearEdit => "near_edit",
            Self::Containment => "containment",
            Self::SharedCharacters => "shared_characters",
            Self::NoMatch => "no_match",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PairScore {
    pub rule: ScoreRule,
    pub score: f64,
}

impl PairScore {
    const NONE: Self = Self {
        rule: ScoreRule::NoMatch,
        score: 0.0,
    };
}

pub fn score_tokens(
    a: &Token,
    b: &Token,
    cascade: &CascadeScores,
    shared_char: SharedCharRule,
) -> f64 {
    score_tokens_detailed(a, b, cascade, shared_char).score
}

/// First applicable rule wins; the result is symmetric in `a` and `b` and
/// always within [0, 1] for a validated config.
pub fn score_tokens_detailed(
    a: &Token,
    b: &Token,
    cascade: &CascadeScores,
    shared_char: SharedCharRule,
) -> PairScore {
    if a == b {
        return PairScore {
            rule: ScoreRule::Exact,
            score: cascade.exact,
        };
    }
    // An empty token is contained in everything; it must not score.
    if a.is_empty() || b.is_empty() {
        return PairScore::NONE;
    }

    let (len_a, len_b) = (a.char_len(), b.char_len());
    let length_gap = len_a.abs_diff(len_b);
    let contained = a.contains(b) || b.contains(a);

    if length_gap <= cascade.max_length_gap {
        if contained {
            return PairScore {
                rule: ScoreRule::NearContainment,
                score: cascade.near_containment,
            };
        }
        if prefix_mismatches(a.chars(), b.chars()) + length_gap <= cascade.max_edit_differences {
            return PairScore {
                rule: ScoreRule::NearEdit,
                score: cascade.near_edit,
            };
        }
    }

    let longest = len_a.max(len_b) as f64;
    if contained {
        let ratio = len_a.min(len_b) as f64 / longest;
        return PairScore {
            rule: ScoreRule::Containment,
            score: ratio * cascade.containment_scale,
        };
    }

    let common = shared_char_count(a.chars(), b.chars()).min(shared_char_count(b.chars(), a.chars()));
    let similarity = common as f64 / longest;
    if similarity > shared_char.threshold {
        return PairScore {
            rule: ScoreRule::SharedCharacters,
            score: similarity * shared_char.multiplier,
        };
    }

    PairScore::NONE
}

fn prefix_mismatches(a: &[char], b: &[char]) -> usize {
    a.iter().zip(b).filter(|(x, y)| x != y).count()
}

/// Occurrences in `from` of characters that appear anywhere in `within`.
fn shared_char_count(from: &[char], within: &[char]) -> usize {
    from.iter().filter(|c| within.contains(c)).count()
}
