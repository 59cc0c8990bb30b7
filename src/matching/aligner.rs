use crate::types::{AlignmentSummary, Token, WordMatch};

/// Greedy two-pass alignment of user tokens against one candidate.
///
/// Pass 1 pairs tokens position by position over the common prefix.
/// Pass 2 lets each user token past that prefix claim the best-scoring
/// candidate token not consumed yet. A pair counts only when its score is
/// strictly above `match_threshold`; every candidate token is consumed at
/// most once.
pub fn align_and_score<F>(
    user_tokens: &[Token],
    candidate_tokens: &[Token],
    match_threshold: f64,
    score: F,
) -> AlignmentSummary
where
    F: Fn(&Token, &Token) -> f64,
{
    let mut summary = AlignmentSummary::default();
    if user_tokens.is_empty() || candidate_tokens.is_empty() {
        return summary;
    }

    let mut consumed = vec![false; candidate_tokens.len()];
    let overlap = user_tokens.len().min(candidate_tokens.len());

    for (i, (user, candidate)) in user_tokens
        .iter()
        .zip(candidate_tokens.iter())
        .enumerate()
    {
        let s = score(user, candidate);
        if s > match_threshold {
            consumed[i] = true;
            summary.push(WordMatch {
                user_index: i,
                candidate_index: i,
                score: s,
            });
        }
    }

    for (user_index, user) in user_tokens.iter().enumerate().skip(overlap) {
        let mut best: Option<(usize, f64)> = None;
        for (candidate_index, candidate) in candidate_tokens.iter().enumerate() {
            if consumed[candidate_index] {
                continue;
            }
            let s = score(user, candidate);
            if best.map_or(true, |(_, best_score)| s > best_score) {
                best = Some((candidate_index, s));
            }
        }

        if let Some((candidate_index, s)) = best {
            if s > match_threshold {
                consumed[candidate_index] = true;
                summary.push(WordMatch {
                    user_index,
                    candidate_index,
                    score: s,
                });
            }
        }
    }

    summary
}

impl AlignmentSummary {
    fn push(&mut self, word_match: WordMatch) {
        self.total_score += word_match.score;
        self.matches.push(word_match);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::config::{CascadeScores, SharedCharRule};
    use crate::matching::word_scorer::score_tokens;

    fn tokens(words: &[&str]) -> Vec<Token> {
        words.iter().map(|w| Token::new(*w)).collect()
    }

    fn cascade(a: &Token, b: &Token) -> f64 {
        score_tokens(a, b, &CascadeScores::default(), SharedCharRule::STRICT)
    }

    #[test]
    fn empty_user_tokens_yield_zero() {
        let summary = align_and_score(&[], &tokens(&["el", "perro"]), 0.1, cascade);
        assert_eq!(summary.matched_count(), 0);
        assert_eq!(summary.total_score, 0.0);
    }

    #[test]
    fn empty_candidate_tokens_yield_zero() {
        let summary = align_and_score(&tokens(&["el"]), &[], 0.1, cascade);
        assert_eq!(summary.matched_count(), 0);
    }

    #[test]
    fn positional_pass_matches_in_place() {
        let summary = align_and_score(
            &tokens(&["el", "perro", "corre"]),
            &tokens(&["el", "perro", "corre"]),
            0.1,
            cascade,
        );
        assert_eq!(summary.matched_count(), 3);
        assert!((summary.total_score - 3.0).abs() < 1e-9);
        assert!(summary
            .matches
            .iter()
            .all(|m| m.user_index == m.candidate_index));
    }

    #[test]
    fn positional_pass_does_not_search_other_positions() {
        // Swapped words inside the overlap are not realigned.
        let summary = align_and_score(
            &tokens(&["perro", "el"]),
            &tokens(&["el", "perro"]),
            0.1,
            cascade,
        );
        assert_eq!(summary.matched_count(), 0);
    }

    #[test]
    fn extra_user_tokens_claim_best_unconsumed() {
        let summary = align_and_score(
            &tokens(&["xx", "perro", "el"]),
            &tokens(&["el", "perro"]),
            0.1,
            cascade,
        );
        // Position 1 matches "perro"; the trailing "el" finds index 0 in pass 2.
        assert_eq!(summary.matched_count(), 2);
        assert_eq!(
            summary.matches[1],
            WordMatch {
                user_index: 2,
                candidate_index: 0,
                score: 1.0
            }
        );
    }

    #[test]
    fn repeated_user_word_cannot_reuse_candidate_token() {
        let summary = align_and_score(
            &tokens(&["gato", "gato", "gato", "gato"]),
            &tokens(&["gato"]),
            0.1,
            cascade,
        );
        assert_eq!(summary.matched_count(), 1);
        assert!((summary.total_score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn no_candidate_index_is_counted_twice() {
        let summary = align_and_score(
            &tokens(&["la", "casa", "casa", "la", "es", "casas", "grande"]),
            &tokens(&["la", "casa", "es", "grande"]),
            0.1,
            cascade,
        );
        let indices: HashSet<usize> = summary.matches.iter().map(|m| m.candidate_index).collect();
        assert_eq!(indices.len(), summary.matched_count());
        assert!(summary.matched_count() <= 4);
    }

    #[test]
    fn scores_at_threshold_do_not_count() {
        let summary = align_and_score(&tokens(&["a"]), &tokens(&["b"]), 0.1, |_, _| 0.1);
        assert_eq!(summary.matched_count(), 0);
    }

    #[test]
    fn consumed_tokens_are_skipped_in_pass_two() {
        let summary = align_and_score(&tokens(&["x", "y"]), &tokens(&["a"]), 0.1, |_, _| 0.5);
        assert_eq!(summary.matched_count(), 1);
    }

    #[test]
    fn pass_two_ties_resolve_to_first_index() {
        let summary = align_and_score(
            &tokens(&["p", "q", "r"]),
            &tokens(&["a", "b"]),
            0.1,
            |u, _| if u.as_str() == "r" { 0.5 } else { 0.0 },
        );
        assert_eq!(
            summary.matches,
            vec![WordMatch {
                user_index: 2,
                candidate_index: 0,
                score: 0.5
            }]
        );
    }
}
