use crate::config::MatchConfig;
use crate::error::MatchError;
use crate::matching::candidate_selector::{score_candidate, select_best, winner_margin};
use crate::pipeline::defaults::{CascadeTokenScorer, GreedyTwoPassAligner, NormalizingTokenizer};
use crate::pipeline::traits::{SentenceAligner, TokenScorer, Tokenizer};
use crate::types::{CandidateScore, MatchInput, MatchResult, TokenSequence, TokenizationMode};

pub struct TranslationMatcher {
    config: MatchConfig,
    tokenizer: Box<dyn Tokenizer>,
    token_scorer: Box<dyn TokenScorer>,
    sentence_aligner: Box<dyn SentenceAligner>,
}

pub(crate) struct TranslationMatcherParts {
    pub config: MatchConfig,
    pub tokenizer: Box<dyn Tokenizer>,
    pub token_scorer: Box<dyn TokenScorer>,
    pub sentence_aligner: Box<dyn SentenceAligner>,
}

/// Every candidate's aggregate for one utterance, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateEvaluation {
    pub mode: TokenizationMode,
    pub user_token_count: usize,
    pub scores: Vec<CandidateScore>,
    pub winner: Option<usize>,
}

impl CandidateEvaluation {
    pub fn winning_candidate(&self) -> Option<&str> {
        self.winner
            .map(|idx| self.scores[idx].candidate.as_str())
    }

    pub fn margin(&self) -> Option<f64> {
        winner_margin(&self.scores)
    }
}

impl TranslationMatcher {
    pub(crate) fn from_parts(parts: TranslationMatcherParts) -> Self {
        Self {
            config: parts.config,
            tokenizer: parts.tokenizer,
            token_scorer: parts.token_scorer,
            sentence_aligner: parts.sentence_aligner,
        }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn tokenize(&self, text: &str, language_code: &str) -> TokenSequence {
        let mode = self.config.tokenization_mode(language_code);
        self.tokenizer
            .tokenize(text, mode, &self.config.punctuation)
    }

    pub fn score_candidates(&self, input: &MatchInput) -> Result<CandidateEvaluation, MatchError> {
        if input.candidates.is_empty() {
            return Err(MatchError::invalid_input(
                "at least one candidate sentence is required",
            ));
        }

        let mode = self.config.tokenization_mode(&input.language_code);
        let weights = self.config.weights_for(mode);
        let user = self
            .tokenizer
            .tokenize(&input.utterance, mode, &self.config.punctuation);

        if user.is_empty() {
            tracing::debug!(
                language = input.language_code.as_str(),
                "matching: utterance normalized to zero tokens"
            );
        }

        let scores = input
            .candidates
            .iter()
            .map(|candidate| {
                let candidate_tokens =
                    self.tokenizer
                        .tokenize(candidate, mode, &self.config.punctuation);
                let alignment = self.sentence_aligner.align(
                    &user.tokens,
                    &candidate_tokens.tokens,
                    self.config.match_threshold,
                    self.token_scorer.as_ref(),
                );
                let scored = score_candidate(
                    candidate,
                    user.len(),
                    candidate_tokens.len(),
                    &alignment,
                    weights,
                    self.config.length_penalty_per_token,
                );
                tracing::debug!(
                    candidate = candidate.as_str(),
                    mode = mode.as_str(),
                    matched = scored.matched_count,
                    match_ratio = format!("{:.3}", scored.word_match_ratio),
                    average_score = format!("{:.3}", scored.average_word_score),
                    length_penalty = format!("{:.3}", scored.length_penalty),
                    score = format!("{:.3}", scored.score),
                    "matching: candidate scored"
                );
                scored
            })
            .collect::<Vec<_>>();

        let winner = select_best(&scores);
        Ok(CandidateEvaluation {
            mode,
            user_token_count: user.len(),
            scores,
            winner,
        })
    }

    pub fn select_best_candidate(&self, input: &MatchInput) -> Result<MatchResult, MatchError> {
        if !input
            .candidates
            .iter()
            .any(|candidate| candidate == &input.correct_candidate)
        {
            tracing::warn!(
                correct = input.correct_candidate.as_str(),
                candidate_count = input.candidates.len(),
                "matching: correct sentence is not among the candidates"
            );
        }

        let evaluation = self.score_candidates(input)?;
        let winning_candidate = evaluation.winning_candidate().map(str::to_string);
        let is_correct = winning_candidate.as_deref() == Some(input.correct_candidate.as_str());

        tracing::debug!(
            winner = winning_candidate.as_deref().unwrap_or("<none>"),
            is_correct,
            "matching: selected candidate"
        );

        Ok(MatchResult {
            winning_candidate,
            is_correct,
        })
    }
}

impl Default for TranslationMatcher {
    fn default() -> Self {
        let config = MatchConfig::default();
        Self::from_parts(TranslationMatcherParts {
            tokenizer: Box::new(NormalizingTokenizer),
            token_scorer: Box::new(CascadeTokenScorer::from_config(&config)),
            sentence_aligner: Box::new(GreedyTwoPassAligner),
            config,
        })
    }
}

/// Grades `utterance` against `candidates` with the default configuration.
pub fn select_best_candidate(
    utterance: &str,
    candidates: &[impl AsRef<str>],
    correct_candidate: &str,
    language_code: &str,
) -> Result<MatchResult, MatchError> {
    let input = MatchInput {
        utterance: utterance.to_string(),
        candidates: candidates
            .iter()
            .map(|candidate| candidate.as_ref().to_string())
            .collect(),
        correct_candidate: correct_candidate.to_string(),
        language_code: language_code.to_string(),
    };
    TranslationMatcher::default().select_best_candidate(&input)
}
