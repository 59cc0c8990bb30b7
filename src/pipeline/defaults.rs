use crate::config::{CascadeScores, MatchConfig, SharedCharRule};
use crate::matching::aligner::align_and_score;
use crate::matching::tokenization::tokenize;
use crate::matching::word_scorer::score_tokens;
use crate::pipeline::traits::{SentenceAligner, TokenScorer, Tokenizer};
use crate::types::{AlignmentSummary, Token, TokenSequence, TokenizationMode};

pub struct NormalizingTokenizer;

impl Tokenizer for NormalizingTokenizer {
    fn tokenize(
        &self,
        text: &str,
        mode: TokenizationMode,
        punctuation: &[char],
    ) -> TokenSequence {
        tokenize(text, mode, punctuation)
    }
}

#[derive(Debug, Clone)]
pub struct CascadeTokenScorer {
    cascade: CascadeScores,
    shared_char: SharedCharRule,
}

impl CascadeTokenScorer {
    pub fn new(cascade: CascadeScores, shared_char: SharedCharRule) -> Self {
        Self {
            cascade,
            shared_char,
        }
    }

    pub fn from_config(config: &MatchConfig) -> Self {
        Self::new(config.cascade.clone(), config.shared_char)
    }
}

impl TokenScorer for CascadeTokenScorer {
    fn score(&self, a: &Token, b: &Token) -> f64 {
        score_tokens(a, b, &self.cascade, self.shared_char)
    }
}

pub struct GreedyTwoPassAligner;

impl SentenceAligner for GreedyTwoPassAligner {
    fn align(
        &self,
        user_tokens: &[Token],
        candidate_tokens: &[Token],
        match_threshold: f64,
        scorer: &dyn TokenScorer,
    ) -> AlignmentSummary {
        align_and_score(user_tokens, candidate_tokens, match_threshold, |a, b| {
            scorer.score(a, b)
        })
    }
}
