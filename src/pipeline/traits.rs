use crate::types::{AlignmentSummary, Token, TokenSequence, TokenizationMode};

pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str, mode: TokenizationMode, punctuation: &[char])
        -> TokenSequence;
}

pub trait TokenScorer: Send + Sync {
    /// Similarity in [0, 1]; must be symmetric in its arguments.
    fn score(&self, a: &Token, b: &Token) -> f64;
}

pub trait SentenceAligner: Send + Sync {
    fn align(
        &self,
        user_tokens: &[Token],
        candidate_tokens: &[Token],
        match_threshold: f64,
        scorer: &dyn TokenScorer,
    ) -> AlignmentSummary;
}
