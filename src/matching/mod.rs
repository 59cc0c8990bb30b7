//! Translation matching core.
//!
//! An utterance is tokenized once, each candidate is tokenized and aligned
//! against it, and the per-candidate aggregates decide the winner:
//!
//! ```text
//! tokenize -> align_and_score (score_tokens per pair) -> score_candidate -> select_best
//! ```

pub mod aligner;
pub mod candidate_selector;
pub mod tokenization;
pub mod word_scorer;

pub use aligner::align_and_score;
pub use candidate_selector::{score_candidate, select_best, winner_margin};
pub use tokenization::{normalize_text, tokenize};
pub use word_scorer::{score_tokens, score_tokens_detailed, PairScore, ScoreRule};
