pub mod config;
pub mod error;
pub mod exercise;
pub mod matching;
pub mod pipeline;
pub mod report;
pub mod types;

pub use config::{AggregateWeights, CascadeScores, MatchConfig, SharedCharRule};
pub use error::MatchError;
pub use exercise::{AttemptOutcome, TranslateSession, WordEntry, WordGroup};
pub use pipeline::builder::TranslationMatcherBuilder;
pub use pipeline::runtime::{select_best_candidate, CandidateEvaluation, TranslationMatcher};
pub use pipeline::traits::{SentenceAligner, TokenScorer, Tokenizer};
pub use report::{aggregate_reports, compute_case_report, GradingCase, Outcome, Report};
pub use types::{
    CandidateScore, MatchInput, MatchResult, Token, TokenSequence, TokenizationMode,
};
