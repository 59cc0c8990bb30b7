use crate::config::MatchConfig;
use crate::error::MatchError;
use crate::pipeline::defaults::{CascadeTokenScorer, GreedyTwoPassAligner, NormalizingTokenizer};
use crate::pipeline::runtime::{TranslationMatcher, TranslationMatcherParts};
use crate::pipeline::traits::{SentenceAligner, TokenScorer, Tokenizer};

pub struct TranslationMatcherBuilder {
    config: MatchConfig,
    tokenizer: Option<Box<dyn Tokenizer>>,
    token_scorer: Option<Box<dyn TokenScorer>>,
    sentence_aligner: Option<Box<dyn SentenceAligner>>,
}

impl TranslationMatcherBuilder {
    pub fn new(config: MatchConfig) -> Self {
        Self {
            config,
            tokenizer: None,
            token_scorer: None,
            sentence_aligner: None,
        }
    }

    pub fn with_tokenizer(mut self, tokenizer: Box<dyn Tokenizer>) -> Self {
        self.tokenizer = Some(tokenizer);
        self
    }

    pub fn with_token_scorer(mut self, token_scorer: Box<dyn TokenScorer>) -> Self {
        self.token_scorer = Some(token_scorer);
        self
    }

    pub fn with_sentence_aligner(mut self, sentence_aligner: Box<dyn SentenceAligner>) -> Self {
        self.sentence_aligner = Some(sentence_aligner);
        self
    }

    pub fn build(self) -> Result<TranslationMatcher, MatchError> {
        self.config.validate()?;

        let token_scorer = self
            .token_scorer
            .unwrap_or_else(|| Box::new(CascadeTokenScorer::from_config(&self.config)));

        Ok(TranslationMatcher::from_parts(TranslationMatcherParts {
            config: self.config,
            tokenizer: self
                .tokenizer
                .unwrap_or_else(|| Box::new(NormalizingTokenizer)),
            token_scorer,
            sentence_aligner: self
                .sentence_aligner
                .unwrap_or_else(|| Box::new(GreedyTwoPassAligner)),
        }))
    }
}
