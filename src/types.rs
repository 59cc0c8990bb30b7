use serde::Serialize;

/// Comparison granularity chosen from the language code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenizationMode {
    /// Whitespace-delimited words.
    Word,
    /// One token per character, for scripts written without spaces.
    Character,
}

impl TokenizationMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Word => "word",
            Self::Character => "character",
        }
    }
}

/// Lowercased, punctuation-stripped comparison unit.
///
/// Lengths are counted in `char`s, never bytes, so accented letters and
/// kana compare position by position.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    text: String,
    chars: Vec<char>,
}

impl Token {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let chars = text.chars().collect();
        Self { text, chars }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    pub fn char_len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn contains(&self, other: &Token) -> bool {
        self.text.contains(other.text.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSequence {
    pub mode: TokenizationMode,
    pub tokens: Vec<Token>,
}

impl TokenSequence {
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.tokens.iter().map(Token::as_str).collect()
    }
}

/// One user token paired with at most one candidate token.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WordMatch {
    pub user_index: usize,
    pub candidate_index: usize,
    /// Per-pair similarity in [0, 1].
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AlignmentSummary {
    pub matches: Vec<WordMatch>,
    pub total_score: f64,
}

impl AlignmentSummary {
    pub fn matched_count(&self) -> usize {
        self.matches.len()
    }
}

/// Aggregate score for one (utterance, candidate) pair.
///
/// `score` is a weighted combination and may fall outside [0, 1]
/// (the length penalty can push it below zero).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateScore {
    pub candidate: String,
    pub candidate_token_count: usize,
    pub matched_count: usize,
    pub total_score: f64,
    pub word_match_ratio: f64,
    pub average_word_score: f64,
    pub length_penalty: f64,
    pub score: f64,
}

#[derive(Debug, Clone)]
pub struct MatchInput {
    pub utterance: String,
    pub candidates: Vec<String>,
    pub correct_candidate: String,
    pub language_code: String,
}

impl MatchInput {
    pub fn new(
        utterance: impl Into<String>,
        candidates: impl IntoIterator<Item = impl Into<String>>,
        correct_candidate: impl Into<String>,
        language_code: impl Into<String>,
    ) -> Self {
        Self {
            utterance: utterance.into(),
            candidates: candidates.into_iter().map(Into::into).collect(),
            correct_candidate: correct_candidate.into(),
            language_code: language_code.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    /// `None` when no candidate had a single token pair above the match threshold.
    pub winning_candidate: Option<String>,
    pub is_correct: bool,
}
