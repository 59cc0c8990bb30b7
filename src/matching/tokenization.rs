use crate::types::{Token, TokenSequence, TokenizationMode};

/// Lowercases, drops `punctuation` and collapses whitespace runs to one space.
pub fn normalize_text(text: &str, punctuation: &[char]) -> String {
    let stripped: String = text
        .to_lowercase()
        .chars()
        .filter(|c| !punctuation.contains(c))
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn tokenize(text: &str, mode: TokenizationMode, punctuation: &[char]) -> TokenSequence {
    let normalized = normalize_text(text, punctuation);
    let tokens = match mode {
        TokenizationMode::Word => normalized.split_whitespace().map(Token::new).collect(),
        TokenizationMode::Character => normalized
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| Token::new(c.to_string()))
            .collect(),
    };
    TokenSequence { mode, tokens }
}
