use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::MatchError;
use crate::types::TokenizationMode;

/// Shared-character fallback rule (last non-zero step of the cascade).
///
/// A token pair qualifies when `common / max_len > threshold`, and then
/// scores `similarity * multiplier`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SharedCharRule {
    pub threshold: f64,
    pub multiplier: f64,
}

impl SharedCharRule {
    /// Canonical rule applied by default.
    pub const STRICT: Self = Self {
        threshold: 0.6,
        multiplier: 0.5,
    };
    /// Older, looser rule. Kept selectable for parity with earlier grading.
    pub const LENIENT: Self = Self {
        threshold: 0.5,
        multiplier: 1.0,
    };
}

impl Default for SharedCharRule {
    fn default() -> Self {
        Self::STRICT
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CascadeScores {
    pub exact: f64,
    pub near_containment: f64,
    pub near_edit: f64,
    pub containment_scale: f64,
    /// Largest character-length gap for the near-length rules.
    pub max_length_gap: usize,
    /// Largest positional-mismatch-plus-length-gap count for the edit rule.
    pub max_edit_differences: usize,
}

impl Default for CascadeScores {
    fn default() -> Self {
        Self {
            exact: 1.0,
            near_containment: 0.9,
            near_edit: 0.8,
            containment_scale: 0.7,
            max_length_gap: 1,
            max_edit_differences: 1,
        }
    }
}

/// Weights of the per-candidate aggregate:
/// `ratio * match_ratio + average * average_score - penalty * length_penalty`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggregateWeights {
    pub match_ratio: f64,
    pub average_score: f64,
    pub length_penalty: f64,
}

impl AggregateWeights {
    pub const WORD: Self = Self {
        match_ratio: 0.6,
        average_score: 0.3,
        length_penalty: 0.1,
    };
    pub const CHARACTER: Self = Self {
        match_ratio: 0.8,
        average_score: 0.2,
        length_penalty: 0.05,
    };
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    pub cascade: CascadeScores,
    pub shared_char: SharedCharRule,
    /// A token pair counts as matched only when its score is strictly above this.
    pub match_threshold: f64,
    pub length_penalty_per_token: f64,
    pub word_weights: AggregateWeights,
    pub character_weights: AggregateWeights,
    pub punctuation: Vec<char>,
    /// Primary language subtags tokenized per character.
    pub character_languages: Vec<String>,
}

impl MatchConfig {
    pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.1;
    pub const DEFAULT_LENGTH_PENALTY_PER_TOKEN: f64 = 0.03;

    pub fn load(path: &Path) -> Result<Self, MatchError> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| MatchError::io("read match config", e))?;
        Self::from_json_str(&data)
    }

    pub fn from_json_str(data: &str) -> Result<Self, MatchError> {
        let config: Self =
            serde_json::from_str(data).map_err(|e| MatchError::json("parse match config", e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_shared_char_rule(mut self, rule: SharedCharRule) -> Self {
        self.shared_char = rule;
        self
    }

    pub fn validate(&self) -> Result<(), MatchError> {
        let unit_scores = [
            ("cascade.exact", self.cascade.exact),
            ("cascade.near_containment", self.cascade.near_containment),
            ("cascade.near_edit", self.cascade.near_edit),
            ("cascade.containment_scale", self.cascade.containment_scale),
            ("shared_char.threshold", self.shared_char.threshold),
            ("shared_char.multiplier", self.shared_char.multiplier),
            ("match_threshold", self.match_threshold),
        ];
        for (name, value) in unit_scores {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(MatchError::invalid_config(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }

        let weights = [
            ("length_penalty_per_token", self.length_penalty_per_token),
            ("word_weights.match_ratio", self.word_weights.match_ratio),
            ("word_weights.average_score", self.word_weights.average_score),
            ("word_weights.length_penalty", self.word_weights.length_penalty),
            ("character_weights.match_ratio", self.character_weights.match_ratio),
            ("character_weights.average_score", self.character_weights.average_score),
            ("character_weights.length_penalty", self.character_weights.length_penalty),
        ];
        for (name, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(MatchError::invalid_config(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }

        if self
            .character_languages
            .iter()
            .any(|code| code.trim().is_empty())
        {
            return Err(MatchError::invalid_config(
                "character_languages must not contain empty codes",
            ));
        }
        Ok(())
    }

    /// Picks word or character tokenization from a BCP-47 style code.
    /// Only the primary subtag is compared, case-insensitively.
    pub fn tokenization_mode(&self, language_code: &str) -> TokenizationMode {
        let primary = primary_subtag(language_code);
        if primary.is_empty() {
            return TokenizationMode::Word;
        }
        let is_character = self
            .character_languages
            .iter()
            .any(|code| primary_subtag(code) == primary);
        if is_character {
            TokenizationMode::Character
        } else {
            TokenizationMode::Word
        }
    }

    pub fn weights_for(&self, mode: TokenizationMode) -> AggregateWeights {
        match mode {
            TokenizationMode::Word => self.word_weights,
            TokenizationMode::Character => self.character_weights,
        }
    }
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            cascade: CascadeScores::default(),
            shared_char: SharedCharRule::STRICT,
            match_threshold: Self::DEFAULT_MATCH_THRESHOLD,
            length_penalty_per_token: Self::DEFAULT_LENGTH_PENALTY_PER_TOKEN,
            word_weights: AggregateWeights::WORD,
            character_weights: AggregateWeights::CHARACTER,
            punctuation: vec!['.', ',', '!', '?', '。', '、', '！', '？'],
            character_languages: vec!["ja".to_string(), "zh".to_string()],
        }
    }
}

fn primary_subtag(code: &str) -> String {
    code.trim()
        .split(['-', '_'])
        .next()
        .unwrap_or("")
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_config_default() {
        let config = MatchConfig::default();
        assert_eq!(config.match_threshold, 0.1);
        assert_eq!(config.length_penalty_per_token, 0.03);
        assert_eq!(config.shared_char, SharedCharRule::STRICT);
        assert_eq!(config.word_weights, AggregateWeights::WORD);
        assert_eq!(config.character_weights, AggregateWeights::CHARACTER);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn tokenization_mode_uses_primary_subtag() {
        let config = MatchConfig::default();
        assert_eq!(config.tokenization_mode("ja"), TokenizationMode::Character);
        assert_eq!(config.tokenization_mode("JA-jp"), TokenizationMode::Character);
        assert_eq!(config.tokenization_mode("zh_CN"), TokenizationMode::Character);
        assert_eq!(config.tokenization_mode("es"), TokenizationMode::Word);
        assert_eq!(config.tokenization_mode(""), TokenizationMode::Word);
    }

    #[test]
    fn partial_json_overrides_only_named_fields() {
        let json = r#"{
            "match_threshold": 0.2,
            "shared_char": { "threshold": 0.5, "multiplier": 1.0 },
            "character_languages": ["ja"]
        }"#;
        let config = MatchConfig::from_json_str(json).expect("valid config json");
        assert_eq!(config.match_threshold, 0.2);
        assert_eq!(config.shared_char, SharedCharRule::LENIENT);
        assert_eq!(config.tokenization_mode("zh"), TokenizationMode::Word);
        assert_eq!(config.cascade, CascadeScores::default());
        assert_eq!(config.word_weights, AggregateWeights::WORD);
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        let err = MatchConfig::from_json_str(r#"{ "match_threshold": 1.5 }"#).unwrap_err();
        assert!(matches!(err, MatchError::InvalidConfig { .. }));
    }

    #[test]
    fn negative_weight_is_rejected() {
        let mut config = MatchConfig::default();
        config.word_weights.length_penalty = -0.1;
        assert!(matches!(
            config.validate(),
            Err(MatchError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn malformed_json_is_a_json_error() {
        let err = MatchConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, MatchError::Json { .. }));
    }
}
