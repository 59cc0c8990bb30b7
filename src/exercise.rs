//! Translate exercise built around the matcher.
//!
//! The learner sees one word's sentence in translation plus two decoy
//! sentences from the same group, then speaks or types the original
//! sentence (or taps an option). Shuffling always goes through a caller
//! supplied [`Rng`] so sessions are reproducible with a seeded generator.

use std::path::Path;
use std::time::Duration;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::MatchError;
use crate::pipeline::runtime::TranslationMatcher;
use crate::types::MatchInput;

pub const DECOY_COUNT: usize = 2;
/// Consecutive misses after which the caller should offer to show the answer.
pub const MISSES_BEFORE_HINT: u32 = 2;

const SPEECH_MS_PER_WORD: u64 = 200;
const SPEECH_BASE_MS: u64 = 500;
const FALLBACK_BUFFER_MS: u64 = 1_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordEntry {
    pub word: String,
    pub translation: String,
    #[serde(default)]
    pub definition: String,
    pub sentence: String,
    pub translated_sentence: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentence_kana: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentence_romaji_pinyin: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordGroup {
    pub language: String,
    pub name: String,
    #[serde(default)]
    pub translated_name: String,
    #[serde(default)]
    pub words: Vec<WordEntry>,
}

impl WordGroup {
    pub fn load(path: &Path) -> Result<Self, MatchError> {
        let data =
            std::fs::read_to_string(path).map_err(|e| MatchError::io("read word group", e))?;
        serde_json::from_str(&data).map_err(|e| MatchError::json("parse word group", e))
    }
}

/// Fisher-Yates shuffle into a new vector; `items` is left untouched.
pub fn scramble<T: Clone, R: Rng + ?Sized>(items: &[T], rng: &mut R) -> Vec<T> {
    let mut scrambled = items.to_vec();
    scrambled.shuffle(rng);
    scrambled
}

#[derive(Debug, Clone, PartialEq)]
pub struct SentenceOptions {
    pub correct: String,
    /// Correct sentence plus up to [`DECOY_COUNT`] distinct decoys, shuffled.
    pub options: Vec<String>,
}

pub fn build_sentence_options<R: Rng + ?Sized>(
    entries: &[WordEntry],
    index: usize,
    rng: &mut R,
) -> Result<SentenceOptions, MatchError> {
    let correct = entries
        .get(index)
        .map(|entry| entry.sentence.clone())
        .ok_or_else(|| {
            MatchError::invalid_input(format!(
                "sentence index {index} out of range for {} entries",
                entries.len()
            ))
        })?;

    let mut pool: Vec<&str> = Vec::with_capacity(entries.len());
    for (i, entry) in entries.iter().enumerate() {
        let sentence = entry.sentence.as_str();
        if i == index || sentence == correct || pool.contains(&sentence) {
            continue;
        }
        pool.push(sentence);
    }

    let mut options = vec![correct.clone()];
    options.extend(
        pool.choose_multiple(rng, DECOY_COUNT)
            .map(|sentence| sentence.to_string()),
    );
    options.shuffle(rng);

    Ok(SentenceOptions { correct, options })
}

/// Rough playback length of a spoken sentence.
pub fn estimate_speech_duration(text: &str) -> Duration {
    let words = text.split_whitespace().count() as u64;
    Duration::from_millis(words * SPEECH_MS_PER_WORD + SPEECH_BASE_MS)
}

/// Deadline after which the exercise advances even if playback never reports completion.
pub fn fallback_timeout(text: &str) -> Duration {
    estimate_speech_duration(text) + Duration::from_millis(FALLBACK_BUFFER_MS)
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome {
    /// Play the sentence, then advance once playback ends or `fallback_timeout` elapses.
    Correct {
        sentence: String,
        fallback_timeout: Duration,
    },
    Incorrect {
        matched: String,
    },
    NoMatch,
}

#[derive(Debug, Clone)]
pub struct TranslateSession {
    language: String,
    entries: Vec<WordEntry>,
    index: usize,
    options: SentenceOptions,
    matched: Option<String>,
    consecutive_misses: u32,
    answer_revealed: bool,
    complete: bool,
}

impl TranslateSession {
    pub fn start<R: Rng + ?Sized>(group: &WordGroup, rng: &mut R) -> Result<Self, MatchError> {
        if group.words.is_empty() {
            return Err(MatchError::invalid_input(format!(
                "word group '{}' has no words",
                group.name
            )));
        }
        let entries = scramble(&group.words, rng);
        let options = build_sentence_options(&entries, 0, rng)?;
        tracing::debug!(
            group = group.name.as_str(),
            language = group.language.as_str(),
            words = entries.len(),
            "exercise: translate session started"
        );
        Ok(Self {
            language: group.language.clone(),
            entries,
            index: 0,
            options,
            matched: None,
            consecutive_misses: 0,
            answer_revealed: false,
            complete: false,
        })
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn current_entry(&self) -> Option<&WordEntry> {
        if self.complete {
            return None;
        }
        self.entries.get(self.index)
    }

    pub fn options(&self) -> &[String] {
        &self.options.options
    }

    /// Candidate the last attempt resolved to, correct or not.
    pub fn matched(&self) -> Option<&str> {
        self.matched.as_deref()
    }

    /// `(answered, total)`.
    pub fn progress(&self) -> (usize, usize) {
        let answered = if self.complete {
            self.entries.len()
        } else {
            self.index
        };
        (answered, self.entries.len())
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn should_offer_answer(&self) -> bool {
        !self.answer_revealed && self.consecutive_misses >= MISSES_BEFORE_HINT
    }

    pub fn submit_utterance(
        &mut self,
        matcher: &TranslationMatcher,
        utterance: &str,
    ) -> Result<AttemptOutcome, MatchError> {
        self.ensure_active()?;
        let input = MatchInput {
            utterance: utterance.to_string(),
            candidates: self.options.options.clone(),
            correct_candidate: self.options.correct.clone(),
            language_code: self.language.clone(),
        };
        let result = matcher.select_best_candidate(&input)?;
        Ok(self.record(result.winning_candidate))
    }

    pub fn choose_option(&mut self, sentence: &str) -> Result<AttemptOutcome, MatchError> {
        self.ensure_active()?;
        if !self.options.options.iter().any(|option| option == sentence) {
            return Err(MatchError::invalid_input(format!(
                "'{sentence}' is not one of the current options"
            )));
        }
        Ok(self.record(Some(sentence.to_string())))
    }

    pub fn reveal_answer(&mut self) -> Option<&str> {
        if self.complete {
            return None;
        }
        self.answer_revealed = true;
        Some(self.options.correct.as_str())
    }

    /// Moves to the next sentence; returns `false` once the group is exhausted.
    pub fn advance<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<bool, MatchError> {
        self.ensure_active()?;
        let next = self.index + 1;
        if next >= self.entries.len() {
            self.complete = true;
            tracing::debug!(words = self.entries.len(), "exercise: translate session complete");
            return Ok(false);
        }
        self.options = build_sentence_options(&self.entries, next, rng)?;
        self.index = next;
        self.matched = None;
        self.consecutive_misses = 0;
        self.answer_revealed = false;
        Ok(true)
    }

    fn ensure_active(&self) -> Result<(), MatchError> {
        if self.complete {
            return Err(MatchError::invalid_input("translate session is complete"));
        }
        Ok(())
    }

    fn record(&mut self, winner: Option<String>) -> AttemptOutcome {
        self.matched = winner.clone();
        match winner {
            Some(sentence) if sentence == self.options.correct => {
                self.consecutive_misses = 0;
                AttemptOutcome::Correct {
                    fallback_timeout: fallback_timeout(&sentence),
                    sentence,
                }
            }
            Some(matched) => {
                self.consecutive_misses += 1;
                AttemptOutcome::Incorrect { matched }
            }
            None => {
                self.consecutive_misses += 1;
                AttemptOutcome::NoMatch
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn entry(word: &str, sentence: &str) -> WordEntry {
        WordEntry {
            word: word.to_string(),
            translation: String::new(),
            definition: String::new(),
            sentence: sentence.to_string(),
            translated_sentence: String::new(),
            sentence_kana: None,
            sentence_romaji_pinyin: None,
        }
    }

    fn spanish_group() -> WordGroup {
        WordGroup {
            language: "es".to_string(),
            name: "animales".to_string(),
            translated_name: "animals".to_string(),
            words: vec![
                entry("perro", "el perro corre rápido"),
                entry("gato", "el gato duerme mucho"),
                entry("casa", "la casa es grande"),
                entry("pájaro", "el pájaro canta en el árbol"),
            ],
        }
    }

    #[test]
    fn scramble_keeps_every_item() {
        let mut rng = StdRng::seed_from_u64(7);
        let items: Vec<u32> = (0..20).collect();
        let mut scrambled = scramble(&items, &mut rng);
        assert_eq!(scrambled.len(), items.len());
        scrambled.sort_unstable();
        assert_eq!(scrambled, items);
    }

    #[test]
    fn scramble_is_reproducible_with_a_seed() {
        let items: Vec<u32> = (0..20).collect();
        let a = scramble(&items, &mut StdRng::seed_from_u64(42));
        let b = scramble(&items, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn options_hold_correct_plus_two_distinct_decoys() {
        let group = spanish_group();
        let mut rng = StdRng::seed_from_u64(3);
        for index in 0..group.words.len() {
            let options = build_sentence_options(&group.words, index, &mut rng).expect("in range");
            assert_eq!(options.correct, group.words[index].sentence);
            assert_eq!(options.options.len(), 1 + DECOY_COUNT);
            assert_eq!(
                options.options.iter().filter(|o| **o == options.correct).count(),
                1
            );
            let mut unique = options.options.clone();
            unique.sort();
            unique.dedup();
            assert_eq!(unique.len(), options.options.len());
        }
    }

    #[test]
    fn small_groups_get_fewer_decoys() {
        let words = vec![entry("a", "uno"), entry("b", "dos"), entry("c", "uno")];
        let options =
            build_sentence_options(&words, 0, &mut StdRng::seed_from_u64(1)).expect("in range");
        assert_eq!(options.options.len(), 2);
    }

    #[test]
    fn out_of_range_index_is_invalid_input() {
        let err = build_sentence_options(&[], 0, &mut StdRng::seed_from_u64(1)).unwrap_err();
        assert!(matches!(err, MatchError::InvalidInput { .. }));
    }

    #[test]
    fn speech_duration_estimate() {
        assert_eq!(
            estimate_speech_duration("el perro corre rápido"),
            Duration::from_millis(1_300)
        );
        assert_eq!(estimate_speech_duration(""), Duration::from_millis(500));
        assert_eq!(
            fallback_timeout("el perro corre rápido"),
            Duration::from_millis(2_300)
        );
    }

    #[test]
    fn word_group_parses_camel_case_json() {
        let json = r#"{
            "language": "ja",
            "name": "動物",
            "translatedName": "Animals",
            "words": [{
                "word": "猫",
                "translation": "cat",
                "sentence": "猫がいます",
                "translatedSentence": "There is a cat",
                "sentenceKana": "ねこがいます"
            }]
        }"#;
        let group: WordGroup = serde_json::from_str(json).expect("valid group json");
        assert_eq!(group.words[0].sentence_kana.as_deref(), Some("ねこがいます"));
        assert_eq!(group.words[0].sentence_romaji_pinyin, None);
        assert!(group.words[0].definition.is_empty());
    }

    #[test]
    fn empty_group_cannot_start() {
        let mut group = spanish_group();
        group.words.clear();
        let err = TranslateSession::start(&group, &mut StdRng::seed_from_u64(1)).unwrap_err();
        assert!(matches!(err, MatchError::InvalidInput { .. }));
    }

    #[test]
    fn session_walks_through_every_sentence() {
        let group = spanish_group();
        let matcher = TranslationMatcher::default();
        let mut rng = StdRng::seed_from_u64(11);
        let mut session = TranslateSession::start(&group, &mut rng).expect("non-empty group");
        let mut seen = Vec::new();

        while !session.is_complete() {
            let sentence = session
                .current_entry()
                .map(|entry| entry.sentence.clone())
                .expect("active session has an entry");
            let outcome = session
                .submit_utterance(&matcher, &sentence)
                .expect("session active");
            assert_eq!(
                outcome,
                AttemptOutcome::Correct {
                    fallback_timeout: fallback_timeout(&sentence),
                    sentence: sentence.clone(),
                }
            );
            seen.push(sentence);
            session.advance(&mut rng).expect("session active");
        }

        assert_eq!(session.progress(), (4, 4));
        seen.sort();
        let mut expected: Vec<String> = group.words.iter().map(|w| w.sentence.clone()).collect();
        expected.sort();
        assert_eq!(seen, expected);
        assert!(session.submit_utterance(&matcher, "hola").is_err());
    }

    #[test]
    fn repeated_misses_offer_the_answer() {
        let group = spanish_group();
        let matcher = TranslationMatcher::default();
        let mut rng = StdRng::seed_from_u64(5);
        let mut session = TranslateSession::start(&group, &mut rng).expect("non-empty group");

        assert_eq!(
            session
                .submit_utterance(&matcher, "xyz123")
                .expect("session active"),
            AttemptOutcome::NoMatch
        );
        assert!(!session.should_offer_answer());

        let correct = session
            .current_entry()
            .map(|entry| entry.sentence.clone())
            .expect("active session has an entry");
        let wrong = session
            .options()
            .iter()
            .find(|option| **option != correct)
            .cloned()
            .expect("decoy present");
        assert_eq!(
            session.choose_option(&wrong).expect("session active"),
            AttemptOutcome::Incorrect {
                matched: wrong.clone()
            }
        );
        assert_eq!(session.matched(), Some(wrong.as_str()));
        assert!(session.should_offer_answer());

        assert_eq!(session.reveal_answer(), Some(correct.as_str()));
        assert!(!session.should_offer_answer());
    }

    #[test]
    fn choosing_an_unknown_option_is_rejected() {
        let group = spanish_group();
        let mut session =
            TranslateSession::start(&group, &mut StdRng::seed_from_u64(9)).expect("non-empty group");
        assert!(session.choose_option("no existe").is_err());
    }
}
