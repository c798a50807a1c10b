//! Lexicon-based sentiment scoring.
//!
//! Scores land in `[-1, 1]`. Each valence word contributes its lexicon value,
//! adjusted by preceding boosters, a negation within the last few tokens,
//! shouting (all caps in otherwise mixed-case text), and its position around
//! a contrastive "but". Trailing exclamation marks amplify the total, which is
//! then squashed with `x / sqrt(x^2 + alpha)`.

use crate::lexicon::SentimentLexicon;

/// Normalization constant for the compound score.
const ALPHA: f64 = 15.0;
/// Valence increment for an all-caps word in mixed-case text.
const CAPS_INCREMENT: f64 = 0.733;
/// Multiplier applied to a negated valence.
const NEGATION_SCALAR: f64 = -0.74;
/// Per-mark emphasis, capped at four marks.
const EXCLAMATION_INCREMENT: f64 = 0.292;
const MAX_EXCLAMATIONS: usize = 4;

/// Scores the polarity of a single text.
pub trait SentimentScorer {
    /// Polarity in `[-1, 1]`; `0.0` for text without opinion words.
    fn score(&self, text: &str) -> f64;
}

/// Rule-based scorer over a [`SentimentLexicon`].
#[derive(Debug, Clone)]
pub struct LexiconScorer {
    lexicon: SentimentLexicon,
    /// Tokens looked back for boosters and negations.
    window: usize,
}

struct Token<'a> {
    raw: &'a str,
    lower: String,
}

impl LexiconScorer {
    /// Create a scorer with the built-in lexicon.
    pub fn new() -> Self {
        Self {
            lexicon: SentimentLexicon::new(),
            window: 3,
        }
    }

    /// Use a custom lexicon.
    pub fn with_lexicon(mut self, lexicon: SentimentLexicon) -> Self {
        self.lexicon = lexicon;
        self
    }

    /// Set the look-back window for boosters and negations.
    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    fn tokens(text: &str) -> Vec<Token<'_>> {
        text.split_whitespace()
            .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric() && c != '\''))
            .map(|w| w.trim_matches('\''))
            .filter(|w| !w.is_empty())
            .map(|raw| Token {
                raw,
                lower: raw.to_lowercase(),
            })
            .collect()
    }

    fn is_shouted(word: &str) -> bool {
        word.chars().any(|c| c.is_alphabetic()) && !word.chars().any(|c| c.is_lowercase())
    }

    fn valence_at(&self, tokens: &[Token<'_>], i: usize, mixed_case: bool) -> Option<f64> {
        let token = &tokens[i];
        let mut valence = self.lexicon.valence(&token.lower)?;
        if self.lexicon.booster(&token.lower).is_some() {
            return None;
        }

        if mixed_case && Self::is_shouted(token.raw) {
            valence += CAPS_INCREMENT * valence.signum();
        }

        let lookback = i.min(self.window);
        for back in 1..=lookback {
            let prev = &tokens[i - back];
            if let Some(boost) = self.lexicon.booster(&prev.lower) {
                let mut scalar = boost * valence.signum();
                if mixed_case && Self::is_shouted(prev.raw) {
                    scalar += CAPS_INCREMENT * valence.signum();
                }
                // Boosters further away count for less.
                scalar *= match back {
                    1 => 1.0,
                    2 => 0.95,
                    _ => 0.9,
                };
                valence += scalar;
            }
        }

        let negated = (1..=lookback).any(|back| self.lexicon.is_negation(&tokens[i - back].lower));
        if negated {
            valence *= NEGATION_SCALAR;
        }

        Some(valence)
    }
}

impl Default for LexiconScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl SentimentScorer for LexiconScorer {
    fn score(&self, text: &str) -> f64 {
        let tokens = Self::tokens(text);
        if tokens.is_empty() {
            return 0.0;
        }

        let shouted = tokens.iter().filter(|t| Self::is_shouted(t.raw)).count();
        let mixed_case = shouted > 0 && shouted < tokens.len();
        let but_at = tokens.iter().position(|t| t.lower == "but");

        let mut sum = 0.0;
        for i in 0..tokens.len() {
            let Some(mut valence) = self.valence_at(&tokens, i, mixed_case) else {
                continue;
            };
            if let Some(b) = but_at {
                if i < b {
                    valence *= 0.5;
                } else if i > b {
                    valence *= 1.5;
                }
            }
            sum += valence;
        }

        if sum == 0.0 {
            return 0.0;
        }

        let marks = text.chars().filter(|&c| c == '!').count().min(MAX_EXCLAMATIONS);
        sum += marks as f64 * EXCLAMATION_INCREMENT * sum.signum();

        (sum / (sum * sum + ALPHA).sqrt()).clamp(-1.0, 1.0)
    }
}
