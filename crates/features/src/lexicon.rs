//! Sentiment lexicon.
//!
//! Valences are on a -4..=4 scale. The word list mixes general-purpose
//! opinion words with market vocabulary common in finance hashtags.

use std::collections::{HashMap, HashSet};

const POSITIVE: &[(&str, f64)] = &[
    // markets
    ("bull", 1.9),
    ("bullish", 2.6),
    ("rally", 2.0),
    ("rallies", 2.0),
    ("rallying", 2.1),
    ("surge", 2.1),
    ("surges", 2.1),
    ("surging", 2.3),
    ("soar", 2.4),
    ("soars", 2.4),
    ("soaring", 2.5),
    ("gain", 1.8),
    ("gains", 1.8),
    ("gained", 1.6),
    ("profit", 1.9),
    ("profits", 1.9),
    ("profitable", 2.1),
    ("breakout", 1.8),
    ("uptrend", 1.8),
    ("upside", 1.5),
    ("outperform", 1.9),
    ("outperformed", 1.9),
    ("beat", 1.2),
    ("beats", 1.4),
    ("record", 1.0),
    ("high", 0.6),
    ("higher", 0.9),
    ("green", 1.0),
    ("buy", 0.9),
    ("accumulate", 1.1),
    ("recover", 1.6),
    ("recovery", 1.7),
    ("rebound", 1.6),
    ("rebounds", 1.6),
    ("upgrade", 1.8),
    ("upgraded", 1.8),
    ("dividend", 1.0),
    ("growth", 1.6),
    ("growing", 1.4),
    ("strong", 1.7),
    ("stronger", 1.8),
    ("strength", 1.6),
    ("boom", 2.0),
    ("booming", 2.2),
    ("moon", 1.9),
    ("undervalued", 1.3),
    ("opportunity", 1.6),
    ("stable", 1.2),
    ("support", 1.2),
    ("optimistic", 2.0),
    ("optimism", 2.0),
    ("confident", 2.2),
    ("confidence", 2.0),
    // general
    ("good", 1.9),
    ("great", 3.1),
    ("excellent", 3.2),
    ("amazing", 2.8),
    ("awesome", 3.1),
    ("fantastic", 2.6),
    ("best", 3.2),
    ("better", 1.9),
    ("love", 3.2),
    ("like", 1.5),
    ("happy", 2.7),
    ("glad", 2.0),
    ("nice", 1.8),
    ("win", 2.8),
    ("winner", 2.8),
    ("winning", 2.4),
    ("success", 2.7),
    ("successful", 2.8),
    ("positive", 2.6),
    ("impressive", 2.3),
    ("solid", 1.4),
    ("safe", 1.9),
    ("hope", 1.9),
    ("hopeful", 2.3),
    ("thanks", 1.9),
    ("wow", 2.8),
    ("yes", 1.7),
];

const NEGATIVE: &[(&str, f64)] = &[
    // markets
    ("bear", -1.2),
    ("bearish", -2.4),
    ("crash", -2.6),
    ("crashes", -2.6),
    ("crashed", -2.7),
    ("crashing", -2.7),
    ("plunge", -2.4),
    ("plunges", -2.4),
    ("plunged", -2.5),
    ("tumble", -2.0),
    ("tumbles", -2.0),
    ("slump", -2.1),
    ("slumps", -2.1),
    ("fall", -1.3),
    ("falls", -1.3),
    ("falling", -1.5),
    ("fell", -1.3),
    ("drop", -1.2),
    ("drops", -1.2),
    ("dropped", -1.3),
    ("decline", -1.5),
    ("declines", -1.5),
    ("loss", -1.9),
    ("losses", -2.0),
    ("lose", -1.8),
    ("losing", -1.8),
    ("lost", -1.6),
    ("sell", -0.8),
    ("selloff", -2.3),
    ("downtrend", -1.8),
    ("downside", -1.4),
    ("downgrade", -1.9),
    ("downgraded", -1.9),
    ("red", -0.9),
    ("weak", -1.7),
    ("weaker", -1.8),
    ("weakness", -1.8),
    ("recession", -2.5),
    ("inflation", -1.1),
    ("default", -2.0),
    ("bankrupt", -3.0),
    ("bankruptcy", -3.0),
    ("bubble", -1.5),
    ("overvalued", -1.4),
    ("volatile", -1.1),
    ("volatility", -0.9),
    ("risk", -1.1),
    ("risky", -1.4),
    ("fear", -2.2),
    ("fears", -2.2),
    ("panic", -2.6),
    ("uncertainty", -1.4),
    ("warning", -1.4),
    ("fraud", -3.0),
    ("scam", -3.0),
    ("manipulation", -2.1),
    ("dump", -1.6),
    ("dumping", -1.8),
    ("collapse", -2.8),
    ("collapsed", -2.8),
    ("rekt", -2.5),
    ("pessimistic", -2.0),
    // general
    ("bad", -2.5),
    ("worse", -2.1),
    ("worst", -3.1),
    ("terrible", -2.5),
    ("horrible", -2.5),
    ("awful", -2.0),
    ("hate", -2.7),
    ("sad", -2.1),
    ("angry", -2.3),
    ("worried", -1.9),
    ("worry", -1.9),
    ("problem", -1.7),
    ("problems", -1.7),
    ("trouble", -1.7),
    ("fail", -2.5),
    ("failed", -2.3),
    ("failure", -2.3),
    ("disaster", -3.1),
    ("ugly", -2.3),
    ("no", -1.2),
];

/// Intensifiers (positive) and dampeners (negative).
const BOOSTERS: &[(&str, f64)] = &[
    ("very", 0.293),
    ("really", 0.293),
    ("extremely", 0.293),
    ("incredibly", 0.293),
    ("hugely", 0.293),
    ("highly", 0.293),
    ("totally", 0.293),
    ("absolutely", 0.293),
    ("completely", 0.293),
    ("massively", 0.293),
    ("so", 0.293),
    ("super", 0.293),
    ("most", 0.293),
    ("more", 0.293),
    ("slightly", -0.293),
    ("somewhat", -0.293),
    ("barely", -0.293),
    ("marginally", -0.293),
    ("little", -0.293),
    ("kinda", -0.293),
    ("partly", -0.293),
    ("less", -0.293),
];

const NEGATIONS: &[&str] = &[
    "not", "no", "never", "none", "nobody", "nothing", "neither", "nor", "nowhere", "cannot",
    "without", "aint", "dont", "doesnt", "didnt", "isnt", "wasnt", "arent", "werent", "wont",
    "cant", "couldnt", "shouldnt", "wouldnt", "hasnt", "havent", "hadnt",
];

/// Word valences, boosters and negations.
#[derive(Debug, Clone)]
pub struct SentimentLexicon {
    valences: HashMap<String, f64>,
    boosters: HashMap<String, f64>,
    negations: HashSet<String>,
}

impl SentimentLexicon {
    /// Build the built-in lexicon.
    pub fn new() -> Self {
        let valences = POSITIVE
            .iter()
            .chain(NEGATIVE.iter())
            .map(|(w, v)| (w.to_string(), *v))
            .collect();
        let boosters = BOOSTERS.iter().map(|(w, v)| (w.to_string(), *v)).collect();
        let negations = NEGATIONS.iter().map(|w| w.to_string()).collect();
        Self {
            valences,
            boosters,
            negations,
        }
    }

    /// Add or override a word valence.
    pub fn with_word(mut self, word: &str, valence: f64) -> Self {
        self.valences.insert(word.to_lowercase(), valence);
        self
    }

    /// Valence of a lower-cased word.
    pub fn valence(&self, word: &str) -> Option<f64> {
        self.valences.get(word).copied()
    }

    /// Booster increment of a lower-cased word.
    pub fn booster(&self, word: &str) -> Option<f64> {
        self.boosters.get(word).copied()
    }

    /// Whether a lower-cased word negates what follows.
    pub fn is_negation(&self, word: &str) -> bool {
        self.negations.contains(word) || word.ends_with("n't")
    }

    /// Number of words with a valence.
    pub fn len(&self) -> usize {
        self.valences.len()
    }

    /// Whether the lexicon has no valence words.
    pub fn is_empty(&self) -> bool {
        self.valences.is_empty()
    }
}

impl Default for SentimentLexicon {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let lex = SentimentLexicon::new();
        assert!(lex.valence("bullish").unwrap() > 0.0);
        assert!(lex.valence("crash").unwrap() < 0.0);
        assert!(lex.valence("table").is_none());
        assert!(lex.booster("very").unwrap() > 0.0);
        assert!(lex.booster("slightly").unwrap() < 0.0);
    }

    #[test]
    fn test_negations() {
        let lex = SentimentLexicon::new();
        assert!(lex.is_negation("not"));
        assert!(lex.is_negation("isn't"));
        assert!(!lex.is_negation("note"));
    }

    #[test]
    fn test_override() {
        let lex = SentimentLexicon::new().with_word("HODL", 1.5);
        assert_eq!(lex.valence("hodl"), Some(1.5));
    }
}
