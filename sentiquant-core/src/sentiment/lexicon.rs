//! Lexicon-based headline scorer.

use std::collections::HashMap;

/// Produces a polarity in `[-1, 1]` for a piece of text.
pub trait SentimentScorer: Send + Sync {
    fn score(&self, text: &str) -> f64;
}

/// Normalization constant for `s / sqrt(s^2 + ALPHA)`.
const ALPHA: f64 = 15.0;

/// Finance-flavoured word weights on a -4..4 scale.
const DEFAULT_LEXICON: &[(&str, f64)] = &[
    // positive
    ("beat", 1.8),
    ("beats", 1.8),
    ("bullish", 2.4),
    ("boost", 1.6),
    ("boosts", 1.6),
    ("breakthrough", 2.2),
    ("buy", 1.2),
    ("climb", 1.4),
    ("climbs", 1.4),
    ("excellent", 2.7),
    ("gain", 1.6),
    ("gains", 1.6),
    ("good", 1.9),
    ("great", 2.6),
    ("growth", 1.8),
    ("high", 0.8),
    ("highs", 0.8),
    ("improve", 1.6),
    ("improves", 1.6),
    ("jump", 1.5),
    ("jumps", 1.5),
    ("outperform", 1.8),
    ("profit", 1.8),
    ("profitable", 2.0),
    ("rally", 2.0),
    ("rallies", 2.0),
    ("record", 1.2),
    ("rise", 1.4),
    ("rises", 1.4),
    ("soar", 2.4),
    ("soars", 2.4),
    ("strong", 1.8),
    ("success", 2.3),
    ("surge", 2.2),
    ("surges", 2.2),
    ("upgrade", 1.9),
    ("upgrades", 1.9),
    ("win", 2.0),
    ("wins", 2.0),
    // negative
    ("bad", -2.5),
    ("bankruptcy", -3.2),
    ("bearish", -2.4),
    ("concern", -1.4),
    ("concerns", -1.4),
    ("crash", -3.0),
    ("crashes", -3.0),
    ("crisis", -3.1),
    ("cut", -1.3),
    ("cuts", -1.3),
    ("decline", -1.6),
    ("declines", -1.6),
    ("default", -2.2),
    ("downgrade", -2.0),
    ("downgrades", -2.0),
    ("drop", -1.5),
    ("drops", -1.5),
    ("fall", -1.5),
    ("falls", -1.5),
    ("fear", -2.2),
    ("fears", -2.2),
    ("fraud", -3.3),
    ("lawsuit", -2.2),
    ("layoffs", -2.3),
    ("loss", -2.0),
    ("losses", -2.0),
    ("low", -0.8),
    ("lows", -0.8),
    ("miss", -1.6),
    ("misses", -1.6),
    ("panic", -2.8),
    ("plunge", -2.9),
    ("plunges", -2.9),
    ("risk", -1.1),
    ("scandal", -3.0),
    ("sell", -1.2),
    ("slump", -2.3),
    ("slumps", -2.3),
    ("terrible", -3.0),
    ("tumble", -2.2),
    ("tumbles", -2.2),
    ("underperform", -1.8),
    ("warning", -1.9),
    ("weak", -1.8),
    ("worst", -3.1),
];

const NEGATORS: &[&str] = &["not", "no", "never", "without", "nor", "neither"];

#[derive(Debug, Clone)]
pub struct LexiconScorer {
    words: HashMap<String, f64>,
}

impl LexiconScorer {
    pub fn new() -> Self {
        Self::from_words(
            DEFAULT_LEXICON
                .iter()
                .map(|(word, weight)| (word.to_string(), *weight)),
        )
    }

    /// Scorer over a custom lexicon. Keys are matched lowercase.
    pub fn from_words(words: impl IntoIterator<Item = (String, f64)>) -> Self {
        Self {
            words: words
                .into_iter()
                .map(|(w, s)| (w.to_lowercase(), s))
                .collect(),
        }
    }

    /// Add or replace a word weight.
    pub fn with_word(mut self, word: &str, weight: f64) -> Self {
        self.words.insert(word.to_lowercase(), weight);
        self
    }

    /// Sum of lexicon weights before normalization. A negator flips the sign
    /// of the next lexicon hit.
    pub fn raw_score(&self, text: &str) -> f64 {
        let lower = text.to_lowercase();
        let mut total = 0.0;
        let mut negate = false;

        for token in lower.split_whitespace() {
            let word = token.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'');
            if NEGATORS.contains(&word) || word.ends_with("n't") {
                negate = true;
                continue;
            }
            let word = word.trim_matches('\'');
            if let Some(&weight) = self.words.get(word) {
                total += if negate { -weight } else { weight };
                negate = false;
            }
        }
        total
    }
}

impl Default for LexiconScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl SentimentScorer for LexiconScorer {
    fn score(&self, text: &str) -> f64 {
        let s = self.raw_score(text);
        if s == 0.0 {
            return 0.0;
        }
        (s / (s * s + ALPHA).sqrt()).clamp(-1.0, 1.0)
    }
}
