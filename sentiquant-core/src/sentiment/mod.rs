//! Headline sentiment scoring and classification.

pub mod classifier;
pub mod lexicon;

pub use classifier::{mean_score, Sentiment, SentimentClass, SentimentClassifier};
pub use lexicon::{LexiconScorer, SentimentScorer};
