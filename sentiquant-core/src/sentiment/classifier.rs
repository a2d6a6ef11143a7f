//! Score-to-class mapping shared by news annotation and daily aggregation.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::lexicon::{LexiconScorer, SentimentScorer};
use crate::domain::{AnnotatedNews, NewsRecord};

/// Discrete sentiment class.
///
/// Thresholds are asymmetric: a score of exactly 0.0 is `Negative`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentClass {
    Positive,
    Neutral,
    Negative,
    StrongNegative,
}

impl SentimentClass {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.5 {
            SentimentClass::Positive
        } else if score >= 0.05 {
            SentimentClass::Neutral
        } else if score > -0.5 {
            SentimentClass::Negative
        } else {
            SentimentClass::StrongNegative
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SentimentClass::Positive => "positive",
            SentimentClass::Neutral => "neutral",
            SentimentClass::Negative => "negative",
            SentimentClass::StrongNegative => "strong_negative",
        }
    }
}

impl fmt::Display for SentimentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sentiment {
    pub score: f64,
    pub class: SentimentClass,
}

impl Sentiment {
    /// Clamp `score` into `[-1, 1]` and classify it. Non-finite scores count
    /// as zero.
    pub fn from_score(score: f64) -> Self {
        let score = if score.is_finite() {
            score.clamp(-1.0, 1.0)
        } else {
            0.0
        };
        Self {
            score,
            class: SentimentClass::from_score(score),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SentimentClassifier<S = LexiconScorer> {
    scorer: S,
}

impl<S: SentimentScorer> SentimentClassifier<S> {
    pub fn new(scorer: S) -> Self {
        Self { scorer }
    }

    pub fn scorer(&self) -> &S {
        &self.scorer
    }

    pub fn classify(&self, text: &str) -> Sentiment {
        Sentiment::from_score(self.scorer.score(text))
    }

    pub fn annotate(&self, news: &[NewsRecord]) -> Vec<AnnotatedNews> {
        news.iter()
            .map(|record| {
                let sentiment = self.classify(&record.headline);
                AnnotatedNews {
                    record: record.clone(),
                    sentiment_score: sentiment.score,
                    sentiment_class: sentiment.class,
                }
            })
            .collect()
    }
}

/// Mean of a group of scores, `None` for an empty group.
pub fn mean_score(scores: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, count) = scores
        .into_iter()
        .fold((0.0, 0usize), |(sum, n), s| (sum + s, n + 1));
    (count > 0).then(|| sum / count as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    struct Fixed(f64);

    impl SentimentScorer for Fixed {
        fn score(&self, _text: &str) -> f64 {
            self.0
        }
    }

    #[test]
    fn class_boundaries() {
        assert_eq!(SentimentClass::from_score(0.5), SentimentClass::Positive);
        assert_eq!(SentimentClass::from_score(0.05), SentimentClass::Neutral);
        assert_eq!(
            SentimentClass::from_score(0.05 - 1e-9),
            SentimentClass::Negative
        );
        assert_eq!(SentimentClass::from_score(0.0), SentimentClass::Negative);
        assert_eq!(
            SentimentClass::from_score(-0.5 + 1e-9),
            SentimentClass::Negative
        );
        assert_eq!(
            SentimentClass::from_score(-0.5),
            SentimentClass::StrongNegative
        );
    }

    #[test]
    fn class_labels_serialize_snake_case() {
        let json = serde_json::to_string(&SentimentClass::StrongNegative).unwrap();
        assert_eq!(json, "\"strong_negative\"");
        assert_eq!(SentimentClass::Positive.to_string(), "positive");
    }

    #[test]
    fn out_of_range_scores_are_clamped() {
        let c = SentimentClassifier::new(Fixed(3.0));
        assert_eq!(c.classify("x").score, 1.0);
        let c = SentimentClassifier::new(Fixed(f64::NAN));
        assert_eq!(c.classify("x").score, 0.0);
    }

    #[test]
    fn annotate_keeps_records_and_order() {
        let ts = Utc.with_ymd_and_hms(2020, 6, 1, 9, 0, 0).unwrap();
        let news: Vec<NewsRecord> = ["Shares surge", "Shares plunge after fraud"]
            .iter()
            .map(|h| NewsRecord {
                headline: h.to_string(),
                publisher: None,
                timestamp: ts,
                entity_id: None,
                url: None,
            })
            .collect();
        let annotated = SentimentClassifier::<LexiconScorer>::default().annotate(&news);
        assert_eq!(annotated.len(), 2);
        assert_eq!(annotated[0].record, news[0]);
        assert!(annotated[0].sentiment_score > 0.0);
        assert_eq!(annotated[1].sentiment_class, SentimentClass::StrongNegative);
    }

    #[test]
    fn mean_of_scores() {
        assert_eq!(mean_score([]), None);
        assert_eq!(mean_score([0.2, 0.4]), Some(0.30000000000000004));
    }
}
