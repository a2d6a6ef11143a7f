//! News records and their sentiment annotation.

use super::ids::EntityId;
use crate::sentiment::SentimentClass;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One cleaned news headline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsRecord {
    pub headline: String,
    pub publisher: Option<String>,
    pub timestamp: DateTime<Utc>,
    /// Ticker the headline was filed under, when the feed provides one.
    pub entity_id: Option<EntityId>,
    pub url: Option<String>,
}

impl NewsRecord {
    /// Whether this headline is relevant to `entity`. Untagged news applies
    /// to every entity.
    pub fn concerns(&self, entity: &EntityId) -> bool {
        self.entity_id.as_ref().map_or(true, |tag| tag == entity)
    }
}

/// A news record with its sentiment score and class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedNews {
    pub record: NewsRecord,
    /// Polarity in `[-1, 1]`.
    pub sentiment_score: f64,
    pub sentiment_class: SentimentClass,
}
