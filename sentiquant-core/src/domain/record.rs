//! Sum types over the two record kinds the normalizer produces.

use super::news::NewsRecord;
use super::price::{PriceRecord, PriceSeries};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single cleaned record of either kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Record {
    Price(PriceRecord),
    News(NewsRecord),
}

impl Record {
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Record::Price(p) => p.timestamp,
            Record::News(n) => n.timestamp,
        }
    }
}

/// Output of normalizing one raw table.
#[derive(Debug, Clone, PartialEq)]
pub enum CleanSeries {
    Price(PriceSeries),
    News(Vec<NewsRecord>),
}

impl CleanSeries {
    pub fn len(&self) -> usize {
        match self {
            CleanSeries::Price(s) => s.len(),
            CleanSeries::News(n) => n.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_price(self) -> Option<PriceSeries> {
        match self {
            CleanSeries::Price(s) => Some(s),
            CleanSeries::News(_) => None,
        }
    }

    pub fn into_news(self) -> Option<Vec<NewsRecord>> {
        match self {
            CleanSeries::News(n) => Some(n),
            CleanSeries::Price(_) => None,
        }
    }

    /// Flatten into individual records.
    pub fn into_records(self) -> Vec<Record> {
        match self {
            CleanSeries::Price(s) => s.records().iter().cloned().map(Record::Price).collect(),
            CleanSeries::News(n) => n.into_iter().map(Record::News).collect(),
        }
    }
}
