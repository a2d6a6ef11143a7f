//! Daily alignment of price series with aggregated news sentiment.
//!
//! Both axes are reduced to calendar dates. News instants are read in one
//! canonical timezone; date-only price bars keep their own date. Each price
//! series is forward-filled across every calendar day between its
//! first and last observation; news scores are averaged per day; the two are
//! inner-joined on date.

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Timelike, Utc};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::risk::{pearson, MetricResult};
use sentiquant_core::domain::{AnnotatedNews, DerivedColumn, EntityId, PriceSeries};
use sentiquant_core::indicators::{cumulative_returns, pct_change};
use sentiquant_core::sentiment::{mean_score, SentimentClass};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignConfig {
    /// Offset of the canonical timezone from UTC, in minutes.
    pub utc_offset_minutes: i32,
}

impl AlignConfig {
    pub fn offset(&self) -> Option<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_minutes.checked_mul(60)?)
    }
}

/// One day on which both a (possibly forward-filled) price and news exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedRecord {
    pub date: NaiveDate,
    pub close: f64,
    /// None on the first price date.
    pub returns: Option<f64>,
    pub cumulative_returns: Option<f64>,
    pub aggregated_sentiment: f64,
    pub sentiment_class: SentimentClass,
    pub news_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedSeries {
    pub entity_id: EntityId,
    pub records: Vec<AlignedRecord>,
}

impl AlignedSeries {
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.records.iter().map(|r| r.date).collect()
    }

    /// Pearson correlation of daily returns against aggregated sentiment.
    /// Days without a return are skipped.
    pub fn sentiment_return_correlation(&self) -> f64 {
        let (returns, sentiment): (Vec<f64>, Vec<f64>) = self
            .records
            .iter()
            .filter_map(|r| r.returns.map(|ret| (ret, r.aggregated_sentiment)))
            .unzip();
        pearson(&returns, &sentiment)
    }

    /// Table form for plotting collaborators.
    pub fn to_frame(&self) -> PolarsResult<DataFrame> {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default();
        let days: Vec<i32> = self
            .records
            .iter()
            .map(|r| (r.date - epoch).num_days() as i32)
            .collect();
        let close: Vec<f64> = self.records.iter().map(|r| r.close).collect();
        let returns: Vec<Option<f64>> = self.records.iter().map(|r| r.returns).collect();
        let cumulative: Vec<Option<f64>> =
            self.records.iter().map(|r| r.cumulative_returns).collect();
        let sentiment: Vec<f64> = self
            .records
            .iter()
            .map(|r| r.aggregated_sentiment)
            .collect();
        let class: Vec<&str> = self
            .records
            .iter()
            .map(|r| r.sentiment_class.label())
            .collect();
        let counts: Vec<u32> = self.records.iter().map(|r| r.news_count as u32).collect();

        DataFrame::new(vec![
            Column::new("date".into(), days).cast(&DataType::Date)?,
            Column::new("Close".into(), close),
            Column::new("Returns".into(), returns),
            Column::new("Cumulative Returns".into(), cumulative),
            Column::new("sentiment".into(), sentiment),
            Column::new("sentiment_class".into(), class),
            Column::new("news_count".into(), counts),
        ])
    }
}

/// Aligned tables per entity. Entities with an empty join are absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Alignment(BTreeMap<EntityId, AlignedSeries>);

impl Alignment {
    pub fn get(&self, entity: &EntityId) -> Option<&AlignedSeries> {
        self.0.get(entity)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EntityId, &AlignedSeries)> {
        self.0.iter()
    }

    pub fn entities(&self) -> impl Iterator<Item = &EntityId> {
        self.0.keys()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> BTreeMap<EntityId, AlignedSeries> {
        self.0
    }
}

impl FromIterator<AlignedSeries> for Alignment {
    fn from_iter<I: IntoIterator<Item = AlignedSeries>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|s| (s.entity_id.clone(), s))
                .collect(),
        )
    }
}

/// Correlation of daily returns with aggregated sentiment, per entity.
pub fn sentiment_return_correlation(alignment: &Alignment) -> MetricResult {
    alignment
        .iter()
        .map(|(id, series)| (id.clone(), series.sentiment_return_correlation()))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct DailyPrice {
    close: f64,
    returns: Option<f64>,
    cumulative_returns: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct Aligner {
    offset: FixedOffset,
}

impl Default for Aligner {
    fn default() -> Self {
        Self::new(&AlignConfig::default())
    }
}

impl Aligner {
    /// An out-of-range offset falls back to UTC.
    pub fn new(config: &AlignConfig) -> Self {
        let offset = config.offset().unwrap_or_else(|| {
            warn!(
                utc_offset_minutes = config.utc_offset_minutes,
                "timezone offset out of range, aligning in UTC"
            );
            Utc.fix()
        });
        Self { offset }
    }

    /// `ts` in the canonical timezone.
    pub fn localize(&self, ts: DateTime<Utc>) -> DateTime<FixedOffset> {
        ts.with_timezone(&self.offset)
    }

    pub fn local_date(&self, ts: DateTime<Utc>) -> NaiveDate {
        self.localize(ts).date_naive()
    }

    /// Session date of a price bar. A bar stamped at midnight UTC carries a
    /// bare date and keeps it; only bars with a time of day are shifted into
    /// the canonical timezone.
    pub fn bar_date(&self, ts: DateTime<Utc>) -> NaiveDate {
        if ts.num_seconds_from_midnight() == 0 && ts.nanosecond() == 0 {
            ts.date_naive()
        } else {
            self.local_date(ts)
        }
    }

    pub fn align<'a>(
        &self,
        prices: impl IntoIterator<Item = &'a PriceSeries>,
        news: &[AnnotatedNews],
    ) -> Alignment {
        prices
            .into_iter()
            .filter_map(|series| {
                let aligned = self.align_one(series, news);
                if aligned.records.is_empty() {
                    warn!(entity = %series.entity_id(), "no overlapping price and news dates");
                    None
                } else {
                    Some(aligned)
                }
            })
            .collect()
    }

    pub fn align_one(&self, series: &PriceSeries, news: &[AnnotatedNews]) -> AlignedSeries {
        let daily_prices = self.daily_prices(series);

        let mut daily_news: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
        for item in news.iter().filter(|n| n.record.concerns(series.entity_id())) {
            daily_news
                .entry(self.local_date(item.record.timestamp))
                .or_default()
                .push(item.sentiment_score);
        }

        let records: Vec<AlignedRecord> = daily_news
            .into_iter()
            .filter_map(|(date, scores)| {
                let price = daily_prices.get(&date)?;
                let news_count = scores.len();
                let aggregated = mean_score(scores)?;
                Some(AlignedRecord {
                    date,
                    close: price.close,
                    returns: price.returns,
                    cumulative_returns: price.cumulative_returns,
                    aggregated_sentiment: aggregated,
                    sentiment_class: SentimentClass::from_score(aggregated),
                    news_count,
                })
            })
            .collect();

        debug!(
            entity = %series.entity_id(),
            price_days = daily_prices.len(),
            aligned = records.len(),
            "aligned price and sentiment"
        );

        AlignedSeries {
            entity_id: series.entity_id().clone(),
            records,
        }
    }

    /// Daily closes from the first to the last price date, forward-filled.
    /// Several observations on one date: the last wins.
    fn daily_prices(&self, series: &PriceSeries) -> BTreeMap<NaiveDate, DailyPrice> {
        let closes = series.closes();
        let returns: Vec<Option<f64>> = match series.column(DerivedColumn::Returns) {
            Some(values) => values.to_vec(),
            None => pct_change(&closes),
        };
        let cumulative: Vec<Option<f64>> = match series.column(DerivedColumn::CumulativeReturns) {
            Some(values) => values.to_vec(),
            None => cumulative_returns(&returns),
        };

        let mut observed: BTreeMap<NaiveDate, DailyPrice> = BTreeMap::new();
        for (i, record) in series.records().iter().enumerate() {
            observed.insert(
                self.bar_date(record.timestamp),
                DailyPrice {
                    close: record.close,
                    returns: returns[i],
                    cumulative_returns: cumulative[i],
                },
            );
        }

        let (Some(&first), Some(&last)) = (observed.keys().next(), observed.keys().next_back())
        else {
            return observed;
        };

        let mut filled = BTreeMap::new();
        let mut carry: Option<DailyPrice> = None;
        for date in first.iter_days().take_while(|d| *d <= last) {
            if let Some(price) = observed.get(&date) {
                carry = Some(*price);
            }
            if let Some(price) = carry {
                filled.insert(date, price);
            }
        }
        filled
    }
}
