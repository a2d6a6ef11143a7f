//! Record schemas: which fields a raw table must carry and how a typed row
//! becomes a record.
//!
//! One `RecordSchema` impl per record kind. `Schema` only selects which impl
//! the normalizer runs; dispatch below it is static.

use crate::data::normalize::NormalizeReport;
use crate::domain::{EntityId, NewsRecord, PriceRecord, PriceSeries};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("missing required field: {field}")]
    MissingField { field: String },
}

/// A row whose timestamp parsed and whose numeric/text fields were coerced.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedRow {
    pub timestamp: DateTime<Utc>,
    pub(crate) numbers: BTreeMap<&'static str, Option<f64>>,
    pub(crate) texts: BTreeMap<&'static str, Option<String>>,
}

impl TypedRow {
    /// Coerced numeric value, `None` if absent or not a finite number.
    pub fn number(&self, field: &str) -> Option<f64> {
        self.numbers.get(field).copied().flatten()
    }

    /// Trimmed text value, `None` if absent, null, or empty after trimming.
    pub fn text(&self, field: &str) -> Option<&str> {
        self.texts
            .get(field)
            .and_then(|v| v.as_deref())
            .filter(|s| !s.is_empty())
    }
}

/// Field layout and row construction for one record kind.
pub trait RecordSchema {
    type Record;
    type Output;

    /// Accepted names for the timestamp field, in preference order.
    fn timestamp_fields(&self) -> &'static [&'static str];

    /// Required fields other than the timestamp.
    fn required_fields(&self) -> &'static [&'static str];

    /// Fields coerced to numbers (required ones included).
    fn numeric_fields(&self) -> &'static [&'static str];

    /// Fields trimmed as text (required ones included).
    fn text_fields(&self) -> &'static [&'static str];

    /// Build a record; `None` drops the row.
    fn build(&self, row: &TypedRow) -> Option<Self::Record>;

    /// Assemble the surviving records and enforce collection invariants.
    fn finish(&self, records: Vec<Self::Record>, report: &mut NormalizeReport) -> Self::Output;
}

pub const PRICE_TIMESTAMP_FIELDS: &[&str] = &["Date", "timestamp"];
pub const PRICE_REQUIRED_FIELDS: &[&str] = &["Open", "High", "Low", "Close", "Volume"];
pub const PRICE_NUMERIC_FIELDS: &[&str] = &["Open", "High", "Low", "Close", "Volume", "Adj Close"];

pub const NEWS_TIMESTAMP_FIELDS: &[&str] = &["date", "timestamp"];
pub const NEWS_REQUIRED_FIELDS: &[&str] = &["headline"];
pub const NEWS_TEXT_FIELDS: &[&str] = &["headline", "publisher", "url", "stock"];

/// Daily OHLCV rows for one externally labelled entity.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSchema {
    pub entity_id: EntityId,
}

impl PriceSchema {
    pub fn new(entity_id: impl Into<EntityId>) -> Self {
        Self {
            entity_id: entity_id.into(),
        }
    }
}

impl RecordSchema for PriceSchema {
    type Record = PriceRecord;
    type Output = PriceSeries;

    fn timestamp_fields(&self) -> &'static [&'static str] {
        PRICE_TIMESTAMP_FIELDS
    }

    fn required_fields(&self) -> &'static [&'static str] {
        PRICE_REQUIRED_FIELDS
    }

    fn numeric_fields(&self) -> &'static [&'static str] {
        PRICE_NUMERIC_FIELDS
    }

    fn text_fields(&self) -> &'static [&'static str] {
        &[]
    }

    fn build(&self, row: &TypedRow) -> Option<PriceRecord> {
        Some(PriceRecord {
            entity_id: self.entity_id.clone(),
            timestamp: row.timestamp,
            open: row.number("Open")?,
            high: row.number("High")?,
            low: row.number("Low")?,
            close: row.number("Close")?,
            volume: row.number("Volume")?,
            adj_close: row.number("Adj Close"),
        })
    }

    fn finish(&self, records: Vec<PriceRecord>, report: &mut NormalizeReport) -> PriceSeries {
        let before = records.len();
        let records: Vec<PriceRecord> = records.into_iter().filter(|r| r.close > 0.0).collect();
        report.non_positive_close += before - records.len();

        let kept = records.len();
        let series = PriceSeries::new(self.entity_id.clone(), records);
        report.duplicate_timestamps += kept - series.len();
        series
    }
}

/// Free-text headlines from a news feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NewsSchema;

impl RecordSchema for NewsSchema {
    type Record = NewsRecord;
    type Output = Vec<NewsRecord>;

    fn timestamp_fields(&self) -> &'static [&'static str] {
        NEWS_TIMESTAMP_FIELDS
    }

    fn required_fields(&self) -> &'static [&'static str] {
        NEWS_REQUIRED_FIELDS
    }

    fn numeric_fields(&self) -> &'static [&'static str] {
        &[]
    }

    fn text_fields(&self) -> &'static [&'static str] {
        NEWS_TEXT_FIELDS
    }

    fn build(&self, row: &TypedRow) -> Option<NewsRecord> {
        // A required text field is non-null here but may be blank after trimming.
        let headline = row
            .texts
            .get("headline")
            .cloned()
            .flatten()
            .unwrap_or_default();
        Some(NewsRecord {
            headline,
            publisher: row.text("publisher").map(str::to_string),
            timestamp: row.timestamp,
            entity_id: row.text("stock").map(EntityId::from),
            url: row.text("url").map(str::to_string),
        })
    }

    fn finish(&self, records: Vec<NewsRecord>, _report: &mut NormalizeReport) -> Vec<NewsRecord> {
        records
    }
}

/// Which record kind a raw table holds.
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    Price(EntityId),
    News,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn typed(numbers: &[(&'static str, Option<f64>)], texts: &[(&'static str, Option<&str>)]) -> TypedRow {
        TypedRow {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
            numbers: numbers.iter().copied().collect(),
            texts: texts
                .iter()
                .map(|(k, v)| (*k, v.map(str::to_string)))
                .collect(),
        }
    }

    #[test]
    fn price_build_requires_every_ohlcv_field() {
        let schema = PriceSchema::new("AAPL");
        let full = typed(
            &[
                ("Open", Some(1.0)),
                ("High", Some(2.0)),
                ("Low", Some(0.5)),
                ("Close", Some(1.5)),
                ("Volume", Some(10.0)),
                ("Adj Close", None),
            ],
            &[],
        );
        let record = schema.build(&full).unwrap();
        assert_eq!(record.close, 1.5);
        assert_eq!(record.adj_close, None);

        let missing_close = typed(
            &[
                ("Open", Some(1.0)),
                ("High", Some(2.0)),
                ("Low", Some(0.5)),
                ("Close", None),
                ("Volume", Some(10.0)),
            ],
            &[],
        );
        assert!(schema.build(&missing_close).is_none());
    }

    #[test]
    fn news_build_maps_optional_fields() {
        let row = typed(
            &[],
            &[
                ("headline", Some("Apple beats estimates")),
                ("publisher", Some("")),
                ("stock", Some("AAPL")),
            ],
        );
        let record = NewsSchema.build(&row).unwrap();
        assert_eq!(record.headline, "Apple beats estimates");
        assert_eq!(record.publisher, None);
        assert_eq!(record.entity_id, Some(EntityId::from("AAPL")));
    }

    #[test]
    fn schema_error_names_the_field() {
        let err = SchemaError::MissingField {
            field: "Close".into(),
        };
        assert_eq!(err.to_string(), "missing required field: Close");
    }
}
