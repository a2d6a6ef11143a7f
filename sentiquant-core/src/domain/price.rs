//! Price records and the per-entity price series.

use super::ids::EntityId;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// One cleaned daily OHLCV observation.
///
/// Invariants after normalization: `close > 0`, all prices finite, and at most
/// one record per `(entity_id, timestamp)` within a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub entity_id: EntityId,
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub adj_close: Option<f64>,
}

impl PriceRecord {
    /// Calendar date of the observation in UTC.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
}

/// Columns appended to a series by the pipeline stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DerivedColumn {
    MovingAverage,
    Rsi,
    Macd,
    MacdSignal,
    MacdHistogram,
    Returns,
    CumulativeReturns,
}

impl DerivedColumn {
    pub const ALL: [DerivedColumn; 7] = [
        DerivedColumn::MovingAverage,
        DerivedColumn::Rsi,
        DerivedColumn::Macd,
        DerivedColumn::MacdSignal,
        DerivedColumn::MacdHistogram,
        DerivedColumn::Returns,
        DerivedColumn::CumulativeReturns,
    ];

    /// Column label as read by the dashboard collaborator.
    pub fn label(&self) -> &'static str {
        match self {
            DerivedColumn::MovingAverage => "MA",
            DerivedColumn::Rsi => "RSI",
            DerivedColumn::Macd => "MACD",
            DerivedColumn::MacdSignal => "MACD_signal",
            DerivedColumn::MacdHistogram => "MACD_hist",
            DerivedColumn::Returns => "Returns",
            DerivedColumn::CumulativeReturns => "Cumulative Returns",
        }
    }
}

impl fmt::Display for DerivedColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum SeriesError {
    #[error("column '{0}' is already present and derived columns are append-only")]
    ColumnExists(DerivedColumn),

    #[error("column '{column}' has {actual} values but the series has {expected} rows")]
    LengthMismatch {
        column: DerivedColumn,
        expected: usize,
        actual: usize,
    },
}

/// Ordered price history for a single entity plus its derived columns.
///
/// Records are fixed at construction. Derived columns are appended once each
/// and never overwritten; `None` marks a row where the column is undefined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    entity_id: EntityId,
    records: Vec<PriceRecord>,
    columns: BTreeMap<DerivedColumn, Vec<Option<f64>>>,
}

impl PriceSeries {
    /// Build a series, sorting by timestamp (stable) and keeping the first
    /// record of any repeated timestamp.
    pub fn new(entity_id: EntityId, mut records: Vec<PriceRecord>) -> Self {
        records.sort_by_key(|r| r.timestamp);
        records.dedup_by(|later, earlier| later.timestamp == earlier.timestamp);
        Self {
            entity_id,
            records,
            columns: BTreeMap::new(),
        }
    }

    pub fn entity_id(&self) -> &EntityId {
        &self.entity_id
    }

    pub fn records(&self) -> &[PriceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.close).collect()
    }

    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        self.records.iter().map(|r| r.timestamp).collect()
    }

    pub fn column(&self, column: DerivedColumn) -> Option<&[Option<f64>]> {
        self.columns.get(&column).map(|v| v.as_slice())
    }

    pub fn has_column(&self, column: DerivedColumn) -> bool {
        self.columns.contains_key(&column)
    }

    /// Derived columns in their canonical order.
    pub fn columns(&self) -> impl Iterator<Item = (DerivedColumn, &[Option<f64>])> {
        self.columns.iter().map(|(c, v)| (*c, v.as_slice()))
    }

    /// Append a derived column. Fails if the column already exists or its
    /// length differs from the number of records.
    pub fn append_column(
        &mut self,
        column: DerivedColumn,
        values: Vec<Option<f64>>,
    ) -> Result<(), SeriesError> {
        if self.columns.contains_key(&column) {
            return Err(SeriesError::ColumnExists(column));
        }
        if values.len() != self.records.len() {
            return Err(SeriesError::LengthMismatch {
                column,
                expected: self.records.len(),
                actual: values.len(),
            });
        }
        self.columns.insert(column, values);
        Ok(())
    }

    /// New series restricted to records whose UTC date lies in `[start, end]`.
    /// Derived columns are sliced along with the records.
    pub fn between(&self, start: NaiveDate, end: NaiveDate) -> PriceSeries {
        let keep: Vec<bool> = self
            .records
            .iter()
            .map(|r| (start..=end).contains(&r.date()))
            .collect();

        let records = self
            .records
            .iter()
            .zip(&keep)
            .filter(|(_, k)| **k)
            .map(|(r, _)| r.clone())
            .collect();

        let columns = self
            .columns
            .iter()
            .map(|(c, values)| {
                let sliced = values
                    .iter()
                    .zip(&keep)
                    .filter(|(_, k)| **k)
                    .map(|(v, _)| *v)
                    .collect();
                (*c, sliced)
            })
            .collect();

        PriceSeries {
            entity_id: self.entity_id.clone(),
            records,
            columns,
        }
    }
}
