//! Raw tabular input as handed over by acquisition collaborators.
//!
//! A `RawTable` is untyped: every cell is optional text. Typing happens in
//! the normalizer, never here.

use crate::data::timestamp::format_timestamp;
use crate::domain::{NewsRecord, PriceSeries};
use std::collections::HashSet;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("row {row} has {actual} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("index has {actual} values but the table has {expected} rows")]
    IndexLength { expected: usize, actual: usize },

    #[error("column '{0}' appears more than once")]
    DuplicateColumn(String),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("dataframe conversion failed: {0}")]
    DataFrame(String),
}

/// A named key column supplied as the table's primary axis rather than as a
/// regular field (e.g. a date index).
#[derive(Debug, Clone, PartialEq)]
pub struct RawIndex {
    pub name: String,
    pub values: Vec<Option<String>>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawTable {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
    index: Option<RawIndex>,
}

impl RawTable {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Result<Self, TableError> {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        let mut seen = HashSet::new();
        for c in &columns {
            if !seen.insert(c.as_str()) {
                return Err(TableError::DuplicateColumn(c.clone()));
            }
        }
        Ok(Self {
            columns,
            rows: Vec::new(),
            index: None,
        })
    }

    pub fn push_row(&mut self, row: Vec<Option<String>>) -> Result<(), TableError> {
        if row.len() != self.columns.len() {
            return Err(TableError::RaggedRow {
                row: self.rows.len(),
                expected: self.columns.len(),
                actual: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Convenience for literal tables: `None` cells stay null.
    pub fn push_cells(&mut self, cells: &[Option<&str>]) -> Result<(), TableError> {
        self.push_row(cells.iter().map(|c| c.map(str::to_string)).collect())
    }

    /// Attach a key column as the table index. Must match the row count at
    /// the time of the call.
    pub fn with_index(
        mut self,
        name: impl Into<String>,
        values: Vec<Option<String>>,
    ) -> Result<Self, TableError> {
        if values.len() != self.rows.len() {
            return Err(TableError::IndexLength {
                expected: self.rows.len(),
                actual: values.len(),
            });
        }
        self.index = Some(RawIndex {
            name: name.into(),
            values,
        });
        Ok(self)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    pub fn index(&self) -> Option<&RawIndex> {
        self.index.as_ref()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn position(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.position(column).is_some()
    }

    /// Move the index back into a regular leading column so that downstream
    /// logic treats every key uniformly. If a column of the same name already
    /// exists the index is discarded.
    pub fn reset_index(&mut self) {
        let Some(index) = self.index.take() else {
            return;
        };
        if self.has_column(&index.name) {
            tracing::debug!(index = %index.name, "index shadows an existing column; dropped");
            return;
        }
        self.columns.insert(0, index.name);
        for (row, key) in self.rows.iter_mut().zip(index.values) {
            row.insert(0, key);
        }
    }

    pub(crate) fn into_parts(self) -> (Vec<String>, Vec<Vec<Option<String>>>) {
        (self.columns, self.rows)
    }

    /// Parse CSV with a header row. Empty cells become nulls, and a short
    /// record is padded with nulls so the normalizer can drop it. A record
    /// with more cells than the header is an error.
    pub fn from_csv_reader<R: io::Read>(reader: R) -> Result<Self, TableError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
        let mut table = RawTable::new(headers)?;

        for record in rdr.records() {
            let record = record?;
            let mut row: Vec<Option<String>> = record
                .iter()
                .map(|cell| {
                    if cell.is_empty() {
                        None
                    } else {
                        Some(cell.to_string())
                    }
                })
                .collect();
            if row.len() < table.columns.len() {
                row.resize(table.columns.len(), None);
            }
            table.push_row(row)?;
        }

        Ok(table)
    }

    pub fn from_csv_str(content: &str) -> Result<Self, TableError> {
        Self::from_csv_reader(content.as_bytes())
    }

    /// Re-export a cleaned price series with the canonical field names.
    pub fn from_prices(series: &PriceSeries) -> Self {
        let columns = ["Date", "Open", "High", "Low", "Close", "Volume", "Adj Close"]
            .into_iter()
            .map(String::from)
            .collect();
        let rows = series
            .records()
            .iter()
            .map(|r| {
                vec![
                    Some(format_timestamp(r.timestamp)),
                    Some(r.open.to_string()),
                    Some(r.high.to_string()),
                    Some(r.low.to_string()),
                    Some(r.close.to_string()),
                    Some(r.volume.to_string()),
                    r.adj_close.map(|v| v.to_string()),
                ]
            })
            .collect();
        Self {
            columns,
            rows,
            index: None,
        }
    }

    /// Re-export cleaned news records with the canonical field names.
    pub fn from_news(news: &[NewsRecord]) -> Self {
        let columns = ["headline", "url", "publisher", "date", "stock"]
            .into_iter()
            .map(String::from)
            .collect();
        let rows = news
            .iter()
            .map(|n| {
                vec![
                    Some(n.headline.clone()),
                    n.url.clone(),
                    n.publisher.clone(),
                    Some(format_timestamp(n.timestamp)),
                    n.entity_id.as_ref().map(|e| e.to_string()),
                ]
            })
            .collect();
        Self {
            columns,
            rows,
            index: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_empty_cells_become_null() {
        let table = RawTable::from_csv_str("Date,Close\n2024-01-02,\n,101.5\n").unwrap();
        assert_eq!(table.columns(), &["Date".to_string(), "Close".to_string()]);
        assert_eq!(table.rows()[0], vec![Some("2024-01-02".into()), None]);
        assert_eq!(table.rows()[1], vec![None, Some("101.5".into())]);
    }

    #[test]
    fn truncated_csv_record_is_padded_with_nulls() {
        let table =
            RawTable::from_csv_str("Date,Open,Close\n2024-01-02,1,2\n2024-01-03,1\n").unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.rows()[1],
            vec![Some("2024-01-03".into()), Some("1".into()), None]
        );
    }

    #[test]
    fn overlong_csv_record_is_rejected() {
        let err = RawTable::from_csv_str("Date,Close\n2024-01-02,1,extra\n").unwrap_err();
        assert!(matches!(err, TableError::RaggedRow { expected: 2, actual: 3, .. }));
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let mut table = RawTable::new(["a", "b"]).unwrap();
        let err = table.push_cells(&[Some("1")]).unwrap_err();
        assert!(matches!(err, TableError::RaggedRow { expected: 2, actual: 1, .. }));
    }

    #[test]
    fn duplicate_columns_are_rejected() {
        assert!(matches!(
            RawTable::new(["Close", "Close"]),
            Err(TableError::DuplicateColumn(_))
        ));
    }

    #[test]
    fn reset_index_restores_leading_column() {
        let mut table = RawTable::new(["Close"]).unwrap();
        table.push_cells(&[Some("100")]).unwrap();
        let mut table = table
            .with_index("Date", vec![Some("2024-01-02".into())])
            .unwrap();

        table.reset_index();

        assert!(table.index().is_none());
        assert_eq!(table.columns()[0], "Date");
        assert_eq!(
            table.rows()[0],
            vec![Some("2024-01-02".into()), Some("100".into())]
        );
    }

    #[test]
    fn index_length_must_match_rows() {
        let table = RawTable::new(["Close"]).unwrap();
        assert!(matches!(
            table.with_index("Date", vec![None]),
            Err(TableError::IndexLength { expected: 0, actual: 1 })
        ));
    }
}
