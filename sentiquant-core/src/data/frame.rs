//! Polars interop: raw tables from DataFrames, clean series back to DataFrames.

use super::table::{RawTable, TableError};
use crate::domain::PriceSeries;
use polars::prelude::*;

impl RawTable {
    /// Convert a DataFrame into a raw table by casting every column to text.
    /// Nulls stay null; typing is left to the normalizer.
    pub fn from_dataframe(df: &DataFrame) -> Result<Self, TableError> {
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|n| n.to_string())
            .collect();

        let mut cells: Vec<Vec<Option<String>>> = Vec::with_capacity(names.len());
        for column in df.get_columns() {
            let as_text = column
                .as_materialized_series()
                .cast(&DataType::String)
                .map_err(|e| TableError::DataFrame(format!("cast '{}': {e}", column.name())))?;
            let values = as_text
                .str()
                .map_err(|e| TableError::DataFrame(format!("read '{}': {e}", column.name())))?;
            cells.push(values.into_iter().map(|v| v.map(str::to_string)).collect());
        }

        let mut table = RawTable::new(names)?;
        for i in 0..df.height() {
            table.push_row(cells.iter().map(|c| c[i].clone()).collect())?;
        }
        Ok(table)
    }
}

/// Cleaned series with all derived columns, for plotting collaborators.
///
/// Column order: Date, OHLCV, Adj Close, then derived columns in canonical
/// order. Undefined derived values are nulls.
pub fn price_frame(series: &PriceSeries) -> PolarsResult<DataFrame> {
    let records = series.records();
    let dates: Vec<i64> = records.iter().map(|r| r.timestamp.timestamp_millis()).collect();
    let opens: Vec<f64> = records.iter().map(|r| r.open).collect();
    let highs: Vec<f64> = records.iter().map(|r| r.high).collect();
    let lows: Vec<f64> = records.iter().map(|r| r.low).collect();
    let closes: Vec<f64> = records.iter().map(|r| r.close).collect();
    let volumes: Vec<f64> = records.iter().map(|r| r.volume).collect();
    let adj_closes: Vec<Option<f64>> = records.iter().map(|r| r.adj_close).collect();

    let mut columns = vec![
        Column::new("Date".into(), dates)
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?,
        Column::new("Open".into(), opens),
        Column::new("High".into(), highs),
        Column::new("Low".into(), lows),
        Column::new("Close".into(), closes),
        Column::new("Volume".into(), volumes),
        Column::new("Adj Close".into(), adj_closes),
    ];
    for (column, values) in series.columns() {
        columns.push(Column::new(column.label().into(), values.to_vec()));
    }

    DataFrame::new(columns)
}
