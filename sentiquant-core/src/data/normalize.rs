//! Normalizer: raw table in, typed clean records out.
//!
//! Steps, each on the previous step's output:
//! 1. drop rows with a null required field
//! 2. drop exact-duplicate rows (first kept)
//! 3. parse the timestamp; unparseable rows are dropped
//! 4. coerce numeric fields; failures null the value, dropping the row only
//!    when the field is required
//! 5. trim text fields
//!
//! Only structural absence of a required field is an error. Row-level
//! problems are counted in `NormalizeReport` and never surface as errors.

use crate::data::schema::{NewsSchema, PriceSchema, RecordSchema, Schema, SchemaError, TypedRow};
use crate::data::table::RawTable;
use crate::data::timestamp::parse_timestamp;
use crate::domain::{CleanSeries, EntityId, NewsRecord, PriceSeries};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Per-reason drop counters for one normalization run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizeReport {
    pub input_rows: usize,
    pub null_required: usize,
    pub duplicate_rows: usize,
    pub bad_timestamp: usize,
    pub bad_numeric: usize,
    pub non_positive_close: usize,
    pub duplicate_timestamps: usize,
    pub output_rows: usize,
}

impl NormalizeReport {
    pub fn dropped(&self) -> usize {
        self.input_rows - self.output_rows
    }
}

/// Normalized data plus the report describing what was dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized<T> {
    pub data: T,
    pub report: NormalizeReport,
}

/// Normalizer for raw price and news tables.
pub struct Normalizer;

impl Normalizer {
    /// Normalize a table of the kind named by `schema`.
    pub fn normalize(table: RawTable, schema: &Schema) -> Result<CleanSeries, SchemaError> {
        match schema {
            Schema::Price(entity) => Ok(CleanSeries::Price(
                Self::prices(table, entity.clone())?.data,
            )),
            Schema::News => Ok(CleanSeries::News(Self::news(table)?.data)),
        }
    }

    pub fn prices(
        table: RawTable,
        entity_id: impl Into<EntityId>,
    ) -> Result<Normalized<PriceSeries>, SchemaError> {
        Self::run(table, &PriceSchema::new(entity_id))
    }

    pub fn news(table: RawTable) -> Result<Normalized<Vec<NewsRecord>>, SchemaError> {
        Self::run(table, &NewsSchema)
    }

    /// Run the five cleaning steps with the given record schema.
    pub fn run<S: RecordSchema>(
        mut table: RawTable,
        schema: &S,
    ) -> Result<Normalized<S::Output>, SchemaError> {
        table.reset_index();

        let ts_pos = schema
            .timestamp_fields()
            .iter()
            .find_map(|f| table.position(f))
            .ok_or_else(|| SchemaError::MissingField {
                field: schema.timestamp_fields().join("/"),
            })?;
        for field in schema.required_fields() {
            if !table.has_column(field) {
                return Err(SchemaError::MissingField {
                    field: field.to_string(),
                });
            }
        }

        let (columns, rows) = table.into_parts();
        let position = |name: &str| columns.iter().position(|c| c == name);
        let required_pos: Vec<usize> = std::iter::once(ts_pos)
            .chain(schema.required_fields().iter().filter_map(|f| position(f)))
            .collect();
        let numeric_pos: Vec<(&'static str, Option<usize>)> = schema
            .numeric_fields()
            .iter()
            .map(|f| (*f, position(f)))
            .collect();
        let text_pos: Vec<(&'static str, Option<usize>)> = schema
            .text_fields()
            .iter()
            .map(|f| (*f, position(f)))
            .collect();
        let required = schema.required_fields();

        let mut report = NormalizeReport {
            input_rows: rows.len(),
            ..Default::default()
        };

        // 1. null required fields
        let mut rows: Vec<Vec<Option<String>>> = rows
            .into_iter()
            .filter(|row| required_pos.iter().all(|&i| row[i].is_some()))
            .collect();
        report.null_required = report.input_rows - rows.len();

        // 2. exact duplicates
        let before = rows.len();
        let mut seen = HashSet::new();
        rows.retain(|row| seen.insert(row.clone()));
        report.duplicate_rows = before - rows.len();

        // 3. timestamps
        let before = rows.len();
        let parsed: Vec<(Vec<Option<String>>, _)> = rows
            .into_iter()
            .filter_map(|row| {
                let ts = row[ts_pos].as_deref().and_then(parse_timestamp)?;
                Some((row, ts))
            })
            .collect();
        report.bad_timestamp = before - parsed.len();

        // 4. numeric coercion, 5. text trimming
        let mut records = Vec::with_capacity(parsed.len());
        for (row, timestamp) in parsed {
            let numbers: BTreeMap<&'static str, Option<f64>> = numeric_pos
                .iter()
                .map(|(name, pos)| (*name, pos.and_then(|i| row[i].as_deref()).and_then(coerce_number)))
                .collect();
            let texts: BTreeMap<&'static str, Option<String>> = text_pos
                .iter()
                .map(|(name, pos)| {
                    let value = pos.and_then(|i| row[i].as_deref()).map(|s| s.trim().to_string());
                    (*name, value)
                })
                .collect();

            let required_numeric_failed = numbers
                .iter()
                .any(|(name, value)| value.is_none() && required.contains(name));
            if required_numeric_failed {
                report.bad_numeric += 1;
                continue;
            }

            let typed = TypedRow {
                timestamp,
                numbers,
                texts,
            };
            if let Some(record) = schema.build(&typed) {
                records.push(record);
            }
        }

        let data = schema.finish(records, &mut report);
        report.output_rows = report.input_rows
            - report.null_required
            - report.duplicate_rows
            - report.bad_timestamp
            - report.bad_numeric
            - report.non_positive_close
            - report.duplicate_timestamps;

        tracing::debug!(
            input = report.input_rows,
            output = report.output_rows,
            null_required = report.null_required,
            duplicates = report.duplicate_rows,
            bad_timestamp = report.bad_timestamp,
            bad_numeric = report.bad_numeric,
            "normalized table"
        );

        Ok(Normalized { data, report })
    }
}

/// Finite `f64` or nothing. "NaN" and "inf" count as coercion failures.
fn coerce_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
