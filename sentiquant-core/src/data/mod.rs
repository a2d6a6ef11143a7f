//! Raw table ingestion and normalization

pub mod frame;
pub mod normalize;
pub mod schema;
pub mod table;
pub mod timestamp;

pub use frame::price_frame;
pub use normalize::{NormalizeReport, Normalized, Normalizer};
pub use schema::{NewsSchema, PriceSchema, RecordSchema, Schema, SchemaError, TypedRow};
pub use table::{RawIndex, RawTable, TableError};
pub use timestamp::{format_timestamp, parse_timestamp};
