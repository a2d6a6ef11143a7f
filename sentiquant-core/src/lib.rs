//! SentiQuant Core: domain types, normalization, indicators, headline sentiment.
//!
//! This crate contains the leaf stages of the analytics pipeline:
//! - Domain types (price and news records, price series with derived columns)
//! - Raw tables and the schema-driven Normalizer
//! - Indicator engine (moving average, RSI, MACD, returns) with a prefix policy
//! - Sentiment scoring and classification of headlines
//! - Content fingerprints used as memoization keys

pub mod data;
pub mod domain;
pub mod fingerprint;
pub mod indicators;
pub mod sentiment;
