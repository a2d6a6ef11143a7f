//! SentiQuant Analytics: risk metrics, alignment, correlation, pipeline.
//!
//! This crate builds on `sentiquant-core` to provide:
//! - Sharpe ratio, rolling volatility, market beta and return correlations
//! - Daily alignment of price series with aggregated headline sentiment
//! - Descriptive statistics over news headlines
//! - A caller-owned memo cache keyed by content fingerprints
//! - TOML configuration and the end-to-end `Pipeline`

pub mod align;
pub mod cache;
pub mod config;
pub mod news_stats;
pub mod pipeline;
pub mod risk;

pub use align::{
    sentiment_return_correlation, AlignConfig, AlignedRecord, AlignedSeries, Aligner, Alignment,
};
pub use cache::{AnalysisCache, CacheStats, Memo};
pub use config::{AnalysisConfig, ConfigError};
pub use news_stats::{LengthStats, NewsStats};
pub use pipeline::{AnalysisReport, Pipeline, PipelineError, PipelineInput};
pub use risk::{
    beta, pearson, rolling_volatility, sharpe_ratio, volatility,
    CorrelationMatrix, MetricResult, ReturnSeries, RiskMetrics, RiskParams,
};
