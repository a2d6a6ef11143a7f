//! End-to-end analysis: raw tables in, cleaned series, metrics and the
//! price/sentiment alignment out.
//!
//! Stages, leaf to root:
//! 1. Normalize every price table (and the market and news tables)
//! 2. Append indicator columns per entity
//! 3. Sharpe, volatility and (with a market table) beta per entity
//! 4. Annotate headlines with sentiment
//! 5. Align prices with daily sentiment and correlate
//!
//! Entities are independent; with `parallel` set, stages 1–3 fan out over
//! the rayon pool.

use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Instant;
use thiserror::Error;
use tracing::info;

use crate::align::{sentiment_return_correlation, Aligner, Alignment};
use crate::cache::AnalysisCache;
use crate::config::{AnalysisConfig, ConfigError};
use crate::news_stats::NewsStats;
use crate::risk::{CorrelationMatrix, MetricResult, ReturnSeries, RiskMetrics};
use sentiquant_core::data::{NormalizeReport, Normalizer, RawTable, SchemaError};
use sentiquant_core::domain::{AnnotatedNews, ContentKey, EntityId, PriceSeries, SeriesError};
use sentiquant_core::fingerprint::{combine, news_key, params_key, price_key};
use sentiquant_core::indicators::IndicatorEngine;
use sentiquant_core::sentiment::{LexiconScorer, SentimentClassifier, SentimentScorer};

/// Publishers listed in the news statistics.
const TOP_PUBLISHERS: usize = 10;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{entity}: {source}")]
    Schema {
        entity: String,
        #[source]
        source: SchemaError,
    },

    #[error("{entity}: {source}")]
    Series {
        entity: String,
        #[source]
        source: SeriesError,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Raw tables handed over by the data-acquisition collaborator.
#[derive(Debug, Clone, Default)]
pub struct PipelineInput {
    pub prices: Vec<(EntityId, RawTable)>,
    /// Market index used for beta.
    pub market: Option<(EntityId, RawTable)>,
    pub news: Option<RawTable>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    /// Cleaned series with every derived column.
    pub series: BTreeMap<EntityId, PriceSeries>,
    pub price_reports: BTreeMap<EntityId, NormalizeReport>,
    pub news_report: Option<NormalizeReport>,
    pub news: Vec<AnnotatedNews>,
    pub news_stats: Option<NewsStats>,
    pub sharpe_ratios: MetricResult,
    pub volatilities: MetricResult,
    /// Present when a market table was supplied.
    pub betas: Option<MetricResult>,
    pub return_correlation: CorrelationMatrix,
    pub alignment: Alignment,
    pub sentiment_correlation: MetricResult,
}

struct EntityResult {
    series: PriceSeries,
    report: NormalizeReport,
    sharpe: f64,
    volatility: f64,
    beta: Option<f64>,
}

pub struct Pipeline<S = LexiconScorer> {
    config: AnalysisConfig,
    engine: IndicatorEngine,
    risk: RiskMetrics,
    aligner: Aligner,
    classifier: SentimentClassifier<S>,
    indicator_key: ContentKey,
}

impl Pipeline<LexiconScorer> {
    pub fn new(config: AnalysisConfig) -> Result<Self, PipelineError> {
        Self::with_scorer(config, LexiconScorer::new())
    }
}

impl<S: SentimentScorer> Pipeline<S> {
    pub fn with_scorer(config: AnalysisConfig, scorer: S) -> Result<Self, PipelineError> {
        config.validate()?;
        let engine = IndicatorEngine::new(config.indicators.clone()).map_err(ConfigError::from)?;
        let indicator_key = params_key(&config.indicators)
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;
        Ok(Self {
            risk: RiskMetrics::new(config.risk.clone()),
            aligner: Aligner::new(&config.align),
            classifier: SentimentClassifier::new(scorer),
            engine,
            indicator_key,
            config,
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn run(&self, input: PipelineInput) -> Result<AnalysisReport, PipelineError> {
        self.run_cached(input, &AnalysisCache::new())
    }

    /// Run with a caller-owned cache; repeated inputs skip recomputation.
    pub fn run_cached(
        &self,
        input: PipelineInput,
        cache: &AnalysisCache,
    ) -> Result<AnalysisReport, PipelineError> {
        let start = Instant::now();
        info!(
            entities = input.prices.len(),
            market = input.market.is_some(),
            news = input.news.is_some(),
            parallel = self.config.parallel,
            "analysis started"
        );

        let market = match input.market {
            Some((id, table)) => {
                let series = normalize_prices(table, &id)?.data;
                Some(ReturnSeries::from_series(&series))
            }
            None => None,
        };

        let results: Vec<EntityResult> = if self.config.parallel {
            input
                .prices
                .into_par_iter()
                .map(|(id, table)| self.analyze_entity(id, table, market.as_ref(), cache))
                .collect::<Result<_, _>>()?
        } else {
            input
                .prices
                .into_iter()
                .map(|(id, table)| self.analyze_entity(id, table, market.as_ref(), cache))
                .collect::<Result<_, _>>()?
        };

        let (news, news_report) = match input.news {
            Some(table) => {
                let normalized = Normalizer::news(table).map_err(|source| PipelineError::Schema {
                    entity: "news".into(),
                    source,
                })?;
                let key = news_key(&normalized.data);
                let annotated = cache
                    .sentiment
                    .get_or_try_insert_with(&key, || {
                        Ok::<_, PipelineError>(self.classifier.annotate(&normalized.data))
                    })?;
                (annotated, Some(normalized.report))
            }
            None => (Vec::new(), None),
        };

        let mut series = BTreeMap::new();
        let mut price_reports = BTreeMap::new();
        let mut sharpe_ratios = MetricResult::new();
        let mut volatilities = MetricResult::new();
        let mut betas = market.as_ref().map(|_| MetricResult::new());
        for r in results {
            let id = r.series.entity_id().clone();
            sharpe_ratios.insert(id.clone(), r.sharpe);
            volatilities.insert(id.clone(), r.volatility);
            if let (Some(map), Some(beta)) = (betas.as_mut(), r.beta) {
                map.insert(id.clone(), beta);
            }
            price_reports.insert(id.clone(), r.report);
            series.insert(id, r.series);
        }

        let return_correlation = self.risk.return_correlation(series.values());
        let alignment = self.aligner.align(series.values(), &news);
        let sentiment_correlation = sentiment_return_correlation(&alignment);
        let news_stats = news_report.as_ref().map(|_| {
            let records: Vec<_> = news.iter().map(|n| n.record.clone()).collect();
            NewsStats::compute(&records, &self.aligner, TOP_PUBLISHERS)
        });

        info!(
            entities = series.len(),
            headlines = news.len(),
            aligned = alignment.len(),
            cache_hits = cache.stats().hits,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "analysis finished"
        );

        Ok(AnalysisReport {
            series,
            price_reports,
            news_report,
            news,
            news_stats,
            sharpe_ratios,
            volatilities,
            betas,
            return_correlation,
            alignment,
            sentiment_correlation,
        })
    }

    fn analyze_entity(
        &self,
        id: EntityId,
        table: RawTable,
        market: Option<&ReturnSeries>,
        cache: &AnalysisCache,
    ) -> Result<EntityResult, PipelineError> {
        let normalized = normalize_prices(table, &id)?;
        let key = combine(&[&price_key(&normalized.data), &self.indicator_key]);

        let series = cache.indicators.get_or_try_insert_with(&key, || {
            let mut series = normalized.data.clone();
            self.engine
                .apply(&mut series)
                .map_err(|source| PipelineError::Series {
                    entity: id.to_string(),
                    source,
                })?;
            Ok::<_, PipelineError>(series)
        })?;

        Ok(EntityResult {
            sharpe: self.risk.sharpe(&series),
            volatility: self.risk.volatility(&series),
            beta: market.map(|m| self.risk.beta(&series, m)),
            report: normalized.report,
            series,
        })
    }
}

fn normalize_prices(
    table: RawTable,
    id: &EntityId,
) -> Result<sentiquant_core::data::Normalized<PriceSeries>, PipelineError> {
    Normalizer::prices(table, id.clone()).map_err(|source| PipelineError::Schema {
        entity: id.to_string(),
        source,
    })
}
