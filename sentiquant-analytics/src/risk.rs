//! Risk metrics: pure functions over close-to-close returns.
//!
//! Every metric is a pure function: returns in, scalar out. Undefined results
//! are `f64::NAN`, never a missing key. `RiskMetrics` maps them over a set
//! of entities into `MetricResult`s.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use sentiquant_core::domain::{DerivedColumn, EntityId, PriceSeries};
use sentiquant_core::indicators::pct_change;

/// Per-entity scalar metric. NaN means "undefined for this entity".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricResult(BTreeMap<EntityId, f64>);

impl MetricResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entity: EntityId, value: f64) {
        self.0.insert(entity, value);
    }

    pub fn get(&self, entity: &EntityId) -> Option<f64> {
        self.0.get(entity).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EntityId, f64)> {
        self.0.iter().map(|(k, v)| (k, *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> BTreeMap<EntityId, f64> {
        self.0
    }
}

impl FromIterator<(EntityId, f64)> for MetricResult {
    fn from_iter<I: IntoIterator<Item = (EntityId, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Returns keyed by the timestamp of the later observation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReturnSeries {
    points: Vec<(DateTime<Utc>, f64)>,
}

impl ReturnSeries {
    /// Returns of a price series: its `Returns` column when the indicator
    /// stage appended one, otherwise `pct_change` of the closes. Rows
    /// without a return are skipped.
    pub fn from_series(series: &PriceSeries) -> Self {
        let returns = match series.column(DerivedColumn::Returns) {
            Some(values) => values.to_vec(),
            None => pct_change(&series.closes()),
        };
        let points = series
            .records()
            .iter()
            .zip(returns)
            .filter_map(|(record, r)| r.map(|r| (record.timestamp, r)))
            .collect();
        Self { points }
    }

    pub fn from_points(points: Vec<(DateTime<Utc>, f64)>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|(_, r)| *r).collect()
    }

    pub fn points(&self) -> &[(DateTime<Utc>, f64)] {
        &self.points
    }

    /// Pairs of (self, other) returns on timestamps present in both.
    pub fn inner_join(&self, other: &ReturnSeries) -> (Vec<f64>, Vec<f64>) {
        let lookup: BTreeMap<DateTime<Utc>, f64> = other.points.iter().copied().collect();
        self.points
            .iter()
            .filter_map(|(ts, r)| lookup.get(ts).map(|m| (*r, *m)))
            .unzip()
    }
}

/// Parameters for the risk metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskParams {
    /// Per-period rate subtracted from every return.
    pub risk_free_rate: f64,
    pub volatility_window: usize,
}

impl Default for RiskParams {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.0,
            volatility_window: 252,
        }
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Sharpe = mean(r - rf) / std(r - rf), sample std, not annualized.
///
/// NaN for fewer than two returns or zero dispersion.
pub fn sharpe_ratio(returns: &[f64], risk_free_rate: f64) -> f64 {
    if returns.len() < 2 {
        return f64::NAN;
    }
    let excess: Vec<f64> = returns.iter().map(|r| r - risk_free_rate).collect();
    let var = sample_variance(&excess);
    if negligible_variance(&excess, var) {
        return f64::NAN;
    }
    mean(&excess) / var.sqrt()
}

/// Sample std of each trailing `window` of returns. NaN during warmup.
pub fn rolling_volatility(returns: &[f64], window: usize) -> Vec<f64> {
    let n = returns.len();
    let mut result = vec![f64::NAN; n];
    if window == 0 || n < window {
        return result;
    }
    for i in (window - 1)..n {
        result[i] = sample_std(&returns[(i + 1 - window)..=i]);
    }
    result
}

/// Volatility of the most recent window. NaN when fewer returns than `window`.
pub fn volatility(returns: &[f64], window: usize) -> f64 {
    rolling_volatility(returns, window)
        .last()
        .copied()
        .unwrap_or(f64::NAN)
}

/// beta = cov(entity, market) / var(market), both sample (n-1).
///
/// NaN for fewer than two paired returns or zero market variance.
pub fn beta(entity: &[f64], market: &[f64]) -> f64 {
    let n = entity.len().min(market.len());
    if n < 2 {
        return f64::NAN;
    }
    let (entity, market) = (&entity[..n], &market[..n]);
    let var = sample_variance(market);
    if negligible_variance(market, var) {
        return f64::NAN;
    }
    covariance(entity, market) / var
}

/// Pearson correlation. NaN for fewer than two pairs or zero dispersion on
/// either side.
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return f64::NAN;
    }
    let (xs, ys) = (&xs[..n], &ys[..n]);
    let (var_x, var_y) = (sample_variance(xs), sample_variance(ys));
    if negligible_variance(xs, var_x) || negligible_variance(ys, var_y) {
        return f64::NAN;
    }
    (covariance(xs, ys) / (var_x * var_y).sqrt()).clamp(-1.0, 1.0)
}

// ─── Helpers ────────────────────────────────────────────────────────

/// Variance below this fraction of the squared largest magnitude is rounding
/// noise from a constant series.
const RELATIVE_VARIANCE_FLOOR: f64 = 1e-20;

/// True for zero (or NaN) variance, measured relative to the magnitude of
/// `values` so that small-scale series keep their dispersion.
fn negligible_variance(values: &[f64], var: f64) -> bool {
    let scale = values.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
    !(var > scale * scale * RELATIVE_VARIANCE_FLOOR)
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub(crate) fn sample_variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64
}

pub(crate) fn sample_std(values: &[f64]) -> f64 {
    sample_variance(values).sqrt()
}

fn covariance(xs: &[f64], ys: &[f64]) -> f64 {
    let (mx, my) = (mean(xs), mean(ys));
    xs.iter()
        .zip(ys)
        .map(|(x, y)| (x - mx) * (y - my))
        .sum::<f64>()
        / (xs.len() - 1) as f64
}

// ─── Per-entity maps ────────────────────────────────────────────────

/// Pairwise return correlations across entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub entities: Vec<EntityId>,
    /// Row-major, `entities.len()` squared.
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &EntityId, b: &EntityId) -> Option<f64> {
        let i = self.entities.iter().position(|e| e == a)?;
        let j = self.entities.iter().position(|e| e == b)?;
        Some(self.values[i][j])
    }
}

#[derive(Debug, Clone, Default)]
pub struct RiskMetrics {
    params: RiskParams,
}

impl RiskMetrics {
    pub fn new(params: RiskParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &RiskParams {
        &self.params
    }

    pub fn sharpe(&self, series: &PriceSeries) -> f64 {
        sharpe_ratio(
            &ReturnSeries::from_series(series).values(),
            self.params.risk_free_rate,
        )
    }

    pub fn volatility(&self, series: &PriceSeries) -> f64 {
        volatility(
            &ReturnSeries::from_series(series).values(),
            self.params.volatility_window,
        )
    }

    /// Beta of `series` against the shared market series, joined on
    /// identical timestamps.
    pub fn beta(&self, series: &PriceSeries, market: &ReturnSeries) -> f64 {
        let (entity, market) = ReturnSeries::from_series(series).inner_join(market);
        let value = beta(&entity, &market);
        if value.is_nan() {
            warn!(
                entity = %series.entity_id(),
                joined = entity.len(),
                "beta undefined: too few joined returns or zero market variance"
            );
        }
        value
    }

    pub fn sharpe_ratios<'a>(
        &self,
        series: impl IntoIterator<Item = &'a PriceSeries>,
    ) -> MetricResult {
        series
            .into_iter()
            .map(|s| (s.entity_id().clone(), self.sharpe(s)))
            .collect()
    }

    pub fn volatilities<'a>(
        &self,
        series: impl IntoIterator<Item = &'a PriceSeries>,
    ) -> MetricResult {
        series
            .into_iter()
            .map(|s| (s.entity_id().clone(), self.volatility(s)))
            .collect()
    }

    pub fn betas<'a>(
        &self,
        series: impl IntoIterator<Item = &'a PriceSeries>,
        market: &PriceSeries,
    ) -> MetricResult {
        let market = ReturnSeries::from_series(market);
        series
            .into_iter()
            .map(|s| (s.entity_id().clone(), self.beta(s, &market)))
            .collect()
    }

    /// Pearson correlation of returns for every pair of entities, each pair
    /// joined on identical timestamps. The diagonal is 1 unless undefined.
    pub fn return_correlation<'a>(
        &self,
        series: impl IntoIterator<Item = &'a PriceSeries>,
    ) -> CorrelationMatrix {
        let mut by_entity: BTreeMap<EntityId, ReturnSeries> = BTreeMap::new();
        for s in series {
            by_entity.insert(s.entity_id().clone(), ReturnSeries::from_series(s));
        }
        let entities: Vec<EntityId> = by_entity.keys().cloned().collect();
        let returns: Vec<&ReturnSeries> = by_entity.values().collect();

        let n = entities.len();
        let mut values = vec![vec![f64::NAN; n]; n];
        for i in 0..n {
            for j in i..n {
                let (a, b) = returns[i].inner_join(returns[j]);
                let r = pearson(&a, &b);
                values[i][j] = r;
                values[j][i] = r;
            }
        }
        debug!(entities = n, "return correlation matrix computed");
        CorrelationMatrix { entities, values }
    }
}
