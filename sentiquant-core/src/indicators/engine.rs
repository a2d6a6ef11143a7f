//! Indicator engine: computes the standard derived columns for a price series.
//!
//! Appends MA, RSI, the three MACD columns, Returns and Cumulative Returns.
//! The warmup prefix of MA/RSI/MACD is resolved by a single `PrefixPolicy`;
//! Returns are never back-filled.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::returns::{cumulative_returns, pct_change};
use super::{Indicator, Macd, Rsi, Sma};
use crate::domain::{DerivedColumn, PriceSeries, SeriesError};

/// What to do with the positions before an indicator's first defined value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrefixPolicy {
    /// Replace the undefined prefix with the first defined value.
    #[default]
    BackFill,
    /// Keep the prefix undefined.
    LeaveUndefined,
}

impl PrefixPolicy {
    /// Convert a NaN-warmup series into column values under this policy.
    ///
    /// A series with no defined value stays fully undefined.
    pub fn apply(self, values: &[f64]) -> Vec<Option<f64>> {
        let mut out: Vec<Option<f64>> = values
            .iter()
            .map(|v| v.is_finite().then_some(*v))
            .collect();

        if self == PrefixPolicy::BackFill {
            if let Some(first) = out.iter().position(Option::is_some) {
                let fill = out[first];
                for slot in &mut out[..first] {
                    *slot = fill;
                }
            }
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid indicator parameter '{name}': {reason}")]
pub struct InvalidParams {
    pub name: &'static str,
    pub reason: String,
}

/// Window lengths and prefix policy for the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorParams {
    pub ma_window: usize,
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub prefix_policy: PrefixPolicy,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            ma_window: 20,
            rsi_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            prefix_policy: PrefixPolicy::BackFill,
        }
    }
}

impl IndicatorParams {
    pub fn validate(&self) -> Result<(), InvalidParams> {
        let windows = [
            ("ma_window", self.ma_window),
            ("rsi_period", self.rsi_period),
            ("macd_fast", self.macd_fast),
            ("macd_slow", self.macd_slow),
            ("macd_signal", self.macd_signal),
        ];
        for (name, value) in windows {
            if value == 0 {
                return Err(InvalidParams {
                    name,
                    reason: "must be >= 1".into(),
                });
            }
        }
        if self.macd_fast >= self.macd_slow {
            return Err(InvalidParams {
                name: "macd_fast",
                reason: format!(
                    "must be below macd_slow ({} >= {})",
                    self.macd_fast, self.macd_slow
                ),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct IndicatorEngine {
    params: IndicatorParams,
}

impl IndicatorEngine {
    pub fn new(params: IndicatorParams) -> Result<Self, InvalidParams> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &IndicatorParams {
        &self.params
    }

    /// Compute every derived column for `closes` without touching a series.
    pub fn compute(&self, closes: &[f64]) -> Vec<(DerivedColumn, Vec<Option<f64>>)> {
        let p = &self.params;
        let policy = p.prefix_policy;

        let ma = Sma::new(p.ma_window).compute(closes);
        let rsi = Rsi::new(p.rsi_period).compute(closes);
        let macd = Macd::line(p.macd_fast, p.macd_slow, p.macd_signal).compute_all(closes);
        let returns = pct_change(closes);
        let cumulative = cumulative_returns(&returns);

        vec![
            (DerivedColumn::MovingAverage, policy.apply(&ma)),
            (DerivedColumn::Rsi, policy.apply(&rsi)),
            (DerivedColumn::Macd, policy.apply(&macd.line)),
            (DerivedColumn::MacdSignal, policy.apply(&macd.signal)),
            (DerivedColumn::MacdHistogram, policy.apply(&macd.histogram)),
            (DerivedColumn::Returns, returns),
            (DerivedColumn::CumulativeReturns, cumulative),
        ]
    }

    /// Append all derived columns to `series`.
    ///
    /// Fails without modifying the series if any of the columns is already
    /// present.
    pub fn apply(&self, series: &mut PriceSeries) -> Result<(), SeriesError> {
        if let Some(existing) = DerivedColumn::ALL
            .iter()
            .copied()
            .find(|c| series.has_column(*c))
        {
            return Err(SeriesError::ColumnExists(existing));
        }

        let closes = series.closes();
        for (column, values) in self.compute(&closes) {
            series.append_column(column, values)?;
        }

        debug!(
            entity = %series.entity_id(),
            rows = series.len(),
            ma_window = self.params.ma_window,
            rsi_period = self.params.rsi_period,
            "indicators appended"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EntityId, PriceRecord};
    use crate::indicators::assert_approx;
    use chrono::{Duration, TimeZone, Utc};

    fn series(closes: &[f64]) -> PriceSeries {
        let start = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let records = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceRecord {
                entity_id: EntityId::new("AAPL"),
                timestamp: start + Duration::days(i as i64),
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 1_000.0,
                adj_close: None,
            })
            .collect();
        PriceSeries::new(EntityId::new("AAPL"), records)
    }

    fn engine(ma: usize, policy: PrefixPolicy) -> IndicatorEngine {
        IndicatorEngine::new(IndicatorParams {
            ma_window: ma,
            rsi_period: 2,
            macd_fast: 2,
            macd_slow: 3,
            macd_signal: 2,
            prefix_policy: policy,
        })
        .unwrap()
    }

    #[test]
    fn back_fill_fills_prefix_with_first_value() {
        let out = PrefixPolicy::BackFill.apply(&[f64::NAN, f64::NAN, 3.0, 4.0]);
        assert_eq!(out, vec![Some(3.0), Some(3.0), Some(3.0), Some(4.0)]);
    }

    #[test]
    fn leave_undefined_keeps_prefix() {
        let out = PrefixPolicy::LeaveUndefined.apply(&[f64::NAN, 2.0]);
        assert_eq!(out, vec![None, Some(2.0)]);
    }

    #[test]
    fn all_undefined_stays_undefined_under_both_policies() {
        for policy in [PrefixPolicy::BackFill, PrefixPolicy::LeaveUndefined] {
            assert_eq!(policy.apply(&[f64::NAN; 3]), vec![None, None, None]);
        }
    }

    #[test]
    fn dashboard_scenario_moving_average() {
        let mut s = series(&[100.0, 102.0, 101.0, 105.0, 108.0]);
        engine(3, PrefixPolicy::LeaveUndefined).apply(&mut s).unwrap();
        let ma = s.column(DerivedColumn::MovingAverage).unwrap();
        assert!(ma[0].is_none() && ma[1].is_none());
        assert_approx(ma[2].unwrap(), 101.0, 1e-2);
        assert_approx(ma[3].unwrap(), 102.67, 1e-2);
        assert_approx(ma[4].unwrap(), 104.67, 1e-2);

        let mut s = series(&[100.0, 102.0, 101.0, 105.0, 108.0]);
        engine(3, PrefixPolicy::BackFill).apply(&mut s).unwrap();
        let ma = s.column(DerivedColumn::MovingAverage).unwrap();
        assert_approx(ma[0].unwrap(), 101.0, 1e-9);
        assert_approx(ma[1].unwrap(), 101.0, 1e-9);
    }

    #[test]
    fn returns_are_never_back_filled() {
        let mut s = series(&[100.0, 110.0, 121.0]);
        engine(2, PrefixPolicy::BackFill).apply(&mut s).unwrap();
        assert!(s.column(DerivedColumn::Returns).unwrap()[0].is_none());
        assert!(s.column(DerivedColumn::CumulativeReturns).unwrap()[0].is_none());
        assert_approx(
            s.column(DerivedColumn::CumulativeReturns).unwrap()[2].unwrap(),
            1.21,
            1e-12,
        );
    }

    #[test]
    fn appends_every_column_once() {
        let mut s = series(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let e = engine(3, PrefixPolicy::BackFill);
        e.apply(&mut s).unwrap();
        for column in DerivedColumn::ALL {
            assert_eq!(s.column(column).unwrap().len(), 6, "{column}");
        }
        assert_eq!(
            e.apply(&mut s),
            Err(SeriesError::ColumnExists(DerivedColumn::MovingAverage))
        );
    }

    #[test]
    fn rejects_partial_reapplication_without_modifying() {
        let mut s = series(&[1.0, 2.0, 3.0]);
        s.append_column(DerivedColumn::Returns, vec![None, None, None])
            .unwrap();
        let before = s.clone();
        assert_eq!(
            engine(2, PrefixPolicy::BackFill).apply(&mut s),
            Err(SeriesError::ColumnExists(DerivedColumn::Returns))
        );
        assert_eq!(s, before);
    }

    #[test]
    fn too_short_series_yields_undefined_columns() {
        let mut s = series(&[100.0, 101.0]);
        engine(5, PrefixPolicy::BackFill).apply(&mut s).unwrap();
        assert!(s
            .column(DerivedColumn::MovingAverage)
            .unwrap()
            .iter()
            .all(Option::is_none));
    }

    #[test]
    fn params_validation() {
        assert!(IndicatorParams::default().validate().is_ok());
        let bad = IndicatorParams {
            macd_fast: 26,
            ..IndicatorParams::default()
        };
        assert_eq!(bad.validate().unwrap_err().name, "macd_fast");
        let zero = IndicatorParams {
            ma_window: 0,
            ..IndicatorParams::default()
        };
        assert_eq!(zero.validate().unwrap_err().name, "ma_window");
    }

    #[test]
    fn params_serde_defaults() {
        let p: IndicatorParams = serde_json::from_str(r#"{"ma_window": 5}"#).unwrap();
        assert_eq!(p.ma_window, 5);
        assert_eq!(p.rsi_period, 14);
        assert_eq!(p.prefix_policy, PrefixPolicy::BackFill);
        let p: IndicatorParams =
            serde_json::from_str(r#"{"prefix_policy": "leave_undefined"}"#).unwrap();
        assert_eq!(p.prefix_policy, PrefixPolicy::LeaveUndefined);
    }
}
