//! Exponential Moving Average (EMA).
//!
//! EMA[t] = EMA[t-1] + alpha * (x[t] - EMA[t-1]), alpha = 2/(period+1),
//! seeded at index period-1 with the mean of the first `period` values.
//! MACD builds its line and signal from these.

use super::Indicator;

#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    name: String,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "EMA period must be >= 1");
        Self {
            period,
            name: format!("ema_{period}"),
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }

    fn alpha(&self) -> f64 {
        2.0 / (self.period as f64 + 1.0)
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    /// Works on any finite series, not only closes.
    fn compute(&self, values: &[f64]) -> Vec<f64> {
        let p = self.period;
        let mut out = vec![f64::NAN; values.len()];
        if values.len() < p {
            return out;
        }

        let alpha = self.alpha();
        let mut ema = values[..p].iter().sum::<f64>() / p as f64;
        out[p - 1] = ema;
        for (slot, &x) in out[p..].iter_mut().zip(&values[p..]) {
            ema += alpha * (x - ema);
            *slot = ema;
        }
        out
    }
}
