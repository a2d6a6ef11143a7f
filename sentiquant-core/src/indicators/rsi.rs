//! Relative Strength Index (RSI).
//!
//! Seed: simple average gain and loss over the first `period` changes.
//! Then Wilder smoothing (alpha = 1/period).
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! Lookback: period.
//! Edge cases: avg_loss == 0 → 100; avg_gain == 0 → 0; both zero → 50.

use super::Indicator;

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    name: String,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self {
            period,
            name: format!("rsi_{period}"),
        }
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, closes: &[f64]) -> Vec<f64> {
        let n = closes.len();
        let mut result = vec![f64::NAN; n];

        if n < self.period + 1 {
            return result;
        }

        let changes: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();

        let (seed, rest) = changes.split_at(self.period);
        let width = self.period as f64;
        let mut avg_gain = seed.iter().map(|ch| ch.max(0.0)).sum::<f64>() / width;
        let mut avg_loss = seed.iter().map(|ch| (-ch).max(0.0)).sum::<f64>() / width;
        result[self.period] = compute_rsi(avg_gain, avg_loss);

        let alpha = 1.0 / width;
        for (i, &ch) in rest.iter().enumerate() {
            avg_gain += alpha * (ch.max(0.0) - avg_gain);
            avg_loss += alpha * ((-ch).max(0.0) - avg_loss);
            result[self.period + 1 + i] = compute_rsi(avg_gain, avg_loss);
        }

        result
    }
}

fn compute_rsi(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 && avg_gain == 0.0 {
        50.0
    } else if avg_loss == 0.0 {
        100.0
    } else if avg_gain == 0.0 {
        0.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::assert_approx;

    #[test]
    fn rsi_all_gains() {
        let result = Rsi::new(3).compute(&[100.0, 101.0, 102.0, 103.0, 104.0, 105.0]);
        assert_approx(result[3], 100.0, 1e-6);
        assert_approx(result[5], 100.0, 1e-6);
    }

    #[test]
    fn rsi_all_losses() {
        let result = Rsi::new(3).compute(&[105.0, 104.0, 103.0, 102.0, 101.0, 100.0]);
        assert_approx(result[3], 0.0, 1e-6);
    }

    #[test]
    fn rsi_flat_is_fifty() {
        let result = Rsi::new(3).compute(&[100.0; 6]);
        assert_approx(result[5], 50.0, 1e-9);
    }

    #[test]
    fn rsi_mixed_seed_value() {
        // Changes: +0.34, -0.25, -0.48 → avg_gain = 0.34/3, avg_loss = 0.73/3
        // RSI[3] = 100 - 100/(1 + 0.34/0.73)
        let result = Rsi::new(3).compute(&[44.0, 44.34, 44.09, 43.61, 44.33]);

        assert!(result[..3].iter().all(|v| v.is_nan()));
        assert_approx(result[3], 100.0 - 100.0 / (1.0 + 0.34 / 0.73), 1e-9);
        // Wilder step with +0.72
        let avg_gain = (0.34 / 3.0) * (2.0 / 3.0) + 0.72 / 3.0;
        let avg_loss = (0.73 / 3.0) * (2.0 / 3.0);
        assert_approx(result[4], 100.0 - 100.0 / (1.0 + avg_gain / avg_loss), 1e-9);
    }

    #[test]
    fn rsi_bounds() {
        let result = Rsi::new(3).compute(&[100.0, 105.0, 98.0, 110.0, 95.0, 115.0, 90.0, 120.0]);
        for (i, &v) in result.iter().enumerate() {
            if !v.is_nan() {
                assert!((0.0..=100.0).contains(&v), "RSI out of bounds at {i}: {v}");
            }
        }
    }

    #[test]
    fn rsi_lookback() {
        assert_eq!(Rsi::new(14).lookback(), 14);
    }
}
