//! Technical indicators over close prices.
//!
//! Every indicator implements `Indicator` and returns a NaN-warmup series of
//! the same length as its input. `IndicatorEngine` turns those into derived
//! columns on a `PriceSeries`, resolving the warmup with a `PrefixPolicy`.
//!
//! MACD is exposed as separate named instances per output line, keeping the
//! single-series `Indicator` trait unchanged.

pub mod ema;
pub mod engine;
pub mod indicator;
pub mod macd;
pub mod returns;
pub mod rsi;
pub mod sma;

pub use ema::Ema;
pub use engine::{IndicatorEngine, IndicatorParams, InvalidParams, PrefixPolicy};
pub use indicator::Indicator;
pub use macd::{Macd, MacdLine, MacdOutput};
pub use returns::{cumulative_returns, pct_change};
pub use rsi::Rsi;
pub use sma::Sma;

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
