//! Indicator trait.
//!
//! Indicators are pure functions: close history in, numeric series out.

/// A windowed indicator over close prices.
///
/// Output has the same length as the input. The first `lookback()` values
/// are `f64::NAN` (warmup); prefix handling is the engine's job.
///
/// No value at index t may depend on closes after t.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "sma_20", "rsi_14").
    fn name(&self) -> &str;

    /// Number of leading positions without a defined value.
    fn lookback(&self) -> usize;

    fn compute(&self, closes: &[f64]) -> Vec<f64>;
}
