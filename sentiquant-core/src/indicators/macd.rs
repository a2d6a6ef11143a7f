//! Moving Average Convergence Divergence (MACD).
//!
//! Three lines (separate Indicator instances):
//! - Line: EMA(close, fast) - EMA(close, slow)
//! - Signal: EMA(line, signal)
//! - Histogram: line - signal
//!
//! Lookback: slow - 1 for the line, slow + signal - 2 for signal and histogram.

use super::ema::Ema;
use super::Indicator;

/// Which output of MACD to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacdLine {
    Line,
    Signal,
    Histogram,
}

/// All three MACD outputs from one pass over the closes.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdOutput {
    pub line: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct Macd {
    fast: Ema,
    slow: Ema,
    signal: Ema,
    output: MacdLine,
    name: String,
}

impl Macd {
    fn with_output(fast: usize, slow: usize, signal: usize, output: MacdLine) -> Self {
        assert!(fast >= 1 && signal >= 1, "MACD periods must be >= 1");
        assert!(fast < slow, "MACD fast period must be below the slow period");
        let prefix = match output {
            MacdLine::Line => "macd",
            MacdLine::Signal => "macd_signal",
            MacdLine::Histogram => "macd_hist",
        };
        Self {
            fast: Ema::new(fast),
            slow: Ema::new(slow),
            signal: Ema::new(signal),
            output,
            name: format!("{prefix}_{fast}_{slow}_{signal}"),
        }
    }

    pub fn line(fast: usize, slow: usize, signal: usize) -> Self {
        Self::with_output(fast, slow, signal, MacdLine::Line)
    }

    pub fn signal(fast: usize, slow: usize, signal: usize) -> Self {
        Self::with_output(fast, slow, signal, MacdLine::Signal)
    }

    pub fn histogram(fast: usize, slow: usize, signal: usize) -> Self {
        Self::with_output(fast, slow, signal, MacdLine::Histogram)
    }

    /// Compute line, signal and histogram together.
    pub fn compute_all(&self, closes: &[f64]) -> MacdOutput {
        let n = closes.len();
        let fast = self.fast.compute(closes);
        let slow = self.slow.compute(closes);

        let line: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();

        // The signal EMA runs over the defined part of the line only.
        let mut signal = vec![f64::NAN; n];
        let start = self.slow.lookback();
        if n > start {
            let tail = self.signal.compute(&line[start..]);
            signal[start..].copy_from_slice(&tail);
        }

        let histogram = line.iter().zip(&signal).map(|(l, s)| l - s).collect();

        MacdOutput {
            line,
            signal,
            histogram,
        }
    }
}

impl Indicator for Macd {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        match self.output {
            MacdLine::Line => self.slow.lookback(),
            MacdLine::Signal | MacdLine::Histogram => {
                self.slow.lookback() + self.signal.lookback()
            }
        }
    }

    fn compute(&self, closes: &[f64]) -> Vec<f64> {
        let all = self.compute_all(closes);
        match self.output {
            MacdLine::Line => all.line,
            MacdLine::Signal => all.signal,
            MacdLine::Histogram => all.histogram,
        }
    }
}
