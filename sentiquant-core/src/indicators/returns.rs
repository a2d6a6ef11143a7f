//! Simple and cumulative returns over close prices.
//!
//! returns[t] = close[t] / close[t-1] - 1, undefined at t = 0.
//! cumulative[t] = prod_{k=1..t} (1 + returns[k]), undefined at t = 0.

/// Simple percentage change. The first element is always `None`.
pub fn pct_change(closes: &[f64]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(closes.len());
    if closes.is_empty() {
        return out;
    }
    out.push(None);
    for w in closes.windows(2) {
        let r = w[1] / w[0] - 1.0;
        out.push(r.is_finite().then_some(r));
    }
    out
}

/// Running product of `1 + r`. Undefined returns leave the product unchanged
/// and yield `None` at their own position.
pub fn cumulative_returns(returns: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut growth = 1.0;
    returns
        .iter()
        .map(|r| {
            r.map(|r| {
                growth *= 1.0 + r;
                growth
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::assert_approx;

    #[test]
    fn first_return_is_undefined() {
        let r = pct_change(&[100.0, 110.0, 99.0]);
        assert_eq!(r.len(), 3);
        assert!(r[0].is_none());
        assert_approx(r[1].unwrap(), 0.1, 1e-12);
        assert_approx(r[2].unwrap(), -0.1, 1e-12);
    }

    #[test]
    fn n_minus_one_defined_returns() {
        let closes: Vec<f64> = (1..=10).map(f64::from).collect();
        let r = pct_change(&closes);
        assert_eq!(r.iter().filter(|v| v.is_some()).count(), 9);
    }

    #[test]
    fn empty_and_single() {
        assert!(pct_change(&[]).is_empty());
        assert_eq!(pct_change(&[5.0]), vec![None]);
    }

    #[test]
    fn cumulative_tracks_price_ratio() {
        let closes = [100.0, 102.0, 101.0, 105.0, 108.0];
        let cum = cumulative_returns(&pct_change(&closes));
        assert!(cum[0].is_none());
        for (i, c) in closes.iter().enumerate().skip(1) {
            assert_approx(cum[i].unwrap(), c / closes[0], 1e-12);
        }
    }
}
