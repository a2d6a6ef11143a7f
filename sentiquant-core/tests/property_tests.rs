//! Property tests for normalization and indicator invariants.
//!
//! Uses proptest to verify:
//! 1. Idempotence: normalizing an already-clean series changes nothing
//! 2. Prefix policy: BackFill leaves no gaps, LeaveUndefined leaves exactly the warmup
//! 3. Return exclusion: first row has no return, the other n-1 do
//! 4. Sentiment classes are monotone in the score

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use sentiquant_core::data::{Normalizer, RawTable};
use sentiquant_core::domain::{DerivedColumn, EntityId, NewsRecord, PriceRecord, PriceSeries};
use sentiquant_core::indicators::{IndicatorEngine, IndicatorParams, PrefixPolicy};
use sentiquant_core::sentiment::SentimentClass;

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_price() -> impl Strategy<Value = f64> {
    (1.0..500.0_f64).prop_map(|p| (p * 100.0).round() / 100.0)
}

fn arb_closes(max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(arb_price(), 0..max_len)
}

fn series_from(closes: &[f64], offsets: &[i64]) -> PriceSeries {
    let start = Utc.with_ymd_and_hms(2020, 1, 2, 0, 0, 0).unwrap();
    let records = closes
        .iter()
        .zip(offsets)
        .map(|(&close, &minutes)| PriceRecord {
            entity_id: EntityId::new("SPY"),
            timestamp: start + Duration::minutes(minutes),
            open: close,
            high: close * 1.01,
            low: close * 0.99,
            close,
            volume: (close * 1000.0).round(),
            adj_close: Some(close),
        })
        .collect();
    PriceSeries::new(EntityId::new("SPY"), records)
}

fn params(ma: usize, rsi: usize, policy: PrefixPolicy) -> IndicatorParams {
    IndicatorParams {
        ma_window: ma,
        rsi_period: rsi,
        macd_fast: 3,
        macd_slow: 6,
        macd_signal: 4,
        prefix_policy: policy,
    }
}

// ── 1. Idempotence ──────────────────────────────────────────────────

proptest! {
    #[test]
    fn price_normalization_is_idempotent(
        rows in prop::collection::vec((arb_price(), 0..10_000_i64), 0..60),
    ) {
        let (closes, offsets): (Vec<f64>, Vec<i64>) = rows.into_iter().unzip();
        let clean = series_from(&closes, &offsets);

        let once = Normalizer::prices(RawTable::from_prices(&clean), "SPY").unwrap();
        prop_assert_eq!(once.report.dropped(), 0);
        prop_assert_eq!(once.data.records(), clean.records());

        let twice = Normalizer::prices(RawTable::from_prices(&once.data), "SPY").unwrap();
        prop_assert_eq!(twice.data.records(), once.data.records());
    }

    #[test]
    fn news_normalization_is_idempotent(
        items in prop::collection::vec(("[A-Za-z]{1,12}( [A-Za-z]{1,12}){0,6}", 0..5_000_i64, prop::option::of("[A-Za-z]{1,10}")), 0..30),
    ) {
        let start = Utc.with_ymd_and_hms(2020, 6, 1, 0, 0, 0).unwrap();
        let news: Vec<NewsRecord> = items
            .into_iter()
            .map(|(headline, minutes, publisher)| NewsRecord {
                headline,
                publisher,
                timestamp: start + Duration::minutes(minutes),
                entity_id: Some(EntityId::new("AAPL")),
                url: None,
            })
            .collect();

        let once = Normalizer::news(RawTable::from_news(&news)).unwrap().data;
        let twice = Normalizer::news(RawTable::from_news(&once)).unwrap().data;
        prop_assert_eq!(&twice, &once);
    }
}

// ── 2. Prefix policy ────────────────────────────────────────────────

proptest! {
    #[test]
    fn back_fill_leaves_no_gaps_once_defined(
        closes in arb_closes(80),
        ma in 1..30_usize,
        rsi in 1..20_usize,
    ) {
        let offsets: Vec<i64> = (0..closes.len() as i64).map(|i| i * 1440).collect();
        let mut series = series_from(&closes, &offsets);
        IndicatorEngine::new(params(ma, rsi, PrefixPolicy::BackFill))
            .unwrap()
            .apply(&mut series)
            .unwrap();

        for column in [
            DerivedColumn::MovingAverage,
            DerivedColumn::Rsi,
            DerivedColumn::Macd,
            DerivedColumn::MacdSignal,
            DerivedColumn::MacdHistogram,
        ] {
            let values = series.column(column).unwrap();
            let defined = values.iter().filter(|v| v.is_some()).count();
            prop_assert!(
                defined == 0 || defined == values.len(),
                "{} has {} of {} defined", column, defined, values.len()
            );
        }
    }

    #[test]
    fn leave_undefined_prefix_is_exactly_the_warmup(
        closes in arb_closes(80),
        ma in 1..30_usize,
    ) {
        let offsets: Vec<i64> = (0..closes.len() as i64).map(|i| i * 1440).collect();
        let mut series = series_from(&closes, &offsets);
        IndicatorEngine::new(params(ma, 5, PrefixPolicy::LeaveUndefined))
            .unwrap()
            .apply(&mut series)
            .unwrap();

        let values = series.column(DerivedColumn::MovingAverage).unwrap();
        for (i, v) in values.iter().enumerate() {
            prop_assert_eq!(v.is_none(), i + 1 < ma);
        }
    }
}

// ── 3. Return exclusion ─────────────────────────────────────────────

proptest! {
    #[test]
    fn first_return_excluded(closes in arb_closes(60)) {
        prop_assume!(!closes.is_empty());
        let offsets: Vec<i64> = (0..closes.len() as i64).map(|i| i * 1440).collect();
        let mut series = series_from(&closes, &offsets);
        IndicatorEngine::new(IndicatorParams::default())
            .unwrap()
            .apply(&mut series)
            .unwrap();

        let returns = series.column(DerivedColumn::Returns).unwrap();
        prop_assert!(returns[0].is_none());
        prop_assert_eq!(returns.iter().filter(|r| r.is_some()).count(), closes.len() - 1);
    }
}

// ── 4. Sentiment monotonicity ───────────────────────────────────────

fn rank(class: SentimentClass) -> u8 {
    match class {
        SentimentClass::StrongNegative => 0,
        SentimentClass::Negative => 1,
        SentimentClass::Neutral => 2,
        SentimentClass::Positive => 3,
    }
}

proptest! {
    #[test]
    fn sentiment_class_is_monotone(a in -1.0..=1.0_f64, b in -1.0..=1.0_f64) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(rank(SentimentClass::from_score(lo)) <= rank(SentimentClass::from_score(hi)));
    }
}
