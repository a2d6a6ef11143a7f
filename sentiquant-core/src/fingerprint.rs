//! Content fingerprints: deterministic identification of inputs and parameters.
//!
//! - `price_key`: entity label + every record field, in series order.
//! - `news_key`: every news field, in input order.
//! - `params_key`: canonical JSON of any serializable parameter set.
//! - `combine`: order-sensitive key over several keys.
//!
//! Two inputs with the same key are interchangeable for every computation in
//! the workspace, so keys double as memoization keys.

use crate::domain::{ContentKey, NewsRecord, PriceSeries};
use serde::Serialize;

fn update_opt_str(hasher: &mut blake3::Hasher, value: Option<&str>) {
    match value {
        Some(s) => {
            hasher.update(&[1]);
            hasher.update(&(s.len() as u64).to_le_bytes());
            hasher.update(s.as_bytes());
        }
        None => {
            hasher.update(&[0]);
        }
    }
}

fn finish(hasher: blake3::Hasher) -> ContentKey {
    ContentKey(hasher.finalize().to_hex().to_string())
}

/// Key over the records of a price series. Derived columns are ignored.
pub fn price_key(series: &PriceSeries) -> ContentKey {
    let mut hasher = blake3::Hasher::new();
    update_opt_str(&mut hasher, Some(series.entity_id().as_str()));
    for r in series.records() {
        hasher.update(&r.timestamp.timestamp_millis().to_le_bytes());
        for v in [r.open, r.high, r.low, r.close, r.volume] {
            hasher.update(&v.to_bits().to_le_bytes());
        }
        match r.adj_close {
            Some(v) => hasher.update(&[1]).update(&v.to_bits().to_le_bytes()),
            None => hasher.update(&[0]),
        };
    }
    finish(hasher)
}

pub fn news_key(news: &[NewsRecord]) -> ContentKey {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&(news.len() as u64).to_le_bytes());
    for n in news {
        update_opt_str(&mut hasher, Some(&n.headline));
        update_opt_str(&mut hasher, n.publisher.as_deref());
        hasher.update(&n.timestamp.timestamp_millis().to_le_bytes());
        update_opt_str(&mut hasher, n.entity_id.as_ref().map(|e| e.as_str()));
        update_opt_str(&mut hasher, n.url.as_deref());
    }
    finish(hasher)
}

/// Key over the canonical JSON of `params`.
///
/// Map-typed fields must use `BTreeMap` for the JSON to be canonical.
pub fn params_key<T: Serialize>(params: &T) -> Result<ContentKey, serde_json::Error> {
    let json = serde_json::to_string(params)?;
    Ok(ContentKey::from_bytes(json.as_bytes()))
}

pub fn combine(keys: &[&ContentKey]) -> ContentKey {
    let mut hasher = blake3::Hasher::new();
    for key in keys {
        hasher.update(key.0.as_bytes());
        hasher.update(b"|");
    }
    finish(hasher)
}
