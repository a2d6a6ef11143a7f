//! Descriptive statistics over cleaned news headlines.

use chrono::{NaiveDate, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::align::Aligner;
use sentiquant_core::domain::NewsRecord;

/// Headline length in characters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LengthStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    /// Sample std (n-1); NaN below two headlines.
    pub std: f64,
    pub min: usize,
    pub max: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsStats {
    /// None when there are no headlines.
    pub headline_length: Option<LengthStats>,
    /// Most active publishers first.
    pub top_publishers: Vec<(String, usize)>,
    pub publisher_domains: Vec<(String, usize)>,
    /// Every day from the first to the last publication, zeros included.
    pub daily_counts: BTreeMap<NaiveDate, usize>,
    /// Articles per hour of day, 0..24.
    pub hourly: Vec<usize>,
}

impl NewsStats {
    pub fn compute(news: &[NewsRecord], aligner: &Aligner, top_n: usize) -> Self {
        let mut top_publishers = publisher_counts(news);
        top_publishers.truncate(top_n);
        Self {
            headline_length: headline_length_stats(news),
            top_publishers,
            publisher_domains: domain_counts(news),
            daily_counts: daily_counts(news, aligner),
            hourly: hourly_histogram(news, aligner),
        }
    }
}

pub fn headline_length_stats(news: &[NewsRecord]) -> Option<LengthStats> {
    let mut lengths: Vec<usize> = news.iter().map(|n| n.headline.chars().count()).collect();
    if lengths.is_empty() {
        return None;
    }
    lengths.sort_unstable();

    let count = lengths.len();
    let mean = lengths.iter().sum::<usize>() as f64 / count as f64;
    let median = if count % 2 == 1 {
        lengths[count / 2] as f64
    } else {
        (lengths[count / 2 - 1] + lengths[count / 2]) as f64 / 2.0
    };
    let std = if count < 2 {
        f64::NAN
    } else {
        let var = lengths
            .iter()
            .map(|&l| (l as f64 - mean).powi(2))
            .sum::<f64>()
            / (count - 1) as f64;
        var.sqrt()
    };

    Some(LengthStats {
        count,
        mean,
        median,
        std,
        min: lengths[0],
        max: lengths[count - 1],
    })
}

fn ranked(counts: HashMap<String, usize>) -> Vec<(String, usize)> {
    let mut out: Vec<(String, usize)> = counts.into_iter().collect();
    out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    out
}

/// Articles per publisher, descending; ties by name. Unattributed news is skipped.
pub fn publisher_counts(news: &[NewsRecord]) -> Vec<(String, usize)> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for publisher in news.iter().filter_map(|n| n.publisher.as_deref()) {
        *counts.entry(publisher.to_string()).or_default() += 1;
    }
    ranked(counts)
}

/// Publisher domains: the text after the last '@', or the whole name.
pub fn domain_counts(news: &[NewsRecord]) -> Vec<(String, usize)> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for publisher in news.iter().filter_map(|n| n.publisher.as_deref()) {
        let domain = publisher.rsplit('@').next().unwrap_or(publisher);
        *counts.entry(domain.to_string()).or_default() += 1;
    }
    ranked(counts)
}

pub fn daily_counts(news: &[NewsRecord], aligner: &Aligner) -> BTreeMap<NaiveDate, usize> {
    let mut observed: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for n in news {
        *observed.entry(aligner.local_date(n.timestamp)).or_default() += 1;
    }
    let (Some(&first), Some(&last)) = (observed.keys().next(), observed.keys().next_back()) else {
        return observed;
    };
    first
        .iter_days()
        .take_while(|d| *d <= last)
        .map(|d| (d, observed.get(&d).copied().unwrap_or(0)))
        .collect()
}

pub fn hourly_histogram(news: &[NewsRecord], aligner: &Aligner) -> Vec<usize> {
    let mut hours = vec![0usize; 24];
    for n in news {
        hours[aligner.localize(n.timestamp).hour() as usize] += 1;
    }
    hours
}
