use chrono::{NaiveDate, NaiveDateTime, Timelike};
use tracing::debug;

use super::TimeSeries;
use crate::channels::MISSING_VALUE;

/// One UTC calendar day resampled to contiguous 1-minute bins.
#[derive(Debug, Clone, PartialEq)]
pub struct DailySeries {
    pub day: NaiveDate,
    /// Start of the first bin
    pub start: NaiveDateTime,
    /// Bin means, `None` where no observation fell in the minute
    pub bins: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Alignment {
    Available(Vec<DailySeries>),
    Unavailable,
}

impl Alignment {
    pub fn is_available(&self) -> bool {
        matches!(self, Alignment::Available(_))
    }
}

pub fn is_missing(value: f64) -> bool {
    value == MISSING_VALUE || !value.is_finite()
}

fn floor_minute(t: NaiveDateTime) -> NaiveDateTime {
    t.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(t)
}

/// Drops missing samples, splits by floor-day and averages each day onto a
/// 1-minute grid spanning its first to last observed minute.
pub fn align(series: &TimeSeries) -> Alignment {
    let valid: Vec<(NaiveDateTime, f64)> = series.iter().filter(|(_, v)| !is_missing(*v)).collect();

    if valid.is_empty() {
        return Alignment::Unavailable;
    }

    let mut days = Vec::new();
    for chunk in valid.chunk_by(|a, b| a.0.date() == b.0.date()) {
        days.push(resample_day(chunk));
    }

    debug!(
        samples = valid.len(),
        dropped = series.len() - valid.len(),
        days = days.len(),
        "series aligned to 1-minute bins"
    );

    Alignment::Available(days)
}

// `samples` is non-empty, ordered and within one day
fn resample_day(samples: &[(NaiveDateTime, f64)]) -> DailySeries {
    let start = floor_minute(samples[0].0);
    let end = floor_minute(samples[samples.len() - 1].0);
    let n_bins = (end - start).num_minutes() as usize + 1;

    let mut sums = vec![0.0; n_bins];
    let mut counts = vec![0usize; n_bins];
    for (t, v) in samples {
        let idx = (floor_minute(*t) - start).num_minutes() as usize;
        sums[idx] += v;
        counts[idx] += 1;
    }

    let bins = sums
        .into_iter()
        .zip(counts)
        .map(|(sum, count)| (count > 0).then(|| sum / count as f64))
        .collect();

    DailySeries {
        day: start.date(),
        start,
        bins,
    }
}
