use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::channels::{Channels, Instrument, Wavelength};
use crate::series::{Alignment, DailySeries, TimeSeries, align};
use crate::stats::{nan_mean, pearson_pairwise};

/// Default lag window in minutes, `-60..60`.
pub fn default_lags() -> Vec<i64> {
    (-60..60).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TemporalOutcome {
    Available {
        wavelength: Wavelength,
        /// Mean autocorrelation per lag, `None` when no day defines it
        corr: Vec<Option<f64>>,
        lags: Vec<i64>,
    },
    Unavailable {
        tried: Vec<Wavelength>,
        lags: Vec<i64>,
    },
}

impl TemporalOutcome {
    pub fn is_available(&self) -> bool {
        matches!(self, TemporalOutcome::Available { .. })
    }
}

#[derive(Debug, Clone)]
pub struct TemporalVariabilityEngine {
    lags: Vec<i64>,
    candidates: Vec<Wavelength>,
}

impl Default for TemporalVariabilityEngine {
    fn default() -> Self {
        Self::new(default_lags())
    }
}

impl TemporalVariabilityEngine {
    pub fn new(lags: Vec<i64>) -> Self {
        Self {
            lags,
            candidates: Channels::new(Instrument::Aeronet).wavelengths().to_vec(),
        }
    }

    pub fn lags(&self) -> &[i64] {
        &self.lags
    }

    /// Runs the analysis on the first candidate channel that still has data
    /// once missing values are removed.
    pub fn analyse(&self, channels: &BTreeMap<Wavelength, TimeSeries>) -> TemporalOutcome {
        for &wavelength in &self.candidates {
            let Some(series) = channels.get(&wavelength) else {
                debug!(wavelength, "channel not present in station record");
                continue;
            };

            match align(series) {
                Alignment::Available(days) => {
                    info!(wavelength, days = days.len(), "using channel for temporal variability");
                    return TemporalOutcome::Available {
                        wavelength,
                        corr: lag_autocorrelation(&days, &self.lags),
                        lags: self.lags.clone(),
                    };
                }
                Alignment::Unavailable => {
                    info!(wavelength, "channel is unavailable, trying another one");
                }
            }
        }

        warn!(tried = ?self.candidates, "no station channel has usable data");
        TemporalOutcome::Unavailable {
            tried: self.candidates.clone(),
            lags: self.lags.clone(),
        }
    }
}

/// Autocorrelation of a binned series with itself shifted by `lag` bins.
///
/// Only positions where both the value and its shifted partner are present
/// contribute. Lag 0 is exactly 1.0 whenever the series is not constant.
pub fn autocorrelation(bins: &[Option<f64>], lag: i64) -> Option<f64> {
    let shift = lag.unsigned_abs() as usize;
    if shift >= bins.len() {
        return None;
    }
    if shift == 0 {
        return pearson_pairwise(bins, bins).map(|_| 1.0);
    }

    let n = bins.len() - shift;
    pearson_pairwise(&bins[..n], &bins[shift..])
}

/// Per-lag mean of the daily autocorrelations, skipping undefined days.
pub fn lag_autocorrelation(days: &[DailySeries], lags: &[i64]) -> Vec<Option<f64>> {
    let per_day: Vec<Vec<Option<f64>>> = days
        .par_iter()
        .map(|day| {
            lags.iter()
                .map(|&lag| autocorrelation(&day.bins, lag))
                .collect()
        })
        .collect();

    (0..lags.len())
        .map(|i| nan_mean(per_day.iter().map(|day| day[i])))
        .collect()
}
