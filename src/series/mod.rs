pub mod aligner;

pub use aligner::{Alignment, DailySeries, align};

use chrono::NaiveDateTime;

use crate::error::{AnalysisError, Result};

/// Ordered (timestamp, value) samples. Timestamps are UTC.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeries {
    times: Vec<NaiveDateTime>,
    values: Vec<f64>,
}

impl TimeSeries {
    pub fn new(times: Vec<NaiveDateTime>, values: Vec<f64>) -> Result<Self> {
        if times.len() != values.len() {
            return Err(AnalysisError::MalformedSeries {
                times: times.len(),
                values: values.len(),
            });
        }

        if let Some(index) = times.windows(2).position(|w| w[1] < w[0]) {
            return Err(AnalysisError::UnorderedTimestamps { index: index + 1 });
        }

        Ok(Self { times, values })
    }

    pub fn from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (NaiveDateTime, f64)>,
    {
        let (times, values) = pairs.into_iter().unzip();
        Self::new(times, values)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn times(&self) -> &[NaiveDateTime] {
        &self.times
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDateTime, f64)> + '_ {
        self.times.iter().copied().zip(self.values.iter().copied())
    }
}
