use std::collections::BTreeMap;

use chrono::NaiveDateTime;

use crate::channels::{Channels, Instrument, Wavelength};
use crate::error::{AnalysisError, Result};

/// A `[time][lat][lon]` stack of AOD values for one channel, stored
/// time-major in a flat buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct AodStack {
    n_time: usize,
    n_lat: usize,
    n_lon: usize,
    values: Vec<f64>,
}

impl AodStack {
    pub fn new(n_time: usize, n_lat: usize, n_lon: usize, values: Vec<f64>) -> Result<Self> {
        if values.len() != n_time * n_lat * n_lon {
            return Err(AnalysisError::StackShape {
                expected: n_time * n_lat * n_lon,
                found: values.len(),
            });
        }
        Ok(Self {
            n_time,
            n_lat,
            n_lon,
            values,
        })
    }

    /// Builds a stack from `[time][lat][lon]` nested rows.
    pub fn from_frames(frames: &[Vec<Vec<f64>>]) -> Result<Self> {
        let n_time = frames.len();
        let n_lat = frames.first().map_or(0, |f| f.len());
        let n_lon = frames
            .first()
            .and_then(|f| f.first())
            .map_or(0, |row| row.len());
        let values: Vec<f64> = frames.iter().flatten().flatten().copied().collect();
        Self::new(n_time, n_lat, n_lon, values)
    }

    pub fn n_time(&self) -> usize {
        self.n_time
    }

    pub fn shape(&self) -> (usize, usize, usize) {
        (self.n_time, self.n_lat, self.n_lon)
    }

    pub fn value(&self, t: usize, lat: usize, lon: usize) -> f64 {
        self.values[(t * self.n_lat + lat) * self.n_lon + lon]
    }

    /// Full time series of one cell.
    pub fn cell_series(&self, lat: usize, lon: usize) -> Vec<f64> {
        (0..self.n_time).map(|t| self.value(t, lat, lon)).collect()
    }

    /// Appends the time steps of `other`, which must cover the same cells.
    pub fn append(&mut self, other: &AodStack) -> Result<()> {
        if self.n_time == 0 && self.values.is_empty() {
            *self = other.clone();
            return Ok(());
        }
        if (self.n_lat, self.n_lon) != (other.n_lat, other.n_lon) {
            return Err(AnalysisError::StackShape {
                expected: self.n_lat * self.n_lon,
                found: other.n_lat * other.n_lon,
            });
        }
        self.values.extend_from_slice(&other.values);
        self.n_time += other.n_time;
        Ok(())
    }
}

/// Gridded surface AOD for one file: paired coordinate arrays, a time axis
/// and one stack per channel.
#[derive(Debug, Clone)]
pub struct SurfaceAod {
    times: Vec<NaiveDateTime>,
    lons: Vec<f64>,
    lats: Vec<f64>,
    stacks: BTreeMap<Wavelength, AodStack>,
}

impl SurfaceAod {
    pub fn new(
        times: Vec<NaiveDateTime>,
        lons: Vec<f64>,
        lats: Vec<f64>,
        stacks: BTreeMap<Wavelength, AodStack>,
    ) -> Result<Self> {
        if lons.len() != lats.len() {
            return Err(AnalysisError::CoordinateLengthMismatch {
                lon: lons.len(),
                lat: lats.len(),
            });
        }

        let channels = Channels::new(Instrument::Cams);
        for (&wavelength, stack) in &stacks {
            if !channels.supports(wavelength) {
                return Err(AnalysisError::UnsupportedChannel(wavelength));
            }
            let expected = (times.len(), lats.len(), lons.len());
            if stack.shape() != expected {
                return Err(AnalysisError::StackShape {
                    expected: expected.0 * expected.1 * expected.2,
                    found: stack.values.len(),
                });
            }
        }

        Ok(Self {
            times,
            lons,
            lats,
            stacks,
        })
    }

    pub fn times(&self) -> &[NaiveDateTime] {
        &self.times
    }

    pub fn lons(&self) -> &[f64] {
        &self.lons
    }

    pub fn lats(&self) -> &[f64] {
        &self.lats
    }

    pub fn dimension(&self) -> usize {
        self.lons.len()
    }

    /// Nearest (lon, lat) indices to a point.
    pub fn spatial_index(&self, lon: f64, lat: f64) -> (usize, usize) {
        (nearest(&self.lons, lon), nearest(&self.lats, lat))
    }

    pub fn stack(&self, wavelength: Wavelength) -> Result<&AodStack> {
        self.stacks
            .get(&wavelength)
            .ok_or(AnalysisError::UnsupportedChannel(wavelength))
    }

    /// Time series of the cell nearest to (lon, lat).
    pub fn timeseries_at(&self, wavelength: Wavelength, lon: f64, lat: f64) -> Result<Vec<f64>> {
        let stack = self.stack(wavelength)?;
        let (lon_idx, lat_idx) = self.spatial_index(lon, lat);
        Ok(stack.cell_series(lat_idx, lon_idx))
    }

    pub fn same_coordinates(&self, other: &SurfaceAod) -> bool {
        self.lons == other.lons && self.lats == other.lats
    }
}

fn nearest(values: &[f64], target: f64) -> usize {
    values
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| (*a - target).abs().total_cmp(&(*b - target).abs()))
        .map(|(i, _)| i)
        .unwrap_or(0)
}
