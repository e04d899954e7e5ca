use thiserror::Error;

use crate::channels::Wavelength;
use crate::readers::ReadError;

pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Errors that abort a site analysis.
///
/// Expected "no data" conditions (unknown site, no grid files, empty
/// channels) are not errors; they are reported inside the result.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("reference series has {reference} samples but the grid stack has {grid} time steps")]
    SeriesLengthMismatch { reference: usize, grid: usize },

    #[error("{0} nm is not provided by the gridded product")]
    UnsupportedChannel(Wavelength),

    #[error("longitude and latitude arrays differ in length ({lon} vs {lat})")]
    CoordinateLengthMismatch { lon: usize, lat: usize },

    #[error("grid file {path} does not share the coordinates of the first matched file")]
    InconsistentGrid { path: String },

    #[error("AOD stack holds {found} values where {expected} were expected")]
    StackShape { expected: usize, found: usize },

    #[error("series has {times} timestamps but {values} values")]
    MalformedSeries { times: usize, values: usize },

    #[error("timestamps are not ordered at index {index}")]
    UnorderedTimestamps { index: usize },

    #[error("invalid site coordinates: {0}")]
    InvalidSite(String),

    #[error(transparent)]
    Read(#[from] ReadError),

    #[error("failed to persist results: {0}")]
    Sink(String),
}
