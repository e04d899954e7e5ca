use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::channels::Wavelength;
use crate::grid::SurfaceAod;
use crate::series::TimeSeries;
use crate::site::Site;

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("GDAL error: {0}")]
    Gdal(#[from] gdal::errors::GdalError),

    #[error("station files have no AOD column for {0} nm")]
    UnknownStationChannel(Wavelength),

    #[error("{path}: band {band} has no time coordinate")]
    MissingTime { path: String, band: usize },

    #[error("{path}: {message}")]
    Malformed { path: String, message: String },

    #[error("invalid station record: {0}")]
    Site(String),
}

/// A station's location and its AOD channels.
#[derive(Debug, Clone)]
pub struct StationRecord {
    pub site: Site,
    pub channels: BTreeMap<Wavelength, TimeSeries>,
}

impl StationRecord {
    /// True when no channel holds any sample.
    pub fn is_empty(&self) -> bool {
        self.channels.values().all(|s| s.is_empty())
    }
}

#[derive(Debug, Clone)]
pub enum StationLookup {
    Found(StationRecord),
    NotFound,
}

/// A gridded file matched for a site, with the year and month parsed from
/// its name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct GridFile {
    pub year: i32,
    pub month: u32,
    pub path: PathBuf,
}

impl GridFile {
    /// `YYYYMM` key used to deduplicate months.
    pub fn year_month(&self) -> String {
        format!("{:04}{:02}", self.year, self.month)
    }
}

pub trait StationSource {
    fn lookup(&self, site_name: &str) -> Result<StationLookup, ReadError>;
}

pub trait GridSource {
    fn discover(&self, site_name: &str) -> Result<Vec<GridFile>, ReadError>;

    fn load(&self, path: &Path) -> Result<SurfaceAod, ReadError>;
}
