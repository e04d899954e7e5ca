use serde::Deserialize;
use serde::Deserializer;
use serde::de::Error;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::channels::{Channels, Instrument, Wavelength};

pub mod error;
pub use error::ConfigError;

pub mod season;
pub use season::Season;

const DEFAULT_LAG_MIN: i64 = -60;
const DEFAULT_LAG_MAX: i64 = 60;
const DEFAULT_GRID_WAVELENGTH: Wavelength = 469;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    metadata_path: PathBuf,
    station_dir: PathBuf,
    grid_dir: PathBuf,
    results_dir: PathBuf,
    lag_min: i64,
    lag_max: i64,
    grid_wavelength: Wavelength,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            metadata_path: PathBuf::from("data/aeronet_metadata.csv"),
            station_dir: PathBuf::from("data/aeronet"),
            grid_dir: PathBuf::from("data/ecmwf"),
            results_dir: PathBuf::from("results"),
            lag_min: DEFAULT_LAG_MIN,
            lag_max: DEFAULT_LAG_MAX,
            grid_wavelength: DEFAULT_GRID_WAVELENGTH,
        }
    }
}

// Deserializes a Config, filling in defaults and checking that the lag window
// is not empty and that the grid channel exists in the reanalysis product.
impl<'de> Deserialize<'de> for Config {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct ConfigHelper {
            metadata_path: Option<PathBuf>,
            station_dir: Option<PathBuf>,
            grid_dir: Option<PathBuf>,
            results_dir: Option<PathBuf>,
            lag_min: Option<i64>,
            lag_max: Option<i64>,
            grid_wavelength: Option<Wavelength>,
        }

        let helper = ConfigHelper::deserialize(deserializer)?;
        let defaults = Config::default();

        let lag_min = helper.lag_min.unwrap_or(DEFAULT_LAG_MIN);
        let lag_max = helper.lag_max.unwrap_or(DEFAULT_LAG_MAX);
        if lag_min >= lag_max {
            return Err(D::Error::custom(ConfigError::LagRange {
                min: lag_min,
                max: lag_max,
            }));
        }

        let grid_wavelength = helper.grid_wavelength.unwrap_or(DEFAULT_GRID_WAVELENGTH);
        let channels = Channels::new(Instrument::Cams);
        if !channels.supports(grid_wavelength) {
            return Err(D::Error::custom(ConfigError::GridChannel {
                requested: grid_wavelength,
                closest: channels.closest_band(grid_wavelength),
            }));
        }

        Ok(Config {
            metadata_path: helper.metadata_path.unwrap_or(defaults.metadata_path),
            station_dir: helper.station_dir.unwrap_or(defaults.station_dir),
            grid_dir: helper.grid_dir.unwrap_or(defaults.grid_dir),
            results_dir: helper.results_dir.unwrap_or(defaults.results_dir),
            lag_min,
            lag_max,
            grid_wavelength,
        })
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);

        let config: Config = serde_json::from_reader(reader)?;

        Ok(config)
    }

    pub fn metadata_path(&self) -> &Path {
        &self.metadata_path
    }

    pub fn station_dir(&self) -> &Path {
        &self.station_dir
    }

    pub fn grid_dir(&self) -> &Path {
        &self.grid_dir
    }

    pub fn results_dir(&self) -> &Path {
        &self.results_dir
    }

    pub fn grid_wavelength(&self) -> Wavelength {
        self.grid_wavelength
    }

    /// Temporal lags in minutes, upper bound excluded.
    pub fn lags(&self) -> Vec<i64> {
        (self.lag_min..self.lag_max).collect()
    }
}
