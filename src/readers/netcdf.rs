use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use gdal::{Dataset, Metadata};
use tracing::debug;

use super::discovery::find_grid_files;
use super::{GridFile, GridSource, ReadError};
use crate::channels::{Channels, Instrument, Wavelength};
use crate::error::AnalysisError;
use crate::grid::{AodStack, SurfaceAod};

const TIME_METADATA_KEY: &str = "NETCDF_DIM_time";

// Reanalysis time axis is in hours since 1900-01-01 00:00
fn epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1900, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

/// `None` for non-finite or out-of-range values, such as a fill value left
/// in the time axis.
pub fn hours_to_datetime(hours: f64) -> Option<NaiveDateTime> {
    let millis = (hours * 3_600_000.0).round();
    if !millis.is_finite() || millis.abs() >= i64::MAX as f64 {
        return None;
    }
    let delta = TimeDelta::try_milliseconds(millis as i64)?;
    epoch().checked_add_signed(delta)
}

fn variable_name(wavelength: Wavelength) -> String {
    format!("aod{}", wavelength)
}

fn gdal_path(path: &Path, variable: &str) -> String {
    format!("NETCDF:\"{}\":{}", path.display(), variable)
}

struct Variable {
    times: Vec<NaiveDateTime>,
    lons: Vec<f64>,
    lats: Vec<f64>,
    stack: AodStack,
}

/// Surface AOD files read through GDAL's netCDF driver, one subdataset per
/// channel.
#[derive(Debug, Clone)]
pub struct NetcdfGridReader {
    base_dir: PathBuf,
    channels: Vec<Wavelength>,
}

impl NetcdfGridReader {
    pub fn new<P: Into<PathBuf>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.into(),
            channels: Channels::new(Instrument::Cams).wavelengths().to_vec(),
        }
    }

    /// Restricts loading to the given channels, which must all be gridded.
    pub fn with_channels<P: Into<PathBuf>>(
        base_dir: P,
        channels: &[Wavelength],
    ) -> Result<Self, AnalysisError> {
        let supported = Channels::new(Instrument::Cams);
        if let Some(&w) = channels.iter().find(|w| !supported.supports(**w)) {
            return Err(AnalysisError::UnsupportedChannel(w));
        }
        Ok(Self {
            base_dir: base_dir.into(),
            channels: channels.to_vec(),
        })
    }

    fn read_variable(&self, path: &Path, wavelength: Wavelength) -> Result<Variable, ReadError> {
        let dataset = Dataset::open(gdal_path(path, &variable_name(wavelength)))?;
        let (width, height) = dataset.raster_size();
        let geotransform = dataset.geo_transform()?;

        // Cell centres from the geotransform
        let lons = (0..width)
            .map(|i| geotransform[0] + (i as f64 + 0.5) * geotransform[1])
            .collect();
        let lats = (0..height)
            .map(|j| geotransform[3] + (j as f64 + 0.5) * geotransform[5])
            .collect();

        let n_bands = dataset.raster_count();
        let mut times = Vec::with_capacity(n_bands);
        let mut values = Vec::with_capacity(n_bands * width * height);

        for idx in 1..=n_bands {
            let band = dataset.rasterband(idx)?;

            let time = band
                .metadata_item(TIME_METADATA_KEY, "")
                .and_then(|v| v.trim().parse::<f64>().ok())
                .and_then(hours_to_datetime)
                .ok_or_else(|| ReadError::MissingTime {
                    path: path.display().to_string(),
                    band: idx,
                })?;
            times.push(time);

            let scale = band.scale().unwrap_or(1.0);
            let offset = band.offset().unwrap_or(0.0);
            let no_data = band.no_data_value();

            let buffer = band.read_as::<f64>((0, 0), (width, height), (width, height), None)?;
            values.extend(buffer.data().iter().map(|&raw| {
                if no_data.is_some_and(|nd| raw == nd) {
                    f64::NAN
                } else {
                    raw * scale + offset
                }
            }));
        }

        let stack = AodStack::new(n_bands, height, width, values).map_err(|e| {
            ReadError::Malformed {
                path: path.display().to_string(),
                message: e.to_string(),
            }
        })?;

        Ok(Variable {
            times,
            lons,
            lats,
            stack,
        })
    }
}

impl GridSource for NetcdfGridReader {
    fn discover(&self, site_name: &str) -> Result<Vec<GridFile>, ReadError> {
        let files = find_grid_files(&self.base_dir, site_name)?;
        debug!(site = site_name, files = files.len(), "grid files discovered");
        Ok(files)
    }

    fn load(&self, path: &Path) -> Result<SurfaceAod, ReadError> {
        let malformed = |message: String| ReadError::Malformed {
            path: path.display().to_string(),
            message,
        };

        let mut stacks = BTreeMap::new();
        let mut axes: Option<(Vec<NaiveDateTime>, Vec<f64>, Vec<f64>)> = None;

        for &wavelength in &self.channels {
            let variable = self.read_variable(path, wavelength)?;
            if let Some((times, lons, lats)) = &axes {
                if *times != variable.times || *lons != variable.lons || *lats != variable.lats {
                    return Err(malformed(format!(
                        "{} does not share the axes of the other channels",
                        variable_name(wavelength)
                    )));
                }
            } else {
                axes = Some((variable.times, variable.lons, variable.lats));
            }
            stacks.insert(wavelength, variable.stack);
        }

        let (times, lons, lats) = axes.ok_or_else(|| malformed("no channel requested".into()))?;
        debug!(path = %path.display(), steps = times.len(), cells = lons.len(), "grid file loaded");

        SurfaceAod::new(times, lons, lats, stacks).map_err(|e| malformed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hours_to_datetime() {
        let t = hours_to_datetime(24.0 * 365.0);
        assert_eq!(
            t,
            NaiveDate::from_ymd_opt(1901, 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0))
        );

        let t = hours_to_datetime(1_043_856.5).unwrap();
        assert_eq!(t.format("%Y-%m-%d %H:%M").to_string(), "2019-01-31 00:30");
    }

    #[test]
    fn test_fill_value_time_is_rejected() {
        assert_eq!(hours_to_datetime(9.96921e36), None);
        assert_eq!(hours_to_datetime(-9.96921e36), None);
        assert_eq!(hours_to_datetime(f64::NAN), None);
        // Beyond chrono's range but within i64 milliseconds
        assert_eq!(hours_to_datetime(1.0e12), None);
    }

    #[test]
    fn test_gdal_path() {
        assert_eq!(
            gdal_path(Path::new("/data/Dakar_2019_1.nc"), &variable_name(469)),
            "NETCDF:\"/data/Dakar_2019_1.nc\":aod469"
        );
    }

    #[test]
    fn test_rejects_ungridded_channel() {
        assert!(NetcdfGridReader::with_channels("data/ecmwf", &[469, 550]).is_ok());
        assert!(NetcdfGridReader::with_channels("data/ecmwf", &[440]).is_err());
    }

    #[test]
    fn test_missing_file_is_a_gdal_error() {
        let reader = NetcdfGridReader::new("data/ecmwf");
        assert!(matches!(
            reader.load(Path::new("/nonexistent/Dakar_2019_1.nc")),
            Err(ReadError::Gdal(_))
        ));
    }
}
