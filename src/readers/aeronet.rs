use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use tracing::{debug, info, warn};

use super::{ReadError, StationLookup, StationRecord, StationRepository, StationSource};
use crate::channels::{Channels, Instrument, MISSING_VALUE, Wavelength};
use crate::series::TimeSeries;

const DATE_COLUMN: usize = 1;
const TIME_COLUMN: usize = 2;

// Column position of each AOD channel in a headerless station record
const AOD_COLUMNS: &[(Wavelength, usize)] = &[
    (1640, 5),
    (1020, 6),
    (870, 7),
    (865, 8),
    (779, 9),
    (675, 10),
    (667, 11),
    (620, 12),
    (560, 13),
    (555, 14),
    (551, 15),
    (532, 16),
    (531, 17),
    (510, 18),
    (500, 19),
    (490, 20),
    (443, 21),
    (440, 22),
    (412, 23),
    (400, 24),
    (380, 25),
    (340, 26),
    (681, 28),
    (709, 29),
];

fn aod_column(wavelength: Wavelength) -> Option<usize> {
    AOD_COLUMNS
        .iter()
        .find(|(w, _)| *w == wavelength)
        .map(|(_, col)| *col)
}

/// Reads `<station_dir>/<site>.dat` AERONET records.
#[derive(Debug, Clone)]
pub struct AeronetReader {
    station_dir: PathBuf,
    columns: Vec<(Wavelength, usize)>,
}

impl AeronetReader {
    /// Reader for the temporal-analysis candidate channels.
    pub fn new<P: Into<PathBuf>>(station_dir: P) -> Self {
        let wavelengths = Channels::new(Instrument::Aeronet).wavelengths().to_vec();
        let columns = wavelengths
            .into_iter()
            .filter_map(|w| aod_column(w).map(|c| (w, c)))
            .collect();
        Self {
            station_dir: station_dir.into(),
            columns,
        }
    }

    pub fn with_channels<P: Into<PathBuf>>(
        station_dir: P,
        wavelengths: &[Wavelength],
    ) -> Result<Self, ReadError> {
        let columns = wavelengths
            .iter()
            .map(|&w| {
                aod_column(w)
                    .map(|c| (w, c))
                    .ok_or(ReadError::UnknownStationChannel(w))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            station_dir: station_dir.into(),
            columns,
        })
    }

    pub fn path_for_site(&self, site_name: &str) -> PathBuf {
        self.station_dir.join(format!("{}.dat", site_name))
    }

    /// Parses every channel of a station file. Rows whose date or time does
    /// not parse are skipped; unparsable values count as missing.
    pub fn read_channels(&self, path: &Path) -> Result<BTreeMap<Wavelength, TimeSeries>, ReadError> {
        let csv_error = |source| ReadError::Csv {
            path: path.display().to_string(),
            source,
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)
            .map_err(csv_error)?;

        let mut rows: Vec<(NaiveDateTime, Vec<f64>)> = Vec::new();
        let mut skipped = 0usize;
        for record in reader.records() {
            let record = record.map_err(csv_error)?;
            let Some(timestamp) = parse_timestamp(record.get(DATE_COLUMN), record.get(TIME_COLUMN))
            else {
                skipped += 1;
                continue;
            };

            let values = self
                .columns
                .iter()
                .map(|(_, col)| {
                    record
                        .get(*col)
                        .and_then(|v| v.trim().parse::<f64>().ok())
                        .unwrap_or(MISSING_VALUE)
                })
                .collect();
            rows.push((timestamp, values));
        }

        if skipped > 0 {
            debug!(path = %path.display(), skipped, "skipped rows without a valid timestamp");
        }

        // Records are usually chronological already
        rows.sort_by_key(|(t, _)| *t);
        let times: Vec<NaiveDateTime> = rows.iter().map(|(t, _)| *t).collect();

        let mut channels = BTreeMap::new();
        for (idx, (wavelength, _)) in self.columns.iter().enumerate() {
            let values = rows.iter().map(|(_, v)| v[idx]).collect();
            let series = TimeSeries::new(times.clone(), values).map_err(|e| ReadError::Malformed {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
            channels.insert(*wavelength, series);
        }

        Ok(channels)
    }
}

fn parse_timestamp(date: Option<&str>, time: Option<&str>) -> Option<NaiveDateTime> {
    let date = NaiveDate::parse_from_str(date?.trim(), "%d:%m:%Y").ok()?;
    let time = NaiveTime::parse_from_str(time?.trim(), "%H:%M:%S").ok()?;
    Some(date.and_time(time))
}

/// Station lookup combining the metadata repository with station files.
#[derive(Debug, Clone)]
pub struct AeronetStations {
    repository: StationRepository,
    reader: AeronetReader,
}

impl AeronetStations {
    pub fn new(repository: StationRepository, reader: AeronetReader) -> Self {
        Self { repository, reader }
    }
}

impl StationSource for AeronetStations {
    fn lookup(&self, site_name: &str) -> Result<StationLookup, ReadError> {
        let path = self.reader.path_for_site(site_name);
        if !path.exists() {
            info!(site = site_name, path = %path.display(), "no station file for site");
            return Ok(StationLookup::NotFound);
        }
        info!(path = %path.display(), "reading station measurements");

        let Some(site) = self.repository.find(site_name)? else {
            warn!(site = site_name, "station file exists but the site has no metadata entry");
            return Ok(StationLookup::NotFound);
        };

        let channels = self.reader.read_channels(&path)?;
        Ok(StationLookup::Found(StationRecord { site, channels }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    // Builds a 30-column record with the given 440 and 443 nm values
    fn record(date: &str, time: &str, aod_440: &str, aod_443: &str) -> String {
        let mut fields = vec!["-999".to_string(); 30];
        fields[0] = "Tamanrasset_TMP".to_string();
        fields[1] = date.to_string();
        fields[2] = time.to_string();
        fields[21] = aod_443.to_string();
        fields[22] = aod_440.to_string();
        fields.join(",")
    }

    #[test]
    fn test_read_channels() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Tamanrasset_TMP.dat");
        let lines = [
            record("02:01:2019", "10:00:30", "0.25", "-999"),
            "not,a,record".to_string(),
            record("01:01:2019", "09:15:00", "0.21", "0.22"),
            record("02:01:2019", "10:01:10", "N/A", "0.30"),
        ];
        fs::write(&path, lines.join("\n")).unwrap();

        let reader = AeronetReader::new(dir.path());
        let channels = reader.read_channels(&path).unwrap();

        assert_eq!(channels.len(), 5);
        let aod_440 = &channels[&440];
        assert_eq!(aod_440.len(), 3);
        // Sorted chronologically
        assert_eq!(aod_440.values(), &[0.21, 0.25, MISSING_VALUE]);
        assert_eq!(channels[&443].values(), &[0.22, MISSING_VALUE, 0.30]);
        assert!(channels[&412].values().iter().all(|v| *v == MISSING_VALUE));
    }

    #[test]
    fn test_unknown_channel_is_rejected() {
        assert!(matches!(
            AeronetReader::with_channels("data", &[440, 1234]),
            Err(ReadError::UnknownStationChannel(1234))
        ));
        assert!(AeronetReader::with_channels("data", &[500, 870]).is_ok());
    }

    #[test]
    fn test_lookup() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("Tamanrasset_TMP.dat"),
            record("01:01:2019", "09:15:00", "0.21", "0.22"),
        )
        .unwrap();
        fs::write(
            dir.path().join("Orphan.dat"),
            record("01:01:2019", "09:15:00", "0.21", "0.22"),
        )
        .unwrap();

        let repository = StationRepository::from_entries([("Tamanrasset_TMP ", 5.53, 22.79)]);
        let stations = AeronetStations::new(repository, AeronetReader::new(dir.path()));

        match stations.lookup("Tamanrasset_TMP").unwrap() {
            StationLookup::Found(record) => {
                assert_eq!(record.site.name(), "Tamanrasset_TMP");
                assert!(!record.is_empty());
            }
            StationLookup::NotFound => panic!("expected a station record"),
        }

        assert!(matches!(
            stations.lookup("Banizoumbou").unwrap(),
            StationLookup::NotFound
        ));
        assert!(matches!(
            stations.lookup("Orphan").unwrap(),
            StationLookup::NotFound
        ));
    }
}
