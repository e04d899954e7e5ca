use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use super::ReadError;
use crate::site::Site;

#[derive(Debug, Clone, Deserialize)]
struct MetadataRow {
    #[serde(rename = "Site Name")]
    site_name: String,
    #[serde(rename = "Long")]
    lon: f64,
    #[serde(rename = "Lat")]
    lat: f64,
}

/// Station coordinates keyed by site name.
///
/// Names are compared after trimming surrounding whitespace on both sides,
/// since the published metadata pads site names with a trailing space.
#[derive(Debug, Clone, Default)]
pub struct StationRepository {
    rows: Vec<MetadataRow>,
}

impl StationRepository {
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self, ReadError> {
        let path = path.as_ref();
        let csv_error = |source| ReadError::Csv {
            path: path.display().to_string(),
            source,
        };

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_path(path)
            .map_err(csv_error)?;

        let rows = reader
            .deserialize()
            .collect::<Result<Vec<MetadataRow>, _>>()
            .map_err(csv_error)?;

        debug!(path = %path.display(), sites = rows.len(), "station metadata loaded");
        Ok(Self { rows })
    }

    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, f64, f64)>,
        S: Into<String>,
    {
        let rows = entries
            .into_iter()
            .map(|(name, lon, lat)| MetadataRow {
                site_name: name.into(),
                lon,
                lat,
            })
            .collect();
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn find(&self, site_name: &str) -> Result<Option<Site>, ReadError> {
        let key = site_name.trim();
        let Some(row) = self.rows.iter().find(|r| r.site_name.trim() == key) else {
            return Ok(None);
        };

        Site::new(key, row.lon, row.lat)
            .map(Some)
            .map_err(|e| ReadError::Site(format!("{}: {}", key, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_trailing_space_in_metadata_matches() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Site Name,Long,Lat,Elevation").unwrap();
        writeln!(file, "Tamanrasset_TMP ,5.53,22.79,1377").unwrap();
        writeln!(file, "Banizoumbou ,2.665,13.541,250").unwrap();

        let repository = StationRepository::from_csv(file.path()).unwrap();
        assert_eq!(repository.len(), 2);

        let site = repository.find("Tamanrasset_TMP").unwrap().unwrap();
        assert_eq!(site.name(), "Tamanrasset_TMP");
        assert!((site.lon() - 5.53).abs() < 1e-12);
        assert!((site.lat() - 22.79).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_site() {
        let repository = StationRepository::from_entries([("Banizoumbou", 2.665, 13.541)]);
        assert!(repository.find("Tamanrasset").unwrap().is_none());
    }

    #[test]
    fn test_invalid_coordinates_are_reported() {
        let repository = StationRepository::from_entries([("Broken", 500.0, 0.0)]);
        assert!(matches!(repository.find("Broken"), Err(ReadError::Site(_))));
    }
}
