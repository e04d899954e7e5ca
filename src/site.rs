use serde::Serialize;

use crate::error::{AnalysisError, Result};

/// A ground station and its location in degrees.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Site {
    name: String,
    lon: f64,
    lat: f64,
}

impl Site {
    pub fn new(name: impl Into<String>, lon: f64, lat: f64) -> Result<Self> {
        if !(-180.0..=180.0).contains(&lon) {
            return Err(AnalysisError::InvalidSite(
                "Longitude values must be between -180 and 180".to_string(),
            ));
        }

        if !(-90.0..=90.0).contains(&lat) {
            return Err(AnalysisError::InvalidSite(
                "Latitude values must be between -90 and 90".to_string(),
            ));
        }

        Ok(Site {
            name: name.into(),
            lon,
            lat,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }
}

#[cfg(test)]
mod test {
    use crate::site::Site;
    #[test]
    fn test_site_coords_are_within_ranges() {
        // Test valid coordinates
        let valid_site = Site::new("Tamanrasset_TMP", 5.53, 22.79);
        assert!(valid_site.is_ok());

        // Test longitude out of range
        assert!(Site::new("x", -200.0, 0.0).is_err());
        assert!(Site::new("x", 200.0, 0.0).is_err());

        // Test latitude out of range
        assert!(Site::new("x", 0.0, -100.0).is_err());
        assert!(Site::new("x", 0.0, 100.0).is_err());

        // NaN is never in range
        assert!(Site::new("x", f64::NAN, 0.0).is_err());
    }
}
