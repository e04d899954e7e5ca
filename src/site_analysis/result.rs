use std::collections::BTreeMap;

use serde::Serialize;

use crate::channels::Wavelength;
use crate::config::Season;
use crate::variability::{ContourPolygon, TemporalOutcome};

/// Outcome of one site analysis, ready to be serialized.
///
/// A failed analysis only carries the site name and `success: false`.
#[derive(Debug, Clone, Serialize)]
pub struct SiteResult {
    site_name: String,
    success: bool,
    #[serde(flatten)]
    analysis: Option<SiteAnalysis>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SiteAnalysis {
    pub site_lon: f64,
    pub site_lat: f64,
    pub season: Season,
    pub num_of_matched_months: usize,
    pub grid_wavelength: Wavelength,
    /// Pearson r, `[lat][lon]`, `None` where undefined
    pub spatial_corr: Vec<Vec<Option<f64>>>,
    pub p_vals: Vec<Vec<Option<f64>>>,
    pub longitudes: Vec<f64>,
    pub latitudes: Vec<f64>,
    /// Keyed by threshold with three decimals
    pub contours: BTreeMap<String, ContourPolygon>,
    pub temporal_corr: TemporalOutcome,
}

pub fn threshold_key(threshold: f64) -> String {
    format!("{:.3}", threshold)
}

impl SiteResult {
    pub fn failure(site_name: impl Into<String>) -> Self {
        Self {
            site_name: site_name.into(),
            success: false,
            analysis: None,
        }
    }

    pub fn success(site_name: impl Into<String>, analysis: SiteAnalysis) -> Self {
        Self {
            site_name: site_name.into(),
            success: true,
            analysis: Some(analysis),
        }
    }

    pub fn site_name(&self) -> &str {
        &self.site_name
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn analysis(&self) -> Option<&SiteAnalysis> {
        self.analysis.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_has_no_other_keys() {
        let value = serde_json::to_value(SiteResult::failure("Dakar")).unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 2);
        assert_eq!(value["success"], false);
        assert_eq!(value["site_name"], "Dakar");
    }

    #[test]
    fn test_success_is_flattened() {
        let analysis = SiteAnalysis {
            site_lon: 5.5,
            site_lat: 22.8,
            season: Season::Djf,
            num_of_matched_months: 1,
            grid_wavelength: 469,
            spatial_corr: vec![vec![Some(1.0), None]],
            p_vals: vec![vec![Some(0.0), None]],
            longitudes: vec![5.0, 6.0],
            latitudes: vec![22.0, 23.0],
            contours: BTreeMap::from([(
                threshold_key(0.99),
                ContourPolygon {
                    threshold: 0.99,
                    lon: vec![5.0, 5.1, 5.0],
                    lat: vec![22.0, 22.1, 22.0],
                    area: 12.5,
                },
            )]),
            temporal_corr: TemporalOutcome::Unavailable {
                tried: vec![440],
                lags: vec![0],
            },
        };

        let value = serde_json::to_value(SiteResult::success("Tamanrasset_TMP", analysis)).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["season"], "DJF");
        assert_eq!(value["spatial_corr"][0][1], serde_json::Value::Null);
        assert_eq!(value["contours"]["0.990"]["area"], 12.5);
        assert!(value["contours"]["0.990"].get("threshold").is_none());
        assert_eq!(value["temporal_corr"]["status"], "unavailable");
    }
}
