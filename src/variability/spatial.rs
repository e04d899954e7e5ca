use geo::{Contains, Point};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use super::contour::{ContourPath, contour_paths};
use crate::error::{AnalysisError, Result};
use crate::geometry::{area_of_lonlat_polygon, polygon};
use crate::grid::AodStack;
use crate::site::Site;
use crate::stats::{pearson, pearson_p_value};

/// Contour level kept whether or not it encloses the site.
pub const OUTER_LEVEL: f64 = 0.99;

/// 0.6, 0.625, ..., 0.975 followed by the outer level.
pub fn default_levels() -> Vec<f64> {
    let mut levels: Vec<f64> = (0..16).map(|i| 0.6 + 0.025 * i as f64).collect();
    levels.push(OUTER_LEVEL);
    levels
}

/// Pearson r and p-value for every cell, row-major `[lat][lon]`. Undefined
/// cells hold NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationField {
    n_lat: usize,
    n_lon: usize,
    r: Vec<f64>,
    p: Vec<f64>,
}

impl CorrelationField {
    pub fn shape(&self) -> (usize, usize) {
        (self.n_lat, self.n_lon)
    }

    pub fn r(&self) -> &[f64] {
        &self.r
    }

    pub fn p(&self) -> &[f64] {
        &self.p
    }

    pub fn r_at(&self, lat: usize, lon: usize) -> f64 {
        self.r[lat * self.n_lon + lon]
    }

    pub fn p_at(&self, lat: usize, lon: usize) -> f64 {
        self.p[lat * self.n_lon + lon]
    }

    pub fn r_rows(&self) -> Vec<Vec<Option<f64>>> {
        rows(&self.r, self.n_lon)
    }

    pub fn p_rows(&self) -> Vec<Vec<Option<f64>>> {
        rows(&self.p, self.n_lon)
    }
}

fn rows(values: &[f64], width: usize) -> Vec<Vec<Option<f64>>> {
    if width == 0 {
        return Vec::new();
    }
    values
        .chunks(width)
        .map(|row| row.iter().map(|v| v.is_finite().then_some(*v)).collect())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContourPolygon {
    #[serde(skip)]
    pub threshold: f64,
    pub lon: Vec<f64>,
    pub lat: Vec<f64>,
    /// Enclosed area in km²
    pub area: f64,
}

#[derive(Debug, Clone)]
pub struct SpatialVariability {
    pub field: CorrelationField,
    /// Retained contours, highest threshold first
    pub contours: Vec<ContourPolygon>,
}

/// Correlates a reference series with every cell of a stack.
///
/// The reference and the stack are paired by position, so the reference
/// must have exactly one sample per time step of the stack.
pub fn correlation_field(reference: &[f64], stack: &AodStack) -> Result<CorrelationField> {
    let (n_time, n_lat, n_lon) = stack.shape();
    if reference.len() != n_time {
        return Err(AnalysisError::SeriesLengthMismatch {
            reference: reference.len(),
            grid: n_time,
        });
    }

    let cells: Vec<(f64, f64)> = (0..n_lat * n_lon)
        .into_par_iter()
        .map(|k| {
            let series = stack.cell_series(k / n_lon, k % n_lon);
            match pearson(reference, &series) {
                Some(r) => (r, pearson_p_value(r, n_time).unwrap_or(f64::NAN)),
                None => (f64::NAN, f64::NAN),
            }
        })
        .collect();

    let (r, p) = cells.into_iter().unzip();
    Ok(CorrelationField { n_lat, n_lon, r, p })
}

#[derive(Debug, Clone)]
pub struct SpatialVariabilityEngine {
    levels: Vec<f64>,
}

impl Default for SpatialVariabilityEngine {
    fn default() -> Self {
        Self::new(default_levels())
    }
}

impl SpatialVariabilityEngine {
    /// `levels` are visited from highest to lowest.
    pub fn new(mut levels: Vec<f64>) -> Self {
        levels.sort_by(|a, b| b.total_cmp(a));
        levels.dedup();
        Self { levels }
    }

    pub fn levels(&self) -> &[f64] {
        &self.levels
    }

    pub fn analyse(
        &self,
        reference: &[f64],
        stack: &AodStack,
        lons: &[f64],
        lats: &[f64],
        site: &Site,
    ) -> Result<SpatialVariability> {
        let field = correlation_field(reference, stack)?;
        let contours = self.select_contours(&field, lons, lats, site);
        Ok(SpatialVariability { field, contours })
    }

    pub fn select_contours(
        &self,
        field: &CorrelationField,
        lons: &[f64],
        lats: &[f64],
        site: &Site,
    ) -> Vec<ContourPolygon> {
        self.levels
            .iter()
            .filter_map(|&level| {
                let paths = contour_paths(lons, lats, field.r(), level);
                select_path(level, &paths, site)
            })
            .collect()
    }
}

/// Keeps the level's path when it is the only one, is closed, and either
/// encloses the site or belongs to the outer level.
pub fn select_path(level: f64, paths: &[ContourPath], site: &Site) -> Option<ContourPolygon> {
    let [path] = paths else {
        debug!(level, paths = paths.len(), "skipping level without a single path");
        return None;
    };
    if !path.closed {
        debug!(level, "skipping clipped contour");
        return None;
    }

    let lon = path.xs();
    let lat = path.ys();
    let encloses_site = polygon(&lon, &lat).contains(&Point::new(site.lon(), site.lat()));
    if !(encloses_site || level == OUTER_LEVEL) {
        debug!(level, "contour does not enclose the site");
        return None;
    }

    let area = area_of_lonlat_polygon(&lon, &lat);
    info!(threshold = level, area_km2 = area, "retained contour");
    Some(ContourPolygon {
        threshold: level,
        lon,
        lat,
        area,
    })
}
