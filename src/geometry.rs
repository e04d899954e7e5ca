use std::f64::consts::PI;

use geo::{Area, LineString, Polygon};

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.009;

/// Projects (lon, lat) degrees onto the sinusoidal equal-area plane.
///
/// Returned coordinates are in kilometres, so areas computed from them are
/// in km².
pub fn reproject(lons: &[f64], lats: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let lat_dist = PI * EARTH_RADIUS_KM / 180.0;

    let y = lats.iter().map(|lat| lat * lat_dist).collect();
    let x = lons
        .iter()
        .zip(lats)
        .map(|(lon, lat)| lon * lat_dist * lat.to_radians().cos())
        .collect();

    (x, y)
}

/// Polygon from parallel coordinate arrays. The ring is closed if the last
/// vertex does not repeat the first.
pub fn polygon(xs: &[f64], ys: &[f64]) -> Polygon<f64> {
    let ring: LineString<f64> = xs.iter().copied().zip(ys.iter().copied()).collect();
    Polygon::new(ring, vec![])
}

/// Planar area of a simple polygon, whatever its orientation.
pub fn polygon_area(x: &[f64], y: &[f64]) -> f64 {
    polygon(x, y).unsigned_area()
}

/// Area in km² of a (lon, lat) polygon, measured on the sinusoidal plane.
pub fn area_of_lonlat_polygon(lons: &[f64], lats: &[f64]) -> f64 {
    let (x, y) = reproject(lons, lats);
    polygon_area(&x, &y)
}
