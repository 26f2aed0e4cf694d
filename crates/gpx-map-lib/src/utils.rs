//! Projection helpers between WGS84 degrees and Web Mercator pixel space

use geo::Coord;
use std::f64::consts::PI;

/// Edge length of a square raster tile in pixels
pub const TILE_SIZE: f64 = 256.0;

/// Maximum latitude that can be represented in Web Mercator
pub const MAX_LATITUDE: f64 = 85.05112878;

/// Mean Earth radius in meters, used for track lengths
pub const EARTH_RADIUS_M: f64 = 6371000.0;

/// Width (and height) of the whole world in pixels at a fractional zoom
#[inline]
pub fn world_size(zoom: f64) -> f64 {
    TILE_SIZE * zoom.exp2()
}

/// Project WGS84 (lat, lon) to absolute pixel coordinates at `zoom`
///
/// The origin is the north-west corner of the world; `y` grows southwards.
/// Latitude is clamped to the Web Mercator range.
#[inline]
pub fn project(lat: f64, lon: f64, zoom: f64) -> Coord<f64> {
    let size = world_size(zoom);
    let lat_rad = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();

    let x = (lon + 180.0) / 360.0 * size;
    let y = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0 * size;

    Coord { x, y }
}

/// Inverse of [`project`]: absolute pixel coordinates at `zoom` to (lat, lon)
#[inline]
pub fn unproject(pixel: Coord<f64>, zoom: f64) -> (f64, f64) {
    let size = world_size(zoom);
    let lon = pixel.x / size * 360.0 - 180.0;
    let lat = (PI * (1.0 - 2.0 * pixel.y / size)).sinh().atan().to_degrees();
    (lat, lon)
}

/// Check that a coordinate can be placed on a Web Mercator map
#[inline]
pub fn is_valid_lat_lon(lat: f64, lon: f64) -> bool {
    lat.is_finite()
        && lon.is_finite()
        && (-MAX_LATITUDE..=MAX_LATITUDE).contains(&lat)
        && (-180.0..=180.0).contains(&lon)
}

/// Great-circle distance between two WGS84 positions in meters
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}
