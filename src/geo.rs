//! Shared geodesic math, route metrics, and map projection.
//!
//! Centralizes haversine distance, bearing, interpolation and the Web
//! Mercator conversion used by the camera, markers and input systems.

use bevy::math::DVec2;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::constants;

// =============================================================================
// Constants
// =============================================================================

/// Earth radius in kilometers (mean radius)
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Tile size in pixels used by the Web Mercator projection
pub const TILE_SIZE_PX: f64 = 256.0;

// =============================================================================
// Points
// =============================================================================

/// A geographic position in degrees.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

// =============================================================================
// Geodesic Functions
// =============================================================================

/// Calculate the great-circle distance between two lat/lon points
/// using the Haversine formula. Returns distance in kilometers.
pub fn haversine_km(a: LatLon, b: LatLon) -> f64 {
    let lat1_rad = a.lat.to_radians();
    let lat2_rad = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lon = (b.lon - a.lon).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().min(1.0).asin();

    EARTH_RADIUS_KM * c
}

/// Calculate the initial bearing (forward azimuth) from point a to point b.
/// Returns bearing in degrees (0-360, clockwise from north).
pub fn initial_bearing(a: LatLon, b: LatLon) -> f64 {
    let lat1_rad = a.lat.to_radians();
    let lat2_rad = b.lat.to_radians();
    let delta_lon = (b.lon - a.lon).to_radians();

    let x = delta_lon.sin() * lat2_rad.cos();
    let y = lat1_rad.cos() * lat2_rad.sin()
        - lat1_rad.sin() * lat2_rad.cos() * delta_lon.cos();

    normalize_degrees(x.atan2(y).to_degrees())
}

/// Wrap an angle into [0, 360).
pub fn normalize_degrees(deg: f64) -> f64 {
    let wrapped = deg.rem_euclid(360.0);
    // rem_euclid can return 360.0 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Linear interpolation written so that `t == 0` yields `a` and `t == 1`
/// yields `b` exactly.
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a * (1.0 - t) + b * t
}

// =============================================================================
// Metrics
// =============================================================================

/// Distance metric and point algebra a route is measured with.
///
/// Route lengths, headings, and jump durations must all come from the same
/// metric, so the metric is a type parameter of the route and the tour
/// controller rather than a runtime switch.
pub trait Metric {
    type Point: Copy + PartialEq + std::fmt::Debug + Send + Sync + 'static;

    fn distance(a: Self::Point, b: Self::Point) -> f64;

    /// Heading in degrees from `a` to `b`, normalized to [0, 360).
    fn bearing(a: Self::Point, b: Self::Point) -> f64;

    fn interpolate(a: Self::Point, b: Self::Point, t: f64) -> Self::Point;

    /// Position reported for an empty route.
    fn origin() -> Self::Point;
}

/// Great-circle kilometers over lat/lon points.
#[derive(Clone, Copy, Debug, Default)]
pub struct Geographic;

impl Metric for Geographic {
    type Point = LatLon;

    fn distance(a: LatLon, b: LatLon) -> f64 {
        haversine_km(a, b)
    }

    fn bearing(a: LatLon, b: LatLon) -> f64 {
        if a == b {
            return 0.0;
        }
        initial_bearing(a, b)
    }

    fn interpolate(a: LatLon, b: LatLon, t: f64) -> LatLon {
        LatLon::new(lerp(a.lat, b.lat, t), lerp(a.lon, b.lon, t))
    }

    fn origin() -> LatLon {
        LatLon::default()
    }
}

/// Euclidean units over planar points (SVG-style, y down).
#[derive(Clone, Copy, Debug, Default)]
pub struct Planar;

impl Metric for Planar {
    type Point = DVec2;

    fn distance(a: DVec2, b: DVec2) -> f64 {
        a.distance(b)
    }

    fn bearing(a: DVec2, b: DVec2) -> f64 {
        if a == b {
            return 0.0;
        }
        let d = b - a;
        normalize_degrees(d.y.atan2(d.x).to_degrees())
    }

    fn interpolate(a: DVec2, b: DVec2, t: f64) -> DVec2 {
        DVec2::new(lerp(a.x, b.x, t), lerp(a.y, b.y, t))
    }

    fn origin() -> DVec2 {
        DVec2::ZERO
    }
}

// =============================================================================
// Coordinate Helpers
// =============================================================================

/// Clamp latitude to valid Mercator projection range
pub fn clamp_latitude(lat: f64) -> f64 {
    lat.clamp(-constants::MERCATOR_LAT_LIMIT, constants::MERCATOR_LAT_LIMIT)
}

/// Clamp longitude to valid range
pub fn clamp_longitude(lon: f64) -> f64 {
    lon.clamp(-180.0, 180.0)
}

/// Web Mercator world pixel for a lat/lon at the given zoom (y grows south).
pub fn latlon_to_world_pixel(ll: LatLon, zoom: f64) -> (f64, f64) {
    let scale = TILE_SIZE_PX * 2f64.powf(zoom);
    let lat_rad = clamp_latitude(ll.lat).to_radians();
    let x = (ll.lon + 180.0) / 360.0 * scale;
    let y = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / std::f64::consts::PI) / 2.0 * scale;
    (x, y)
}

/// Inverse of [`latlon_to_world_pixel`].
pub fn world_pixel_to_latlon(x: f64, y: f64, zoom: f64) -> LatLon {
    let scale = TILE_SIZE_PX * 2f64.powf(zoom);
    let lon = x / scale * 360.0 - 180.0;
    let n = std::f64::consts::PI * (1.0 - 2.0 * y / scale);
    let lat = n.sinh().atan().to_degrees();
    LatLon::new(lat, lon)
}

// =============================================================================
// Coordinate Converter
// =============================================================================

/// Converts between geographic coordinates and Bevy world space.
///
/// World space is Web Mercator pixels at [`constants::WORLD_ZOOM`] with the
/// origin at lat/lon (0, 0) and +Y pointing north. Map zoom is applied by
/// scaling the orthographic projection, never by re-projecting.
#[derive(Clone, Copy, Debug)]
pub struct CoordinateConverter {
    reference_pixel: (f64, f64),
    zoom: f64,
}

impl Default for CoordinateConverter {
    fn default() -> Self {
        Self::new(constants::WORLD_ZOOM)
    }
}

impl CoordinateConverter {
    pub fn new(zoom: f64) -> Self {
        Self {
            reference_pixel: latlon_to_world_pixel(LatLon::default(), zoom),
            zoom,
        }
    }

    /// Convert a latitude/longitude to a Bevy world-space Vec2 position.
    pub fn latlon_to_world(&self, ll: LatLon) -> Vec2 {
        let pixel = latlon_to_world_pixel(ll, self.zoom);
        Vec2::new(
            (pixel.0 - self.reference_pixel.0) as f32,
            -(pixel.1 - self.reference_pixel.1) as f32,
        )
    }

    /// Convert a Bevy world-space position back to latitude/longitude.
    pub fn world_to_latlon(&self, world: Vec2) -> LatLon {
        world_pixel_to_latlon(
            self.reference_pixel.0 + world.x as f64,
            self.reference_pixel.1 - world.y as f64,
            self.zoom,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_known_distance() {
        // Toronto to London is roughly 5,700 km
        let toronto = LatLon::new(43.6629, -79.3957);
        let london = LatLon::new(51.5074, -0.1278);
        let d = haversine_km(toronto, london);
        assert!((d - 5710.0).abs() < 60.0, "got {d}");
    }

    #[test]
    fn test_haversine_zero_for_same_point() {
        let p = LatLon::new(22.5726, 88.3639);
        assert_eq!(haversine_km(p, p), 0.0);
    }

    #[test]
    fn test_bearing_cardinal_directions() {
        let origin = LatLon::new(0.0, 0.0);
        assert!((initial_bearing(origin, LatLon::new(1.0, 0.0)) - 0.0).abs() < 1e-9);
        assert!((initial_bearing(origin, LatLon::new(0.0, 1.0)) - 90.0).abs() < 1e-9);
        assert!((initial_bearing(origin, LatLon::new(-1.0, 0.0)) - 180.0).abs() < 1e-9);
        assert!((initial_bearing(origin, LatLon::new(0.0, -1.0)) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_planar_bearing_follows_screen_axes() {
        let a = DVec2::ZERO;
        assert_eq!(Planar::bearing(a, DVec2::new(1.0, 0.0)), 0.0);
        assert!((Planar::bearing(a, DVec2::new(0.0, 1.0)) - 90.0).abs() < 1e-9);
        assert!((Planar::bearing(a, DVec2::new(-1.0, 0.0)) - 180.0).abs() < 1e-9);
        assert_eq!(Planar::bearing(a, a), 0.0);
    }

    #[test]
    fn test_lerp_endpoints_are_exact() {
        assert_eq!(lerp(0.1, 0.7, 0.0), 0.1);
        assert_eq!(lerp(0.1, 0.7, 1.0), 0.7);
    }

    #[test]
    fn test_normalize_degrees() {
        assert_eq!(normalize_degrees(-90.0), 270.0);
        assert_eq!(normalize_degrees(360.0), 0.0);
        assert_eq!(normalize_degrees(45.0), 45.0);
    }

    #[test]
    fn test_converter_round_trip() {
        let converter = CoordinateConverter::default();
        let lisbon = LatLon::new(38.7169, -9.1390);
        let back = converter.world_to_latlon(converter.latlon_to_world(lisbon));
        assert!((back.lat - lisbon.lat).abs() < 1e-3);
        assert!((back.lon - lisbon.lon).abs() < 1e-3);
    }

    #[test]
    fn test_converter_north_is_up() {
        let converter = CoordinateConverter::default();
        let south = converter.latlon_to_world(LatLon::new(-10.0, 0.0));
        let north = converter.latlon_to_world(LatLon::new(10.0, 0.0));
        assert!(north.y > south.y);
        assert_eq!(converter.latlon_to_world(LatLon::default()), Vec2::ZERO);
    }
}
