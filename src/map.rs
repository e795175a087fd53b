use bevy::prelude::*;

use crate::config::{AppConfig, MapConfig};
use crate::constants;
use crate::geo::{clamp_latitude, clamp_longitude, LatLon};

/// Resource to track the map viewport center
#[derive(Resource, Clone, Debug, Reflect)]
#[reflect(Default)]
pub struct MapState {
    /// Current map center latitude
    pub latitude: f64,
    /// Current map center longitude
    pub longitude: f64,
    /// Point the viewport is gliding toward, if any
    #[reflect(ignore)]
    pub pan_target: Option<LatLon>,
}

impl Default for MapState {
    fn default() -> Self {
        Self {
            latitude: constants::DEFAULT_LATITUDE,
            longitude: constants::DEFAULT_LONGITUDE,
            pan_target: None,
        }
    }
}

impl MapState {
    pub fn center(&self) -> LatLon {
        LatLon::new(self.latitude, self.longitude)
    }

    pub fn set_center(&mut self, center: LatLon) {
        self.latitude = clamp_latitude(center.lat);
        self.longitude = clamp_longitude(center.lon);
    }

    /// Start gliding toward `target`; replaces any glide in progress.
    pub fn pan_to(&mut self, target: LatLon) {
        self.pan_target = Some(LatLon::new(
            clamp_latitude(target.lat),
            clamp_longitude(target.lon),
        ));
    }
}

/// Resource to track the continuous map zoom level (slippy-map style: each
/// step doubles the scale).
#[derive(Resource, Clone, Debug, Reflect)]
pub struct ZoomState {
    pub zoom_level: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
}

impl ZoomState {
    pub fn new(zoom_level: f32, min_zoom: f32, max_zoom: f32) -> Self {
        let max_zoom = max_zoom.max(min_zoom);
        Self {
            zoom_level: zoom_level.clamp(min_zoom, max_zoom),
            min_zoom,
            max_zoom,
        }
    }

    pub fn zoom_by(&mut self, delta: f32) {
        self.zoom_level = (self.zoom_level + delta).clamp(self.min_zoom, self.max_zoom);
    }

    /// Zoom out to at most `max`; never zooms in.
    pub fn clamp_to(&mut self, max: f32) {
        if self.zoom_level > max {
            self.zoom_level = max.max(self.min_zoom);
        }
    }

    /// Orthographic projection scale for this zoom. World space is laid out
    /// at [`constants::WORLD_ZOOM`], so a scale of 1 shows it at that zoom.
    pub fn projection_scale(&self) -> f32 {
        2f32.powf(constants::WORLD_ZOOM as f32 - self.zoom_level)
    }
}

impl Default for ZoomState {
    fn default() -> Self {
        Self::new(
            constants::DEFAULT_ZOOM,
            constants::MIN_MAP_ZOOM,
            constants::MAX_MAP_ZOOM,
        )
    }
}

pub struct MapPlugin;

impl Plugin for MapPlugin {
    fn build(&self, app: &mut App) {
        let map_config = app
            .world()
            .get_resource::<AppConfig>()
            .map(|config| config.map.clone());
        let (map_state, zoom_state) = match map_config {
            Some(map) => {
                let map = match map.validate() {
                    Ok(()) => map,
                    Err(e) => {
                        warn!("{}, using the default map view", e);
                        MapConfig::default()
                    }
                };
                let mut state = MapState::default();
                state.set_center(LatLon::new(map.default_latitude, map.default_longitude));
                (
                    state,
                    ZoomState::new(map.default_zoom, map.min_zoom, map.max_zoom),
                )
            }
            None => (MapState::default(), ZoomState::default()),
        };
        app.insert_resource(map_state)
            .insert_resource(zoom_state)
            .register_type::<MapState>()
            .register_type::<ZoomState>();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zoom_is_bounded() {
        let mut zoom = ZoomState::new(2.0, 2.0, 10.0);
        zoom.zoom_by(-1.0);
        assert_eq!(zoom.zoom_level, 2.0);
        zoom.zoom_by(20.0);
        assert_eq!(zoom.zoom_level, 10.0);
    }

    #[test]
    fn test_clamp_to_only_zooms_out() {
        let mut zoom = ZoomState::new(4.0, 2.0, 10.0);
        zoom.clamp_to(12.0);
        assert_eq!(zoom.zoom_level, 4.0);
        zoom.zoom_by(6.0);
        zoom.clamp_to(5.0);
        assert_eq!(zoom.zoom_level, 5.0);
    }

    #[test]
    fn test_projection_scale_doubles_per_level() {
        let a = ZoomState::new(3.0, 2.0, 10.0);
        let b = ZoomState::new(4.0, 2.0, 10.0);
        assert!((a.projection_scale() / b.projection_scale() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_pan_target_is_clamped() {
        let mut state = MapState::default();
        state.pan_to(LatLon::new(89.0, 200.0));
        let target = state.pan_target.unwrap();
        assert_eq!(target.lat, constants::MERCATOR_LAT_LIMIT);
        assert_eq!(target.lon, 180.0);
    }

    #[test]
    fn test_plugin_reads_map_config() {
        let mut config = AppConfig::default();
        config.map.default_zoom = 5.0;
        config.map.default_latitude = 43.0;

        let mut app = App::new();
        app.insert_resource(config).add_plugins(MapPlugin);

        assert_eq!(app.world().resource::<ZoomState>().zoom_level, 5.0);
        assert_eq!(app.world().resource::<MapState>().latitude, 43.0);
    }

    #[test]
    fn test_plugin_ignores_nan_zoom_bounds() {
        let mut config = AppConfig::default();
        config.map.min_zoom = f32::NAN;

        let mut app = App::new();
        app.insert_resource(config).add_plugins(MapPlugin);

        let zoom = app.world().resource::<ZoomState>();
        assert_eq!(zoom.min_zoom, MapConfig::default().min_zoom);
        assert_eq!(zoom.zoom_level, MapConfig::default().default_zoom);
    }
}
