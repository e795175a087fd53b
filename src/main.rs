use bevy::prelude::*;
use bevy_egui::EguiPlugin;

mod camera;
mod config;
mod geo;
mod hud;
mod input;
mod keyboard;
mod map;
mod markers;
mod paths;
mod projects;
mod theme;
mod tour;

use config::ConfigPlugin;

// =============================================================================
// Constants - All magic numbers centralized here
// =============================================================================

mod constants {
    // Mercator projection limits
    pub const MERCATOR_LAT_LIMIT: f64 = 85.0511;

    // World space is laid out in Web Mercator pixels at this zoom
    pub const WORLD_ZOOM: f64 = 3.0;

    // Default map view (whole-world overview)
    pub const DEFAULT_LATITUDE: f64 = 20.0;
    pub const DEFAULT_LONGITUDE: f64 = 0.0;
    pub const DEFAULT_ZOOM: f32 = 2.0;
    pub const MIN_MAP_ZOOM: f32 = 2.0;
    pub const MAX_MAP_ZOOM: f32 = 10.0;

    // Zoom sensitivity, in zoom levels
    pub const ZOOM_SENSITIVITY_LINE: f32 = 0.25; // Mouse wheel
    pub const ZOOM_SENSITIVITY_PIXEL: f32 = 0.005; // Trackpad

    // Viewport glide toward a recenter target
    pub const PAN_GLIDE_SPEED: f64 = 4.0;
    pub const PAN_ARRIVE_DEGREES: f64 = 1e-4;

    // Pointer
    pub const CLICK_DRAG_TOLERANCE_PX: f32 = 4.0;
    pub const MARKER_HIT_RADIUS_PX: f32 = 12.0;

    // Markers, in screen pixels
    pub const WAYPOINT_MARKER_SIZE: f32 = 14.0;
    pub const PLANE_MARKER_SIZE: f32 = 22.0;

    // Z-layers
    pub const WAYPOINT_Z_LAYER: f32 = 5.0;
    pub const PLANE_Z_LAYER: f32 = 10.0;

    // Map lines
    pub const ROUTE_SAMPLES_PER_LEG: usize = 24;
    pub const GRATICULE_STEP_DEGREES: f64 = 30.0;
}

fn main() {
    App::new()
        .add_plugins((
            DefaultPlugins.set(WindowPlugin {
                primary_window: Some(Window {
                    title: "flightpath".to_string(),
                    resolution: (1280, 720).into(),
                    ..default()
                }),
                ..default()
            }),
            EguiPlugin::default(),
            ConfigPlugin,
        ))
        // Map and tour resources are built from the loaded config
        .add_plugins((
            map::MapPlugin,
            theme::ThemePlugin,
            tour::TourPlugin,
            camera::CameraPlugin,
            markers::MarkersPlugin,
            input::InputPlugin,
            keyboard::KeyboardPlugin,
            projects::ProjectsPlugin,
            hud::HudPlugin,
        ))
        .run();
}
