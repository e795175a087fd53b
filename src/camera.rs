use bevy::prelude::*;

use crate::constants;
use crate::geo::{self, LatLon};
use crate::map::{MapState, ZoomState};

// =============================================================================
// Components
// =============================================================================

/// Marker for the 2D map camera.
#[derive(Component)]
pub(crate) struct MapCamera;

// =============================================================================
// Plugin
// =============================================================================

pub(crate) struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_camera)
            .add_systems(
                Update,
                glide_to_pan_target
                    .after(crate::input::handle_pan_drag)
                    .after(crate::tour::apply_tour_effects),
            )
            .add_systems(
                Update,
                (update_camera_position, apply_camera_zoom)
                    .after(glide_to_pan_target)
                    .after(crate::input::handle_zoom),
            );
    }
}

fn setup_camera(mut commands: Commands, zoom_state: Res<ZoomState>) {
    commands.spawn((
        Camera2d,
        Projection::Orthographic(OrthographicProjection {
            scale: zoom_state.projection_scale(),
            ..OrthographicProjection::default_2d()
        }),
        MapCamera,
    ));
}

// =============================================================================
// Camera Systems
// =============================================================================

/// One glide step from `current` toward `target`. Returns the new center and
/// whether it has arrived.
pub(crate) fn glide_step(current: LatLon, target: LatLon, t: f64) -> (LatLon, bool) {
    let t = t.clamp(0.0, 1.0);
    let next = LatLon::new(
        current.lat + (target.lat - current.lat) * t,
        current.lon + (target.lon - current.lon) * t,
    );
    let arrived = (target.lat - next.lat).abs() < constants::PAN_ARRIVE_DEGREES
        && (target.lon - next.lon).abs() < constants::PAN_ARRIVE_DEGREES;
    if arrived {
        (target, true)
    } else {
        (next, false)
    }
}

/// Ease the map center toward its pan target.
pub(crate) fn glide_to_pan_target(mut map_state: ResMut<MapState>, time: Res<Time>) {
    let Some(target) = map_state.pan_target else {
        return;
    };

    let t = (constants::PAN_GLIDE_SPEED * time.delta_secs_f64()).min(1.0);
    let (center, arrived) = glide_step(map_state.center(), target, t);
    map_state.set_center(center);
    if arrived {
        map_state.pan_target = None;
    }
}

fn update_camera_position(
    map_state: Res<MapState>,
    mut camera_query: Query<&mut Transform, With<MapCamera>>,
) {
    if !map_state.is_changed() {
        return;
    }
    let Ok(mut camera_transform) = camera_query.single_mut() else {
        return;
    };

    let converter = geo::CoordinateConverter::default();
    let pos = converter.latlon_to_world(map_state.center());
    camera_transform.translation.x = pos.x;
    camera_transform.translation.y = pos.y;
}

fn apply_camera_zoom(
    zoom_state: Res<ZoomState>,
    mut camera_query: Query<&mut Projection, With<MapCamera>>,
) {
    if !zoom_state.is_changed() {
        return;
    }
    let Ok(mut projection) = camera_query.single_mut() else {
        return;
    };
    if let Projection::Orthographic(ref mut ortho) = *projection {
        ortho.scale = zoom_state.projection_scale();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glide_moves_toward_target() {
        let (next, arrived) = glide_step(LatLon::new(0.0, 0.0), LatLon::new(10.0, 20.0), 0.5);
        assert!(!arrived);
        assert_eq!(next, LatLon::new(5.0, 10.0));
    }

    #[test]
    fn test_glide_snaps_when_close() {
        let target = LatLon::new(43.6629, -79.3957);
        let near = LatLon::new(43.66291, -79.39571);
        assert_eq!(glide_step(near, target, 0.1), (target, true));
    }

    #[test]
    fn test_full_step_arrives() {
        let target = LatLon::new(-33.0, 151.0);
        assert_eq!(glide_step(LatLon::default(), target, 1.0), (target, true));
    }
}
