use bevy::input::mouse::{MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use bevy_egui::EguiContexts;

use crate::camera::MapCamera;
use crate::constants;
use crate::geo::CoordinateConverter;
use crate::map::{MapState, ZoomState};
use crate::markers::WaypointMarker;
use crate::tour::TourIntent;

// =============================================================================
// Resources
// =============================================================================

/// Resource to track pan/drag state.
#[derive(Resource, Default)]
pub(crate) struct DragState {
    is_dragging: bool,
    last_position: Option<Vec2>,
    /// Screen distance covered since the button went down
    travelled: f32,
}

/// Tracks whether egui wants pointer input this frame, used to prevent
/// map interactions when clicking/scrolling over the HUD.
#[derive(Resource, Default)]
pub(crate) struct EguiWantsPointer(pub(crate) bool);

// =============================================================================
// Plugin
// =============================================================================

pub(crate) struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DragState>()
            .init_resource::<EguiWantsPointer>()
            .add_systems(
                Update,
                check_egui_wants_input
                    .before(handle_pan_drag)
                    .before(handle_zoom)
                    .before(handle_marker_click),
            )
            .add_systems(
                Update,
                (handle_marker_click, handle_pan_drag, handle_zoom)
                    .chain()
                    .before(crate::tour::handle_tour_intents),
            );
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Convert mouse wheel event to a zoom delta in zoom levels.
/// Positive zooms in.
fn calculate_zoom_delta(event: &MouseWheel) -> f32 {
    match event.unit {
        MouseScrollUnit::Line => event.y * constants::ZOOM_SENSITIVITY_LINE,
        MouseScrollUnit::Pixel => event.y * constants::ZOOM_SENSITIVITY_PIXEL,
    }
}

/// Index of the marker nearest `cursor` within `radius` (world units).
pub fn pick_marker(cursor: Vec2, markers: impl IntoIterator<Item = (usize, Vec2)>, radius: f32) -> Option<usize> {
    markers
        .into_iter()
        .map(|(index, pos)| (index, pos.distance(cursor)))
        .filter(|(_, distance)| *distance <= radius)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(index, _)| index)
}

// =============================================================================
// Input Systems
// =============================================================================

pub(crate) fn check_egui_wants_input(
    mut contexts: EguiContexts,
    mut drag_state: ResMut<DragState>,
    mut egui_wants: ResMut<EguiWantsPointer>,
) {
    egui_wants.0 = false;
    if let Ok(ctx) = contexts.ctx_mut() {
        if ctx.wants_pointer_input() || ctx.is_pointer_over_area() {
            egui_wants.0 = true;
            if !drag_state.is_dragging {
                drag_state.last_position = None;
            }
        }
    }
}

/// A press and release without dragging selects the marker under the cursor.
pub(crate) fn handle_marker_click(
    mouse_button: Res<ButtonInput<MouseButton>>,
    drag_state: Res<DragState>,
    egui_wants: Res<EguiWantsPointer>,
    zoom_state: Res<ZoomState>,
    window_query: Query<&Window>,
    camera_query: Query<(&Camera, &GlobalTransform), With<MapCamera>>,
    marker_query: Query<(&WaypointMarker, &Transform)>,
    mut intents: MessageWriter<TourIntent>,
) {
    if !mouse_button.just_released(MouseButton::Left) || egui_wants.0 {
        return;
    }
    if drag_state.travelled > constants::CLICK_DRAG_TOLERANCE_PX {
        return;
    }
    let (Ok(window), Ok((camera, camera_transform))) = (window_query.single(), camera_query.single()) else {
        return;
    };
    let Some(cursor) = window.cursor_position() else {
        return;
    };
    let Ok(cursor_world) = camera.viewport_to_world_2d(camera_transform, cursor) else {
        return;
    };

    let radius = constants::MARKER_HIT_RADIUS_PX * zoom_state.projection_scale();
    let markers = marker_query
        .iter()
        .map(|(marker, transform)| (marker.index, transform.translation.truncate()));
    if let Some(index) = pick_marker(cursor_world, markers, radius) {
        info!("Waypoint marker {} clicked", index);
        intents.write(TourIntent::SelectWaypoint(index));
    }
}

pub(crate) fn handle_pan_drag(
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut cursor_moved: MessageReader<CursorMoved>,
    mut map_state: ResMut<MapState>,
    mut drag_state: ResMut<DragState>,
    zoom_state: Res<ZoomState>,
    egui_wants: Res<EguiWantsPointer>,
) {
    // Only start a new drag if pointer is not over the HUD
    if mouse_button.just_pressed(MouseButton::Left) && !egui_wants.0 {
        drag_state.is_dragging = true;
        drag_state.last_position = None;
        drag_state.travelled = 0.0;
    }

    if !drag_state.is_dragging {
        cursor_moved.clear();
        return;
    }

    let converter = CoordinateConverter::default();
    let scale = zoom_state.projection_scale();
    for event in cursor_moved.read() {
        if let Some(last_pos) = drag_state.last_position {
            let delta = event.position - last_pos;
            drag_state.travelled += delta.length();

            // Screen Y grows down, world Y grows up
            let center = converter.latlon_to_world(map_state.center());
            let new_center = center + Vec2::new(-delta.x, delta.y) * scale;
            map_state.set_center(converter.world_to_latlon(new_center));
            // The user takes over from any glide in progress
            map_state.pan_target = None;
        }
        drag_state.last_position = Some(event.position);
    }

    if mouse_button.just_released(MouseButton::Left) {
        drag_state.is_dragging = false;
        drag_state.last_position = None;
    }
}

pub(crate) fn handle_zoom(
    mut scroll_events: MessageReader<MouseWheel>,
    mut zoom_state: ResMut<ZoomState>,
    egui_wants: Res<EguiWantsPointer>,
) {
    if egui_wants.0 {
        scroll_events.clear();
        return;
    }
    let delta: f32 = scroll_events.read().map(calculate_zoom_delta).sum();
    if delta != 0.0 {
        zoom_state.zoom_by(delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick_nearest_marker_within_radius() {
        let markers = vec![(0, Vec2::new(0.0, 0.0)), (1, Vec2::new(10.0, 0.0)), (2, Vec2::new(30.0, 0.0))];
        assert_eq!(pick_marker(Vec2::new(7.0, 1.0), markers.clone(), 8.0), Some(1));
        assert_eq!(pick_marker(Vec2::new(2.0, 0.0), markers.clone(), 8.0), Some(0));
        assert_eq!(pick_marker(Vec2::new(20.0, 0.0), markers, 8.0), None);
    }

    #[test]
    fn test_pick_with_no_markers() {
        assert_eq!(pick_marker(Vec2::ZERO, Vec::new(), 100.0), None);
    }
}
