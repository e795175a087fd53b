use bevy::prelude::*;

use crate::constants;
use crate::geo::{lerp, CoordinateConverter, Geographic, LatLon};
use crate::map::ZoomState;
use crate::theme::AppTheme;
use crate::tour::route::Route;
use crate::tour::TourState;

// =============================================================================
// Components
// =============================================================================

/// A clickable waypoint marker.
#[derive(Component)]
pub struct WaypointMarker {
    pub index: usize,
}

/// The plane that flies the route.
#[derive(Component)]
pub struct PlaneMarker;

// =============================================================================
// Plugin
// =============================================================================

pub(crate) struct MarkersPlugin;

impl Plugin for MarkersPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_markers).add_systems(
            Update,
            (
                update_plane_marker,
                highlight_active_waypoint,
                scale_markers,
                draw_map_lines,
            )
                .after(crate::tour::apply_tour_effects),
        );
    }
}

// =============================================================================
// Render Parameters
// =============================================================================

/// Rotation for a marker whose artwork points north (+Y), given a heading
/// in degrees clockwise from north.
pub fn marker_rotation(heading_deg: f64) -> Quat {
    Quat::from_rotation_z(-(heading_deg as f32).to_radians())
}

/// Marker scale that keeps markers the same size on screen at any zoom.
pub fn marker_scale(zoom_state: &ZoomState) -> f32 {
    zoom_state.projection_scale()
}

/// World-space polyline through `points`, with each leg subdivided so the
/// linear lat/lon legs curve correctly under the Mercator projection.
pub fn route_polyline(points: &[LatLon], converter: &CoordinateConverter) -> Vec<Vec2> {
    let Some(&first) = points.first() else {
        return Vec::new();
    };
    let mut line = vec![converter.latlon_to_world(first)];
    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        for step in 1..=constants::ROUTE_SAMPLES_PER_LEG {
            let t = step as f64 / constants::ROUTE_SAMPLES_PER_LEG as f64;
            let p = LatLon::new(lerp(a.lat, b.lat, t), lerp(a.lon, b.lon, t));
            line.push(converter.latlon_to_world(p));
        }
    }
    line
}

/// Waypoint marker color. The active stop stands out; the others are dimmed
/// while autoplay ignores clicks on them.
pub fn waypoint_color(theme: &AppTheme, is_active: bool, is_playing: bool) -> Color {
    if is_active {
        theme.waypoint_active()
    } else if is_playing {
        theme.waypoint_dimmed()
    } else {
        theme.waypoint()
    }
}

/// Vertices of the part of the route already flown at `progress`.
pub fn flown_points(route: &Route<Geographic>, progress: f64) -> Vec<LatLon> {
    if route.len() < 2 || progress <= 0.0 {
        return Vec::new();
    }
    let mut points: Vec<LatLon> = route
        .points()
        .iter()
        .enumerate()
        .take_while(|(i, _)| route.progress_for_waypoint(*i) < progress)
        .map(|(_, p)| *p)
        .collect();
    points.push(route.position_at_progress(progress).0);
    points
}

// =============================================================================
// Systems
// =============================================================================

fn spawn_markers(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    tour: Res<TourState>,
    theme: Res<AppTheme>,
) {
    let converter = CoordinateConverter::default();
    let size = constants::WAYPOINT_MARKER_SIZE;
    let waypoint_mesh = meshes.add(Rhombus::new(size, size));

    for (index, waypoint) in tour.waypoints.iter().enumerate() {
        let pos = converter.latlon_to_world(waypoint.position());
        // One material per marker so the active one can be recolored alone
        let material = materials.add(ColorMaterial::from_color(theme.waypoint()));
        commands.spawn((
            WaypointMarker { index },
            Mesh2d(waypoint_mesh.clone()),
            MeshMaterial2d(material),
            Transform::from_xyz(pos.x, pos.y, constants::WAYPOINT_Z_LAYER),
        ));
    }

    let view = tour.view();
    let pos = converter.latlon_to_world(view.position);
    let half = constants::PLANE_MARKER_SIZE / 2.0;
    commands.spawn((
        PlaneMarker,
        Mesh2d(meshes.add(Triangle2d::new(
            Vec2::new(0.0, half),
            Vec2::new(-half * 0.6, -half),
            Vec2::new(half * 0.6, -half),
        ))),
        MeshMaterial2d(materials.add(ColorMaterial::from_color(theme.plane()))),
        Transform::from_xyz(pos.x, pos.y, constants::PLANE_Z_LAYER)
            .with_rotation(marker_rotation(view.heading)),
    ));

    info!("Spawned {} waypoint markers", tour.waypoints.len());
}

fn update_plane_marker(
    tour: Res<TourState>,
    mut plane_query: Query<&mut Transform, With<PlaneMarker>>,
) {
    if !tour.is_changed() {
        return;
    }
    let converter = CoordinateConverter::default();
    let view = tour.view();
    let pos = converter.latlon_to_world(view.position);
    for mut transform in plane_query.iter_mut() {
        transform.translation.x = pos.x;
        transform.translation.y = pos.y;
        transform.rotation = marker_rotation(view.heading);
    }
}

fn highlight_active_waypoint(
    tour: Res<TourState>,
    theme: Res<AppTheme>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    marker_query: Query<(&WaypointMarker, &MeshMaterial2d<ColorMaterial>)>,
    mut shown: Local<Option<(usize, bool)>>,
) {
    let state = (tour.controller.active_index(), tour.controller.is_playing());
    if *shown == Some(state) && !theme.is_changed() {
        return;
    }
    let (active, playing) = state;
    for (marker, material) in marker_query.iter() {
        if let Some(mut material) = materials.get_mut(&material.0) {
            material.color = waypoint_color(&theme, marker.index == active, playing);
        }
    }
    if !marker_query.is_empty() {
        *shown = Some(state);
    }
}

/// Keep markers at constant screen size despite zoom changes.
fn scale_markers(
    zoom_state: Res<ZoomState>,
    mut marker_query: Query<&mut Transform, Or<(With<WaypointMarker>, With<PlaneMarker>)>>,
    new_markers: Query<(), Or<(Added<WaypointMarker>, Added<PlaneMarker>)>>,
) {
    if !zoom_state.is_changed() && new_markers.is_empty() {
        return;
    }
    let scale = marker_scale(&zoom_state);
    for mut transform in marker_query.iter_mut() {
        transform.scale = Vec3::splat(scale);
    }
}

/// Graticule, planned route, and the flown part of the route.
fn draw_map_lines(mut gizmos: Gizmos, tour: Res<TourState>, theme: Res<AppTheme>) {
    let converter = CoordinateConverter::default();
    let step = constants::GRATICULE_STEP_DEGREES;

    let graticule = theme.graticule();
    let lat_limit = constants::MERCATOR_LAT_LIMIT;
    let mut lon = -180.0;
    while lon <= 180.0 {
        gizmos.line_2d(
            converter.latlon_to_world(LatLon::new(-lat_limit, lon)),
            converter.latlon_to_world(LatLon::new(lat_limit, lon)),
            graticule,
        );
        lon += step;
    }
    let mut lat = -60.0;
    while lat <= 60.0 {
        gizmos.line_2d(
            converter.latlon_to_world(LatLon::new(lat, -180.0)),
            converter.latlon_to_world(LatLon::new(lat, 180.0)),
            graticule,
        );
        lat += step;
    }

    let route = tour.controller.route();
    gizmos.linestrip_2d(route_polyline(route.points(), &converter), theme.route());

    let flown = flown_points(route, tour.controller.progress());
    if flown.len() >= 2 {
        gizmos.linestrip_2d(route_polyline(&flown, &converter), theme.route_flown());
    }
}
