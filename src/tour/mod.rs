//! The flight tour: route model, motion, and the playback state machine,
//! plus the Bevy plugin that drives them once per frame.

pub mod animation;
pub mod follow;
pub mod route;
pub mod state;
mod systems;
pub mod waypoint;

use bevy::prelude::*;

use crate::config::AppConfig;
use crate::geo::{Geographic, LatLon};

pub use state::{TourController, TourEffect, TourIntent, TourView};
pub use systems::{advance_tour, apply_tour_effects, handle_tour_intents};
pub use waypoint::Waypoint;

/// The tour controller over the configured waypoints.
#[derive(Resource)]
pub struct TourState {
    pub controller: TourController<Geographic>,
    pub waypoints: Vec<Waypoint>,
}

impl TourState {
    pub fn new(waypoints: Vec<Waypoint>, config: crate::config::TourConfig) -> Self {
        let stops = waypoints
            .iter()
            .map(|wp| (wp.id.clone(), wp.position()))
            .collect();
        Self {
            controller: TourController::new(stops, config),
            waypoints,
        }
    }

    pub fn view(&self) -> TourView<LatLon> {
        self.controller.view()
    }
}

/// A controller effect, re-emitted for systems outside the tour.
#[derive(Message, Clone, Debug, PartialEq)]
pub struct TourEffectMessage(pub TourEffect<LatLon>);

pub struct TourPlugin;

impl Plugin for TourPlugin {
    fn build(&self, app: &mut App) {
        let config = app
            .world()
            .get_resource::<AppConfig>()
            .cloned()
            .unwrap_or_default();

        let tour_config = match config.tour.validate() {
            Ok(()) => config.tour,
            Err(e) => {
                warn!("{}, using the default tour settings", e);
                crate::config::TourConfig::default()
            }
        };
        let waypoints = match waypoint::validate_waypoints(&config.waypoints) {
            Ok(()) => config.waypoints,
            Err(e) => {
                warn!("{}, using the built-in tour", e);
                waypoint::default_waypoints()
            }
        };
        info!("Tour has {} waypoints", waypoints.len());

        app.insert_resource(TourState::new(waypoints, tour_config))
            .add_message::<TourIntent>()
            .add_message::<TourEffectMessage>()
            .add_systems(
                Update,
                (handle_tour_intents, advance_tour, apply_tour_effects).chain(),
            );
    }
}
