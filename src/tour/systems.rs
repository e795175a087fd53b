use bevy::prelude::*;

use super::{TourEffect, TourEffectMessage, TourIntent, TourState};
use crate::map::{MapState, ZoomState};

/// Reduce this frame's intents before the frame tick.
pub fn handle_tour_intents(
    mut intents: MessageReader<TourIntent>,
    mut tour: ResMut<TourState>,
    mut effects: MessageWriter<TourEffectMessage>,
) {
    for intent in intents.read() {
        debug!("Tour intent: {:?}", intent);
        effects.write_batch(
            tour.controller
                .handle(*intent)
                .into_iter()
                .map(TourEffectMessage),
        );
    }
}

/// Advance the tour to the current frame time.
pub fn advance_tour(
    time: Res<Time>,
    mut tour: ResMut<TourState>,
    mut effects: MessageWriter<TourEffectMessage>,
) {
    let now = time.elapsed_secs_f64();
    effects.write_batch(tour.controller.tick(now).into_iter().map(TourEffectMessage));
}

/// Perform the viewport side of controller effects.
pub fn apply_tour_effects(
    mut effects: MessageReader<TourEffectMessage>,
    map_state: Option<ResMut<MapState>>,
    zoom_state: Option<ResMut<ZoomState>>,
) {
    let (Some(mut map_state), Some(mut zoom_state)) = (map_state, zoom_state) else {
        effects.clear();
        return;
    };

    for TourEffectMessage(effect) in effects.read() {
        match effect {
            TourEffect::Recenter(center) => map_state.pan_to(*center),
            TourEffect::ClampZoom(max) => zoom_state.clamp_to(*max),
            other => debug!("Tour effect: {:?}", other),
        }
    }
}
