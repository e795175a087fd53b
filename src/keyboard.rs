use bevy::prelude::*;
use bevy_egui::EguiContexts;

use crate::projects::ProjectsOverlay;
use crate::tour::{TourIntent, TourState};

const DIGIT_KEYS: [KeyCode; 9] = [
    KeyCode::Digit1,
    KeyCode::Digit2,
    KeyCode::Digit3,
    KeyCode::Digit4,
    KeyCode::Digit5,
    KeyCode::Digit6,
    KeyCode::Digit7,
    KeyCode::Digit8,
    KeyCode::Digit9,
];

pub(crate) struct KeyboardPlugin;

impl Plugin for KeyboardPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            handle_keyboard_shortcuts.before(crate::tour::handle_tour_intents),
        );
    }
}

/// Intents for the keys pressed this frame.
///
/// Escape closes the open popup first; with no popup it cancels whatever is
/// moving.
pub fn shortcut_intents(
    keyboard: &ButtonInput<KeyCode>,
    popup_open: bool,
) -> Vec<TourIntent> {
    let mut intents = Vec::new();

    // Space - Play / pause
    if keyboard.just_pressed(KeyCode::Space) {
        intents.push(TourIntent::TogglePlayback);
    }

    // Escape - Close popup, else stop the motion
    if keyboard.just_pressed(KeyCode::Escape) {
        intents.push(if popup_open {
            TourIntent::ClosePopup
        } else {
            TourIntent::Cancel
        });
    }

    // 1-9 - Fly to waypoint
    for (index, key) in DIGIT_KEYS.iter().enumerate() {
        if keyboard.just_pressed(*key) {
            intents.push(TourIntent::SelectWaypoint(index));
        }
    }

    intents
}

/// System to handle keyboard shortcuts
pub fn handle_keyboard_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    tour: Res<TourState>,
    overlay: Option<Res<ProjectsOverlay>>,
    mut intents: MessageWriter<TourIntent>,
    mut contexts: EguiContexts,
) {
    // The projects overlay is modal and handles its own Escape
    if overlay.is_some_and(|overlay| overlay.open) {
        return;
    }

    // Check if egui wants keyboard input (e.g., a focused text field)
    if let Ok(ctx) = contexts.ctx_mut() {
        if ctx.wants_keyboard_input() {
            return;
        }
    }

    let popup_open = tour.controller.open_popup().is_some();
    intents.write_batch(shortcut_intents(&keyboard, popup_open));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_space_toggles() {
        let mut keyboard = ButtonInput::<KeyCode>::default();
        keyboard.press(KeyCode::Space);
        assert_eq!(shortcut_intents(&keyboard, false), vec![TourIntent::TogglePlayback]);
    }

    #[test]
    fn test_escape_prefers_closing_popup() {
        let mut keyboard = ButtonInput::<KeyCode>::default();
        keyboard.press(KeyCode::Escape);
        assert_eq!(shortcut_intents(&keyboard, true), vec![TourIntent::ClosePopup]);
        assert_eq!(shortcut_intents(&keyboard, false), vec![TourIntent::Cancel]);
    }

    #[test]
    fn test_digits_select_waypoints() {
        let mut keyboard = ButtonInput::<KeyCode>::default();
        keyboard.press(KeyCode::Digit3);
        assert_eq!(shortcut_intents(&keyboard, false), vec![TourIntent::SelectWaypoint(2)]);
    }

    #[test]
    fn test_held_keys_do_not_repeat() {
        let mut keyboard = ButtonInput::<KeyCode>::default();
        keyboard.press(KeyCode::Space);
        keyboard.clear();
        assert!(shortcut_intents(&keyboard, false).is_empty());
    }
}
