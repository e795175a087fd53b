use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPrimaryContextPass};

use crate::config::{AppConfig, LinksConfig};
use crate::geo::LatLon;
use crate::projects::{resolve_route, InAppRoute, ProjectsOverlay};
use crate::theme::{to_egui_color32, AppTheme};
use crate::tour::{TourIntent, TourState, TourView, Waypoint};

/// Height of the bottom control bar in pixels.
const HUD_HEIGHT: f32 = 100.0;
/// Font size for secondary HUD text.
const SMALL_FONT_SIZE: f32 = 11.0;
const POPUP_WIDTH: f32 = 260.0;

pub(crate) struct HudPlugin;

impl Plugin for HudPlugin {
    fn build(&self, app: &mut App) {
        let links = app
            .world()
            .get_resource::<AppConfig>()
            .map(|config| config.links.clone())
            .unwrap_or_default();
        app.insert_resource(links)
            .init_resource::<ProjectsOverlay>()
            .add_systems(EguiPrimaryContextPass, render_hud);
    }
}

/// Bottom bar: play/pause, progress, remaining distance, waypoint buttons.
///
/// Waypoint buttons are only enabled while paused, matching the markers.
pub fn render_controls(
    ui: &mut egui::Ui,
    view: &TourView<LatLon>,
    waypoints: &[Waypoint],
    dim: egui::Color32,
    intents: &mut Vec<TourIntent>,
) {
    ui.horizontal(|ui| {
        let label = if view.is_playing { "Pause" } else { "Play" };
        if ui.button(label).clicked() {
            intents.push(TourIntent::TogglePlayback);
        }

        ui.add(
            egui::ProgressBar::new(view.progress as f32)
                .desired_width(180.0)
                .desired_height(8.0),
        );
        ui.label(format!("{:.0}%", view.progress * 100.0));
        ui.label(
            egui::RichText::new(format!("{:.0} km left", view.remaining_distance))
                .size(SMALL_FONT_SIZE)
                .color(dim),
        );
    });

    ui.horizontal_wrapped(|ui| {
        for (index, waypoint) in waypoints.iter().enumerate() {
            let text = format!("{}. {}", index + 1, waypoint.label);
            let button = egui::Button::new(text).selected(index == view.active_index);
            if ui.add_enabled(!view.is_playing, button).clicked() {
                intents.push(TourIntent::SelectWaypoint(index));
            }
        }
        if view.is_playing {
            ui.label(
                egui::RichText::new("Pause to click a waypoint")
                    .size(SMALL_FONT_SIZE)
                    .italics()
                    .color(dim),
            );
        }
    });
}

/// Contact links and the projects button. Returns true when "Projects" was
/// clicked.
pub fn render_link_row(ui: &mut egui::Ui, links: &LinksConfig) -> bool {
    let mut open_projects = false;
    ui.horizontal(|ui| {
        if !links.linkedin.is_empty() {
            ui.hyperlink_to("LinkedIn", &links.linkedin);
        }
        if !links.github.is_empty() {
            ui.hyperlink_to("GitHub", &links.github);
        }
        if !links.email.is_empty() {
            ui.hyperlink_to("Email", format!("mailto:{}", links.email));
        }
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button("Projects").clicked() {
                open_projects = true;
            }
        });
    });
    open_projects
}

/// Popup card for a waypoint. Returns an in-app route when its internal
/// link was clicked.
pub fn render_popup_card(
    ui: &mut egui::Ui,
    waypoint: &Waypoint,
    intents: &mut Vec<TourIntent>,
) -> Option<String> {
    let mut navigate = None;

    ui.heading(waypoint.display_title());
    if let Some(subtitle) = &waypoint.subtitle {
        ui.label(egui::RichText::new(subtitle).italics());
    }
    if let Some(blurb) = &waypoint.blurb {
        ui.label(blurb);
    }

    ui.horizontal(|ui| {
        if let Some(href) = &waypoint.link_href {
            if waypoint.has_external_link() {
                ui.hyperlink_to(waypoint.display_link_text(), href);
            } else if ui.button(waypoint.display_link_text()).clicked() {
                navigate = Some(href.clone());
            }
        }
        if ui.button("Close").clicked() {
            intents.push(TourIntent::ClosePopup);
        }
    });

    navigate
}

fn render_hud(
    mut contexts: EguiContexts,
    tour: Res<TourState>,
    theme: Res<AppTheme>,
    links: Res<LinksConfig>,
    mut overlay: ResMut<ProjectsOverlay>,
    mut intent_writer: MessageWriter<TourIntent>,
) {
    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };

    let view = tour.view();
    let dim = to_egui_color32(theme.text_dim());
    let mut intents = Vec::new();

    let frame = egui::Frame::default()
        .fill(to_egui_color32(theme.panel_bg()))
        .stroke(egui::Stroke::new(1.0, to_egui_color32(theme.panel_border())))
        .inner_margin(egui::Margin::symmetric(10, 6));

    egui::TopBottomPanel::bottom("tour_hud")
        .exact_height(HUD_HEIGHT)
        .frame(frame)
        .show(ctx, |ui| {
            render_controls(ui, &view, &tour.waypoints, dim, &mut intents);
            if render_link_row(ui, &links) {
                overlay.show(None);
            }
        });

    if let Some(waypoint) = view.open_popup.and_then(|i| tour.waypoints.get(i)) {
        egui::Window::new("waypoint_popup")
            .id(egui::Id::new(("waypoint_popup", waypoint.id.as_str())))
            .title_bar(false)
            .resizable(false)
            .default_width(POPUP_WIDTH)
            .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-16.0, 16.0))
            .show(ctx, |ui| {
                if let Some(route) = render_popup_card(ui, waypoint, &mut intents) {
                    match resolve_route(&route) {
                        InAppRoute::Projects(selected) => overlay.show(selected),
                        InAppRoute::Unknown => info!("No in-app page for {}", route),
                    }
                }
            });
    }

    intent_writer.write_batch(intents);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TourConfig;
    use crate::tour::waypoint::default_waypoints;
    use egui_kittest::{kittest::Queryable, Harness};

    struct HudFixture {
        view: TourView<LatLon>,
        waypoints: Vec<Waypoint>,
        intents: Vec<TourIntent>,
    }

    fn fixture(autoplay_on_start: bool) -> HudFixture {
        let config = TourConfig {
            autoplay_on_start,
            ..TourConfig::default()
        };
        let tour = TourState::new(default_waypoints(), config);
        HudFixture {
            view: tour.view(),
            waypoints: tour.waypoints,
            intents: Vec::new(),
        }
    }

    fn controls_harness(state: HudFixture) -> Harness<'static, HudFixture> {
        Harness::new_ui_state(
            |ui, state: &mut HudFixture| {
                render_controls(
                    ui,
                    &state.view,
                    &state.waypoints,
                    egui::Color32::GRAY,
                    &mut state.intents,
                );
            },
            state,
        )
    }

    #[test]
    fn test_paused_tour_offers_play() {
        let harness = controls_harness(fixture(false));
        harness.get_by_label("Play");
        assert!(harness.query_by_label("Pause").is_none());
    }

    #[test]
    fn test_playing_tour_offers_pause() {
        let harness = controls_harness(fixture(true));
        harness.get_by_label("Pause");
    }

    #[test]
    fn test_progress_and_distance_shown() {
        let mut state = fixture(false);
        state.view.progress = 0.4;
        state.view.remaining_distance = 1234.4;
        let harness = controls_harness(state);
        harness.get_by_label("40%");
        harness.get_by_label("1234 km left");
    }

    #[test]
    fn test_waypoint_buttons_listed() {
        let harness = controls_harness(fixture(false));
        harness.get_by_label("1. Kolkata, India");
        harness.get_by_label("7. YYZ, Contact");
    }

    #[test]
    fn test_hint_shown_only_while_playing() {
        let harness = controls_harness(fixture(true));
        harness.get_by_label("Pause to click a waypoint");

        let harness = controls_harness(fixture(false));
        assert!(harness.query_by_label("Pause to click a waypoint").is_none());
    }

    #[test]
    fn test_link_row_shows_configured_links() {
        let links = LinksConfig {
            email: "me@example.com".to_string(),
            ..LinksConfig::default()
        };
        let harness = Harness::new_ui_state(
            |ui, links: &mut LinksConfig| {
                render_link_row(ui, links);
            },
            links,
        );
        harness.get_by_label("LinkedIn");
        harness.get_by_label("GitHub");
        harness.get_by_label("Email");
        harness.get_by_label("Projects");
    }

    #[test]
    fn test_link_row_hides_empty_links() {
        let links = LinksConfig {
            linkedin: String::new(),
            github: String::new(),
            email: String::new(),
        };
        let harness = Harness::new_ui_state(
            |ui, links: &mut LinksConfig| {
                render_link_row(ui, links);
            },
            links,
        );
        assert!(harness.query_by_label("LinkedIn").is_none());
        assert!(harness.query_by_label("Email").is_none());
        harness.get_by_label("Projects");
    }

    #[test]
    fn test_projects_button_reports_click() {
        let mut harness = Harness::new_ui_state(
            |ui, clicked: &mut bool| {
                if render_link_row(ui, &LinksConfig::default()) {
                    *clicked = true;
                }
            },
            false,
        );
        harness.get_by_label("Projects").click();
        harness.run();
        assert!(*harness.state());
    }

    #[test]
    fn test_popup_card_shows_texts() {
        let waypoint = default_waypoints().remove(0);
        let harness = Harness::new_ui_state(
            |ui, intents: &mut Vec<TourIntent>| {
                render_popup_card(ui, &waypoint, intents);
            },
            Vec::new(),
        );
        harness.get_by_label("Born in Kolkata");
        harness.get_by_label("Proud immigrant, moved at 4");
        harness.get_by_label("Close");
    }

    #[test]
    fn test_popup_card_falls_back_to_label() {
        let mut waypoint = default_waypoints().remove(1);
        waypoint.title = None;
        let harness = Harness::new_ui_state(
            |ui, intents: &mut Vec<TourIntent>| {
                render_popup_card(ui, &waypoint, intents);
            },
            Vec::new(),
        );
        harness.get_by_label("Toronto, U of T");
    }

    #[test]
    fn test_popup_card_internal_link_button() {
        let waypoint = default_waypoints()
            .into_iter()
            .find(|w| w.id == "projects")
            .unwrap();
        let harness = Harness::new_ui_state(
            |ui, intents: &mut Vec<TourIntent>| {
                render_popup_card(ui, &waypoint, intents);
            },
            Vec::new(),
        );
        harness.get_by_label("Open Projects");
    }

    #[test]
    fn test_popup_card_internal_link_returns_route() {
        let waypoint = default_waypoints()
            .into_iter()
            .find(|w| w.id == "projects")
            .unwrap();
        let mut harness = Harness::new_ui_state(
            |ui, route: &mut Option<String>| {
                let mut intents = Vec::new();
                if let Some(clicked) = render_popup_card(ui, &waypoint, &mut intents) {
                    *route = Some(clicked);
                }
            },
            None,
        );
        harness.get_by_label("Open Projects").click();
        harness.run();
        let route = harness.state().clone().unwrap();
        assert_eq!(resolve_route(&route), InAppRoute::Projects(None));
    }
}
