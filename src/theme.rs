use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};
use catppuccin::FlavorName;

/// Convert a catppuccin color to a bevy Color via its RGB values.
fn cat_to_bevy(c: &catppuccin::Color) -> Color {
    Color::srgb(
        c.rgb.r as f32 / 255.0,
        c.rgb.g as f32 / 255.0,
        c.rgb.b as f32 / 255.0,
    )
}

/// Central theme resource for the application.
///
/// Wraps a catppuccin flavor and names the palette entries by what they
/// paint on the map and in the HUD.
#[derive(Resource)]
pub struct AppTheme {
    active_flavor: FlavorName,
}

impl Default for AppTheme {
    fn default() -> Self {
        Self {
            active_flavor: FlavorName::Mocha,
        }
    }
}

impl AppTheme {
    fn colors(&self) -> &catppuccin::FlavorColors {
        &catppuccin::PALETTE.get_flavor(self.active_flavor).colors
    }

    // -- Map --

    pub fn ocean(&self) -> Color { cat_to_bevy(&self.colors().crust) }
    pub fn graticule(&self) -> Color { cat_to_bevy(&self.colors().surface0) }
    pub fn route(&self) -> Color { cat_to_bevy(&self.colors().overlay1) }
    pub fn route_flown(&self) -> Color { cat_to_bevy(&self.colors().sky) }
    pub fn waypoint(&self) -> Color { cat_to_bevy(&self.colors().mauve) }
    pub fn waypoint_active(&self) -> Color { cat_to_bevy(&self.colors().peach) }
    pub fn waypoint_dimmed(&self) -> Color { cat_to_bevy(&self.colors().overlay0) }
    pub fn plane(&self) -> Color { cat_to_bevy(&self.colors().yellow) }

    // -- HUD --

    pub fn panel_bg(&self) -> Color { cat_to_bevy(&self.colors().mantle) }
    pub fn panel_border(&self) -> Color { cat_to_bevy(&self.colors().surface1) }
    pub fn text_primary(&self) -> Color { cat_to_bevy(&self.colors().text) }
    pub fn text_dim(&self) -> Color { cat_to_bevy(&self.colors().subtext0) }
    pub fn accent(&self) -> Color { cat_to_bevy(&self.colors().blue) }
}

/// Convert a `bevy::color::Color` to `egui::Color32`.
pub fn to_egui_color32(color: Color) -> egui::Color32 {
    let srgba = color.to_srgba();
    egui::Color32::from_rgba_unmultiplied(
        (srgba.red * 255.0) as u8,
        (srgba.green * 255.0) as u8,
        (srgba.blue * 255.0) as u8,
        (srgba.alpha * 255.0) as u8,
    )
}

/// egui visuals built from the active palette.
pub fn egui_visuals(theme: &AppTheme) -> egui::Visuals {
    let mut visuals = egui::Visuals::dark();
    visuals.panel_fill = to_egui_color32(theme.panel_bg());
    visuals.window_fill = to_egui_color32(theme.panel_bg());
    visuals.window_stroke = egui::Stroke::new(1.0, to_egui_color32(theme.panel_border()));
    visuals.hyperlink_color = to_egui_color32(theme.accent());
    visuals.selection.bg_fill = to_egui_color32(theme.accent());
    visuals.override_text_color = Some(to_egui_color32(theme.text_primary()));
    visuals
}

pub struct ThemePlugin;

impl Plugin for ThemePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AppTheme>()
            .add_systems(Update, apply_clear_color)
            .add_systems(bevy_egui::EguiPrimaryContextPass, apply_egui_theme);
    }
}

fn apply_clear_color(theme: Res<AppTheme>, mut clear_color: ResMut<ClearColor>) {
    if theme.is_changed() {
        clear_color.0 = theme.ocean();
    }
}

/// System that applies the palette to egui whenever `AppTheme` changes.
pub fn apply_egui_theme(
    theme: Res<AppTheme>,
    mut contexts: EguiContexts,
    mut applied: Local<bool>,
) {
    if *applied && !theme.is_changed() {
        return;
    }
    if let Ok(ctx) = contexts.ctx_mut() {
        ctx.set_visuals(egui_visuals(&theme));
        *applied = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_conversion_is_opaque() {
        let c = to_egui_color32(AppTheme::default().plane());
        assert_eq!(c.a(), 255);
    }

    #[test]
    fn test_active_waypoint_stands_out() {
        let theme = AppTheme::default();
        assert_ne!(
            to_egui_color32(theme.waypoint()),
            to_egui_color32(theme.waypoint_active())
        );
    }
}
