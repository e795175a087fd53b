//! Project showcase overlay. Opens from the HUD "Projects" button or from an
//! in-app `/projects` link on a popup card.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPrimaryContextPass};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::config::{AppConfig, ConfigError};

const PROJECTS_ROUTE: &str = "/projects";
const OVERLAY_WIDTH: f32 = 640.0;
const TAG_FONT_SIZE: f32 = 11.0;

/// A showcased project.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub short_desc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_desc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// Reject project lists whose ids are not unique.
pub fn validate_projects(projects: &[Project]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for project in projects {
        if !seen.insert(project.id.as_str()) {
            return Err(ConfigError::DuplicateProject(project.id.clone()));
        }
    }
    Ok(())
}

fn project(id: &str, name: &str, short_desc: &str, long_desc: &str, tags: &[&str]) -> Project {
    Project {
        id: id.to_string(),
        name: name.to_string(),
        short_desc: short_desc.to_string(),
        long_desc: Some(long_desc.to_string()),
        github_url: Some(format!("https://github.com/yourname/{id}")),
        tags: tags.iter().map(|t| t.to_string()).collect(),
    }
}

/// Projects shown when the config does not list any.
pub fn default_projects() -> Vec<Project> {
    vec![
        project(
            "visionboard",
            "VisionBoard",
            "Mood-based outfits to match your future self.",
            "Recommends outfits from moodboards and curates looks across seasons.",
            &["Next.js", "AI"],
        ),
        project(
            "fitmaker",
            "FitMaker",
            "Upload your closet, get auto-generated outfit combos.",
            "Builds capsule combos from your own clothes and suggests similar items online.",
            &["React", "Python"],
        ),
        project(
            "tickettracker",
            "TicketTracker",
            "Track event prices and alert on dips.",
            "Watches listings and pings you when a price drops below your target.",
            &["FastAPI", "Cron"],
        ),
        project(
            "setlist-oracle",
            "Setlist Oracle",
            "Predict the next concert's setlist.",
            "Frequency analysis over past setlists, with confidence scores and encore odds.",
            &["PyTorch"],
        ),
    ]
}

// =============================================================================
// Resources
// =============================================================================

/// Configured projects, in display order.
#[derive(Resource, Clone, Debug, Default)]
pub struct ProjectCatalog(pub Vec<Project>);

/// Whether the overlay is showing, and whose details are open.
#[derive(Resource, Clone, Debug, Default, PartialEq)]
pub struct ProjectsOverlay {
    pub open: bool,
    pub selected: Option<String>,
}

impl ProjectsOverlay {
    pub fn show(&mut self, selected: Option<String>) {
        self.open = true;
        self.selected = selected;
    }

    pub fn close(&mut self) {
        *self = Self::default();
    }
}

/// Where a non-`http` link target leads inside the app.
#[derive(Debug, PartialEq)]
pub enum InAppRoute {
    /// `/projects`, optionally `/projects/<id>` with that project's details open
    Projects(Option<String>),
    Unknown,
}

pub fn resolve_route(href: &str) -> InAppRoute {
    let Some(rest) = href.strip_prefix(PROJECTS_ROUTE) else {
        return InAppRoute::Unknown;
    };
    if rest.is_empty() || rest == "/" {
        return InAppRoute::Projects(None);
    }
    match rest.strip_prefix('/') {
        Some(id) => InAppRoute::Projects(Some(id.trim_end_matches('/').to_string())),
        None => InAppRoute::Unknown,
    }
}

// =============================================================================
// Plugin
// =============================================================================

pub(crate) struct ProjectsPlugin;

impl Plugin for ProjectsPlugin {
    fn build(&self, app: &mut App) {
        let configured = app
            .world()
            .get_resource::<AppConfig>()
            .map(|config| config.projects.clone())
            .unwrap_or_else(default_projects);

        let projects = match validate_projects(&configured) {
            Ok(()) => configured,
            Err(e) => {
                warn!("{}, using the built-in projects", e);
                default_projects()
            }
        };

        app.insert_resource(ProjectCatalog(projects))
            .init_resource::<ProjectsOverlay>()
            .add_systems(EguiPrimaryContextPass, render_projects_overlay);
    }
}

// =============================================================================
// Rendering
// =============================================================================

/// Project grid with a details pane for the selected project.
pub fn render_projects(ui: &mut egui::Ui, projects: &[Project], overlay: &mut ProjectsOverlay) {
    ui.horizontal(|ui| {
        ui.heading("Projects");
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button("Close").clicked() {
                overlay.close();
            }
        });
    });
    ui.separator();

    if projects.is_empty() {
        ui.label("No projects configured");
        return;
    }

    let selected = overlay
        .selected
        .as_deref()
        .and_then(|id| projects.iter().find(|p| p.id == id));

    ui.columns(2, |columns| {
        egui::ScrollArea::vertical()
            .id_salt("project_grid")
            .show(&mut columns[0], |ui| {
                for project in projects {
                    render_project_card(ui, project, overlay);
                }
            });

        match selected {
            Some(project) => render_project_details(&mut columns[1], project, overlay),
            None => {
                columns[1].label("Select a project to see details");
            }
        }
    });
}

fn render_project_card(ui: &mut egui::Ui, project: &Project, overlay: &mut ProjectsOverlay) {
    ui.group(|ui| {
        ui.set_width(ui.available_width());
        let is_selected = overlay.selected.as_deref() == Some(project.id.as_str());
        let button = egui::Button::new(egui::RichText::new(project.name.as_str()).strong())
            .selected(is_selected);
        if ui.add(button).clicked() {
            overlay.selected = Some(project.id.clone());
        }
        ui.label(project.short_desc.as_str());
        if !project.tags.is_empty() {
            ui.horizontal_wrapped(|ui| {
                for tag in &project.tags {
                    ui.label(egui::RichText::new(tag.as_str()).size(TAG_FONT_SIZE));
                }
            });
        }
    });
}

fn render_project_details(ui: &mut egui::Ui, project: &Project, overlay: &mut ProjectsOverlay) {
    ui.heading(project.name.as_str());
    if let Some(desc) = &project.long_desc {
        ui.label(desc.as_str());
    }
    ui.horizontal(|ui| {
        if let Some(url) = &project.github_url {
            ui.hyperlink_to("GitHub", url);
        }
        if ui.small_button("Close details").clicked() {
            overlay.selected = None;
        }
    });
}

/// Modal overlay; Escape or a click on the backdrop closes it.
fn render_projects_overlay(
    mut contexts: EguiContexts,
    catalog: Res<ProjectCatalog>,
    mut overlay: ResMut<ProjectsOverlay>,
) {
    if !overlay.open {
        return;
    }
    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };

    let response = egui::Modal::new(egui::Id::new("projects_overlay")).show(ctx, |ui| {
        ui.set_width(OVERLAY_WIDTH);
        render_projects(ui, &catalog.0, &mut overlay);
    });
    if response.should_close() {
        overlay.close();
    }
}
