use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

use crate::projects::{default_projects, validate_projects, Project};
use crate::tour::animation::JumpPolicy;
use crate::tour::waypoint::{default_waypoints, validate_waypoints, Waypoint};

const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read or write config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("duplicate waypoint id {0:?}")]
    DuplicateWaypoint(String),
    #[error("duplicate project id {0:?}")]
    DuplicateProject(String),
    #[error("invalid value for {field}: {value}")]
    InvalidNumber { field: &'static str, value: f64 },
}

#[derive(Resource, Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub map: MapConfig,
    #[serde(default)]
    pub tour: TourConfig,
    #[serde(default)]
    pub links: LinksConfig,
    #[serde(default = "default_waypoints")]
    pub waypoints: Vec<Waypoint>,
    #[serde(default = "default_projects")]
    pub projects: Vec<Project>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct MapConfig {
    pub default_latitude: f64,
    pub default_longitude: f64,
    pub default_zoom: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct TourConfig {
    /// Seconds to fly the whole route during autoplay
    pub autoplay_secs: f64,
    pub pause_on_popup: bool,
    pub autoplay_on_start: bool,
    /// Minimum spacing between map recenters while the marker moves
    pub recenter_interval_ms: u64,
    pub max_zoom_on_click: f32,
    pub jump: JumpPolicy,
}

/// Contact links shown in the HUD. An empty link is hidden.
#[derive(Resource, Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct LinksConfig {
    pub linkedin: String,
    pub github: String,
    /// Plain address; the HUD opens it as a `mailto:` link
    pub email: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            map: MapConfig::default(),
            tour: TourConfig::default(),
            links: LinksConfig::default(),
            waypoints: default_waypoints(),
            projects: default_projects(),
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            default_latitude: 20.0,
            default_longitude: 0.0,
            default_zoom: 2.0,
            min_zoom: 2.0,
            max_zoom: 10.0,
        }
    }
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            linkedin: "https://www.linkedin.com/".to_string(),
            github: "https://github.com/".to_string(),
            email: String::new(),
        }
    }
}

fn require_finite(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::InvalidNumber { field, value })
    }
}

fn require_non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    require_finite(field, value)?;
    if value < 0.0 {
        return Err(ConfigError::InvalidNumber { field, value });
    }
    Ok(())
}

impl MapConfig {
    /// Reject values the map resources cannot be built from (TOML accepts
    /// `nan` and `inf`).
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_finite("map.default_latitude", self.default_latitude)?;
        require_finite("map.default_longitude", self.default_longitude)?;
        require_finite("map.default_zoom", self.default_zoom as f64)?;
        require_finite("map.min_zoom", self.min_zoom as f64)?;
        require_finite("map.max_zoom", self.max_zoom as f64)?;
        Ok(())
    }
}

impl TourConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_finite("tour.autoplay_secs", self.autoplay_secs)?;
        if self.autoplay_secs <= 0.0 {
            return Err(ConfigError::InvalidNumber {
                field: "tour.autoplay_secs",
                value: self.autoplay_secs,
            });
        }
        require_finite("tour.max_zoom_on_click", self.max_zoom_on_click as f64)?;
        require_non_negative("tour.jump.ms_per_unit", self.jump.ms_per_unit)?;
        require_non_negative("tour.jump.min_ms", self.jump.min_ms)?;
        require_non_negative("tour.jump.max_ms", self.jump.max_ms)?;
        Ok(())
    }
}

impl Default for TourConfig {
    fn default() -> Self {
        Self {
            autoplay_secs: 20.0,
            pause_on_popup: true,
            autoplay_on_start: true,
            recenter_interval_ms: 120,
            max_zoom_on_click: 12.0,
            jump: JumpPolicy::default(),
        }
    }
}

fn config_path() -> PathBuf {
    crate::paths::config_dir().join(CONFIG_FILE)
}

/// Parse and validate a config document.
pub fn parse_config(contents: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = toml::from_str(contents)?;
    config.map.validate()?;
    config.tour.validate()?;
    validate_waypoints(&config.waypoints)?;
    validate_projects(&config.projects)?;
    Ok(config)
}

pub fn load_config() -> AppConfig {
    let path = config_path();
    if path.exists() {
        match fs::read_to_string(&path)
            .map_err(ConfigError::from)
            .and_then(|contents| parse_config(&contents))
        {
            Ok(config) => {
                info!("Loaded config from {:?}", path);
                return config;
            }
            Err(e) => {
                warn!("{}, using defaults", e);
                return AppConfig::default();
            }
        }
    }

    let config = AppConfig::default();
    if let Err(e) = save_config(&config) {
        error!("{}", e);
    }
    config
}

pub fn save_config(config: &AppConfig) -> Result<(), ConfigError> {
    let path = config_path();
    let contents = toml::to_string_pretty(config)?;
    fs::create_dir_all(crate::paths::config_dir())?;
    fs::write(&path, contents)?;
    info!("Saved config to {:?}", path);
    Ok(())
}

pub struct ConfigPlugin;

impl Plugin for ConfigPlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<AppConfig>() {
            app.insert_resource(load_config());
        }
    }
}
