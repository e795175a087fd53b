use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::config::ConfigError;
use crate::geo::LatLon;

/// A named stop on the tour, with the card text shown in its popup.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Waypoint {
    pub id: String,
    pub label: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blurb: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_href: Option<String>,
}

impl Waypoint {
    pub fn position(&self) -> LatLon {
        LatLon::new(self.lat, self.lng)
    }

    /// Popup heading; falls back to the marker label.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.label)
    }

    pub fn display_link_text(&self) -> &str {
        self.link_text.as_deref().unwrap_or("Open")
    }

    /// Whether the link leaves the app (opened in a browser) rather than
    /// naming an in-app route.
    pub fn has_external_link(&self) -> bool {
        self.link_href
            .as_deref()
            .is_some_and(|href| href.starts_with("http"))
    }
}

/// Reject waypoint lists whose ids are not unique.
pub fn validate_waypoints(waypoints: &[Waypoint]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for wp in waypoints {
        if !seen.insert(wp.id.as_str()) {
            return Err(ConfigError::DuplicateWaypoint(wp.id.clone()));
        }
    }
    Ok(())
}

fn stop(id: &str, label: &str, lat: f64, lng: f64) -> Waypoint {
    Waypoint {
        id: id.to_string(),
        label: label.to_string(),
        lat,
        lng,
        title: None,
        subtitle: None,
        blurb: None,
        link_text: None,
        link_href: None,
    }
}

/// The built-in tour used when the config does not list any waypoints.
pub fn default_waypoints() -> Vec<Waypoint> {
    vec![
        Waypoint {
            title: Some("Born in Kolkata".into()),
            subtitle: Some("Proud immigrant, moved at 4".into()),
            blurb: Some("Roots in Kolkata shape my perspective and drive.".into()),
            ..stop("kolkata", "Kolkata, India", 22.5726, 88.3639)
        },
        Waypoint {
            title: Some("University of Toronto".into()),
            subtitle: Some("CS @ U of T".into()),
            blurb: Some("DSA, systems, and a love for playful UI.".into()),
            ..stop("uoft", "Toronto, U of T", 43.6629, -79.3957)
        },
        Waypoint {
            title: Some("Gym Rat".into()),
            subtitle: Some("Fit4Less, Milton".into()),
            blurb: Some("Consistency > intensity. I lift, I code, I repeat.".into()),
            ..stop("fit4less", "Fit4Less, Milton", 43.5240, -79.8710)
        },
        Waypoint {
            title: Some("Projects".into()),
            subtitle: Some("Interactive, animated, web-native".into()),
            blurb: Some("I'm most proud of the things I've built. Dive in.".into()),
            link_text: Some("Open Projects".into()),
            link_href: Some("/projects".into()),
            ..stop("projects", "San Francisco, Projects", 37.7749, -122.4194)
        },
        Waypoint {
            title: Some("House Music in Lisbon".into()),
            subtitle: Some("Beaches, beats, and late nights".into()),
            blurb: Some(
                "I love house music and going out, but I'm just as ready to be locked in when I need to focus."
                    .into(),
            ),
            link_text: Some("My Spotify".into()),
            link_href: Some("https://open.spotify.com/".into()),
            ..stop("music", "Lisbon, Portugal", 38.7169, -9.1390)
        },
        Waypoint {
            title: Some("London Calling".into()),
            subtitle: Some("Future home (hopefully!)".into()),
            blurb: Some("Big tech, bigger culture. Manifesting this move.".into()),
            ..stop("london", "London, UK", 51.5074, -0.1278)
        },
        Waypoint {
            title: Some("Final Approach".into()),
            subtitle: Some("Let's work together".into()),
            blurb: Some("Open to internships and collabs. My inbox is always clear for takeoff.".into()),
            link_text: Some("Contact me".into()),
            link_href: Some("/contact".into()),
            ..stop("contact", "YYZ, Contact", 43.6777, -79.6248)
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_waypoints_are_valid() {
        let waypoints = default_waypoints();
        assert_eq!(waypoints.len(), 7);
        assert!(validate_waypoints(&waypoints).is_ok());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut waypoints = default_waypoints();
        waypoints.push(stop("london", "London again", 51.5, -0.12));
        match validate_waypoints(&waypoints) {
            Err(ConfigError::DuplicateWaypoint(id)) => assert_eq!(id, "london"),
            other => panic!("expected duplicate error, got {other:?}"),
        }
    }

    #[test]
    fn test_display_fallbacks() {
        let wp = stop("x", "Somewhere", 0.0, 0.0);
        assert_eq!(wp.display_title(), "Somewhere");
        assert_eq!(wp.display_link_text(), "Open");
        assert!(!wp.has_external_link());
    }

    #[test]
    fn test_external_link_detection() {
        let waypoints = default_waypoints();
        let music = waypoints.iter().find(|w| w.id == "music").unwrap();
        let projects = waypoints.iter().find(|w| w.id == "projects").unwrap();
        assert!(music.has_external_link());
        assert!(!projects.has_external_link());
    }
}
