//! Time-based motion for the tour marker.
//!
//! Two mutually exclusive modes: linear autoplay along the route, and an
//! eased point-to-point jump to a selected waypoint. Both take the frame
//! timestamp as input and fix their time origin on the first frame that
//! samples them, so (re)starting a mode never skips ahead.

use serde::{Deserialize, Serialize};

use crate::geo::Metric;
use crate::tour::route::clamp_progress;

/// Cubic ease-in-out: `4t³` for the first half, mirrored for the second.
pub fn ease_in_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// Elapsed fraction of a timed motion, clamped to [0, 1].
fn fraction(now: f64, started_at: f64, duration_secs: f64) -> f64 {
    if duration_secs <= 0.0 {
        return 1.0;
    }
    ((now - started_at) / duration_secs).clamp(0.0, 1.0)
}

// =============================================================================
// Autoplay
// =============================================================================

/// Linear progress from `start_progress` to the end of the route over a
/// fixed duration. Resuming from partway scales the remaining distance over
/// the same duration.
#[derive(Clone, Debug, PartialEq)]
pub struct Autoplay {
    start_progress: f64,
    started_at: Option<f64>,
    duration_secs: f64,
}

impl Autoplay {
    pub fn new(start_progress: f64, duration_secs: f64) -> Self {
        Self {
            start_progress: clamp_progress(start_progress),
            started_at: None,
            duration_secs,
        }
    }

    /// Progress at `now`, and whether the run has reached the end.
    pub fn progress_at(&mut self, now: f64) -> (f64, bool) {
        let started_at = *self.started_at.get_or_insert(now);
        let t = fraction(now, started_at, self.duration_secs);
        if t >= 1.0 {
            return (1.0, true);
        }
        let p0 = self.start_progress;
        (p0 + (1.0 - p0) * t, false)
    }
}

// =============================================================================
// Direct Jump
// =============================================================================

/// Duration policy for direct jumps: proportional to distance, clamped.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct JumpPolicy {
    /// Milliseconds of flight per unit of route distance (km on the map)
    pub ms_per_unit: f64,
    pub min_ms: f64,
    pub max_ms: f64,
}

impl Default for JumpPolicy {
    fn default() -> Self {
        Self {
            ms_per_unit: 12.0,
            min_ms: 700.0,
            max_ms: 2200.0,
        }
    }
}

impl JumpPolicy {
    pub fn duration_ms(&self, distance: f64) -> f64 {
        (distance.max(0.0) * self.ms_per_unit).clamp(self.min_ms, self.max_ms.max(self.min_ms))
    }

    pub fn duration_secs(&self, distance: f64) -> f64 {
        self.duration_ms(distance) / 1000.0
    }
}

/// Eased flight from the marker's current position to a waypoint.
#[derive(Clone, Debug, PartialEq)]
pub struct DirectJump<P> {
    pub from: P,
    pub to: P,
    pub target: usize,
    pub heading: f64,
    pub duration_secs: f64,
    started_at: Option<f64>,
}

impl<P: Copy> DirectJump<P> {
    pub fn new<M: Metric<Point = P>>(from: P, to: P, target: usize, policy: &JumpPolicy) -> Self {
        Self {
            from,
            to,
            target,
            heading: M::bearing(from, to),
            duration_secs: policy.duration_secs(M::distance(from, to)),
            started_at: None,
        }
    }

    /// Position at `now`, and whether the jump has landed.
    pub fn sample<M: Metric<Point = P>>(&mut self, now: f64) -> (P, bool) {
        let started_at = *self.started_at.get_or_insert(now);
        let t = fraction(now, started_at, self.duration_secs);
        (M::interpolate(self.from, self.to, ease_in_out_cubic(t)), t >= 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Planar;
    use bevy::math::DVec2;

    #[test]
    fn test_ease_is_symmetric_and_anchored() {
        assert_eq!(ease_in_out_cubic(0.0), 0.0);
        assert_eq!(ease_in_out_cubic(0.5), 0.5);
        assert_eq!(ease_in_out_cubic(1.0), 1.0);
        let a = ease_in_out_cubic(0.25);
        let b = ease_in_out_cubic(0.75);
        assert!((a + b - 1.0).abs() < 1e-12);
        assert_eq!(ease_in_out_cubic(-1.0), 0.0);
        assert_eq!(ease_in_out_cubic(2.0), 1.0);
    }

    #[test]
    fn test_jump_duration_is_clamped() {
        let policy = JumpPolicy::default();
        // 25 * 12 = 300ms, raised to the minimum
        assert_eq!(policy.duration_ms(25.0), 700.0);
        assert_eq!(policy.duration_ms(100.0), 1200.0);
        assert_eq!(policy.duration_ms(10_000.0), 2200.0);
        assert_eq!(policy.duration_secs(100.0), 1.2);
    }

    #[test]
    fn test_autoplay_linear_from_start() {
        let mut autoplay = Autoplay::new(0.0, 20.0);
        assert_eq!(autoplay.progress_at(100.0), (0.0, false));
        assert_eq!(autoplay.progress_at(110.0), (0.5, false));
        assert_eq!(autoplay.progress_at(120.0), (1.0, true));
        assert_eq!(autoplay.progress_at(500.0), (1.0, true));
    }

    #[test]
    fn test_autoplay_resume_scales_remaining_distance() {
        let mut autoplay = Autoplay::new(0.5, 20.0);
        assert_eq!(autoplay.progress_at(3.0).0, 0.5);
        assert_eq!(autoplay.progress_at(13.0).0, 0.75);
        assert_eq!(autoplay.progress_at(23.0), (1.0, true));
    }

    #[test]
    fn test_jump_midpoint_matches_linear_midpoint() {
        let from = DVec2::new(0.0, 0.0);
        let to = DVec2::new(10.0, 15.0);
        let mut jump = DirectJump::new::<Planar>(from, to, 2, &JumpPolicy::default());
        assert_eq!(jump.duration_secs, 0.7);

        let (start, done) = jump.sample::<Planar>(1.0);
        assert_eq!(start, from);
        assert!(!done);

        let (mid, done) = jump.sample::<Planar>(1.35);
        assert!(!done);
        assert!((mid - (from + to) / 2.0).length() < 1e-9);

        let (end, done) = jump.sample::<Planar>(1.7);
        assert!(done);
        assert_eq!(end, to);
    }

    #[test]
    fn test_jump_heading_is_fixed() {
        let jump = DirectJump::new::<Planar>(DVec2::ZERO, DVec2::new(0.0, 5.0), 1, &JumpPolicy::default());
        assert!((jump.heading - 90.0).abs() < 1e-9);
    }
}
