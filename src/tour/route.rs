use std::marker::PhantomData;

use crate::geo::Metric;

/// Shortest length a segment is treated as having, so duplicate adjacent
/// waypoints never divide by zero.
pub const MIN_SEGMENT_LENGTH: f64 = 1e-6;

/// Relative tolerance used when matching a target distance against the
/// cumulative table.
const SNAP_TOLERANCE: f64 = 1e-12;

/// Ordered path through the waypoints with its cumulative-distance table.
///
/// `cumulative[0] == 0`, the table never decreases, and
/// `total == cumulative[last]`.
#[derive(Clone, Debug)]
pub struct Route<M: Metric> {
    points: Vec<M::Point>,
    cumulative: Vec<f64>,
    total: f64,
    _metric: PhantomData<M>,
}

impl<M: Metric> Route<M> {
    pub fn new(points: Vec<M::Point>) -> Self {
        let mut cumulative = Vec::with_capacity(points.len());
        let mut total = 0.0;
        if !points.is_empty() {
            cumulative.push(0.0);
        }
        for pair in points.windows(2) {
            total += M::distance(pair[0], pair[1]);
            cumulative.push(total);
        }
        Self {
            points,
            cumulative,
            total,
            _metric: PhantomData,
        }
    }

    pub fn points(&self) -> &[M::Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn cumulative_lengths(&self) -> (&[f64], f64) {
        (&self.cumulative, self.total)
    }

    /// Position and heading at a normalized progress along the route.
    pub fn position_at_progress(&self, progress: f64) -> (M::Point, f64) {
        let Some(&first) = self.points.first() else {
            return (M::origin(), 0.0);
        };
        if self.points.len() == 1 || self.total <= 0.0 {
            return (first, 0.0);
        }

        let p = clamp_progress(progress);
        let target = p * self.total;
        let tolerance = self.total * SNAP_TOLERANCE;

        // Smallest index whose cumulative distance reaches the target; a tie
        // on a boundary resolves to the segment ending there.
        let idx = self
            .cumulative
            .partition_point(|&c| c < target - tolerance)
            .clamp(1, self.points.len() - 1);

        let a = self.points[idx - 1];
        let b = self.points[idx];
        let heading = M::bearing(a, b);

        if (self.cumulative[idx] - target).abs() <= tolerance {
            return (b, heading);
        }

        let seg_start = self.cumulative[idx - 1];
        let seg_len = (self.cumulative[idx] - seg_start).max(MIN_SEGMENT_LENGTH);
        let t = ((target - seg_start) / seg_len).clamp(0.0, 1.0);
        (M::interpolate(a, b, t), heading)
    }

    /// Normalized progress at which the marker sits on waypoint `index`.
    pub fn progress_for_waypoint(&self, index: usize) -> f64 {
        if self.total <= 0.0 || self.is_empty() {
            return 0.0;
        }
        let index = index.min(self.cumulative.len() - 1);
        self.cumulative[index] / self.total
    }

    pub fn waypoint_progresses(&self) -> Vec<f64> {
        (0..self.points.len())
            .map(|i| self.progress_for_waypoint(i))
            .collect()
    }

    /// Distance left to fly from `progress` to the end of the route.
    pub fn remaining_distance(&self, progress: f64) -> f64 {
        (self.total * (1.0 - clamp_progress(progress))).max(0.0)
    }
}

/// Clamp to [0, 1], treating NaN as the start of the route.
pub fn clamp_progress(progress: f64) -> f64 {
    if progress.is_nan() {
        0.0
    } else {
        progress.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{Geographic, LatLon, Planar};
    use bevy::math::DVec2;

    /// Three points at cumulative distances [0, 10, 25].
    fn scenario_route() -> Route<Planar> {
        Route::new(vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(10.0, 0.0),
            DVec2::new(10.0, 15.0),
        ])
    }

    #[test]
    fn test_empty_route_is_degenerate() {
        let route: Route<Planar> = Route::new(vec![]);
        let (cum, total) = route.cumulative_lengths();
        assert!(cum.is_empty());
        assert_eq!(total, 0.0);
        assert_eq!(route.position_at_progress(0.5), (DVec2::ZERO, 0.0));
        assert_eq!(route.progress_for_waypoint(3), 0.0);
    }

    #[test]
    fn test_single_point_route() {
        let p = DVec2::new(4.0, 2.0);
        let route: Route<Planar> = Route::new(vec![p]);
        assert_eq!(route.cumulative_lengths(), (&[0.0][..], 0.0));
        assert_eq!(route.position_at_progress(1.0), (p, 0.0));
    }

    #[test]
    fn test_scenario_cumulative_table() {
        let route = scenario_route();
        let (cum, total) = route.cumulative_lengths();
        assert_eq!(cum, &[0.0, 10.0, 25.0]);
        assert_eq!(total, 25.0);
    }

    #[test]
    fn test_scenario_progress_for_waypoint() {
        let route = scenario_route();
        assert_eq!(route.progress_for_waypoint(1), 0.4);
        let (pos, heading) = route.position_at_progress(0.4);
        assert_eq!(pos, DVec2::new(10.0, 0.0));
        // Tie resolves to the segment ending at waypoint 1
        assert_eq!(heading, 0.0);
    }

    #[test]
    fn test_endpoints() {
        let route = scenario_route();
        assert_eq!(route.position_at_progress(0.0).0, DVec2::new(0.0, 0.0));
        assert_eq!(route.position_at_progress(1.0).0, DVec2::new(10.0, 15.0));
        // Out-of-range progress is clamped
        assert_eq!(route.position_at_progress(-3.0).0, DVec2::new(0.0, 0.0));
        assert_eq!(route.position_at_progress(7.0).0, DVec2::new(10.0, 15.0));
        assert_eq!(route.position_at_progress(f64::NAN).0, DVec2::new(0.0, 0.0));
    }

    #[test]
    fn test_heading_is_constant_within_segment() {
        let route = scenario_route();
        let (_, h1) = route.position_at_progress(0.1);
        let (_, h2) = route.position_at_progress(0.35);
        assert_eq!(h1, h2);
        let (pos, h3) = route.position_at_progress(0.7);
        assert!((h3 - 90.0).abs() < 1e-9);
        assert!((pos.x - 10.0).abs() < 1e-9);
        assert!((pos.y - 7.5).abs() < 1e-9);
    }

    #[test]
    fn test_round_trip_geographic_waypoints() {
        let waypoints = crate::tour::waypoint::default_waypoints();
        let points: Vec<LatLon> = waypoints.iter().map(|w| w.position()).collect();
        let route: Route<Geographic> = Route::new(points.clone());
        for (i, expected) in points.iter().enumerate() {
            let (pos, _) = route.position_at_progress(route.progress_for_waypoint(i));
            assert_eq!(pos, *expected, "waypoint {i}");
        }
    }

    #[test]
    fn test_cumulative_non_decreasing_with_duplicates() {
        let route: Route<Planar> = Route::new(vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(5.0, 0.0),
            DVec2::new(5.0, 0.0),
            DVec2::new(5.0, 5.0),
        ]);
        let (cum, total) = route.cumulative_lengths();
        assert!(cum.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*cum.last().unwrap(), total);
        // Sampling across the zero-length segment stays finite
        for step in 0..=100 {
            let (pos, heading) = route.position_at_progress(step as f64 / 100.0);
            assert!(pos.x.is_finite() && pos.y.is_finite() && heading.is_finite());
        }
    }

    #[test]
    fn test_all_identical_points_has_zero_total() {
        let p = DVec2::new(1.0, 1.0);
        let route: Route<Planar> = Route::new(vec![p, p, p]);
        assert_eq!(route.total(), 0.0);
        assert_eq!(route.position_at_progress(0.6), (p, 0.0));
        assert_eq!(route.progress_for_waypoint(2), 0.0);
    }

    #[test]
    fn test_remaining_distance() {
        let route = scenario_route();
        assert_eq!(route.remaining_distance(0.0), 25.0);
        assert!((route.remaining_distance(0.4) - 15.0).abs() < 1e-9);
        assert_eq!(route.remaining_distance(1.0), 0.0);
    }
}
