/// Throttle gate for recentering the map on the moving marker.
///
/// The marker moves every frame, but panning the viewport is comparatively
/// expensive, so recenters are issued at most once per `min_interval_secs`.
#[derive(Clone, Debug)]
pub struct CameraFollower {
    min_interval_secs: f64,
    last_recenter: Option<f64>,
}

impl CameraFollower {
    pub fn new(min_interval_secs: f64) -> Self {
        Self {
            min_interval_secs: min_interval_secs.max(0.0),
            last_recenter: None,
        }
    }

    /// Returns true, and records `now`, if a recenter is allowed at `now`.
    pub fn offer(&mut self, now: f64) -> bool {
        match self.last_recenter {
            Some(last) if now - last < self.min_interval_secs => false,
            _ => {
                self.last_recenter = Some(now);
                true
            }
        }
    }

    pub fn reset(&mut self) {
        self.last_recenter = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_offer_always_recenters() {
        let mut follower = CameraFollower::new(0.12);
        assert!(follower.offer(0.0));
    }

    #[test]
    fn test_offers_inside_interval_are_dropped() {
        let mut follower = CameraFollower::new(0.12);
        assert!(follower.offer(1.0));
        assert!(!follower.offer(1.05));
        assert!(!follower.offer(1.1));
        assert!(follower.offer(1.125));
        assert!(!follower.offer(1.2));
    }

    #[test]
    fn test_frame_rate_recenters_are_thinned() {
        let mut follower = CameraFollower::new(0.12);
        // One second at 60 fps
        let recenters = (0..60).filter(|i| follower.offer(*i as f64 / 60.0)).count();
        assert!(recenters <= 9, "got {recenters}");
        assert!(recenters >= 7, "got {recenters}");
    }

    #[test]
    fn test_reset_reopens_the_gate() {
        let mut follower = CameraFollower::new(0.12);
        assert!(follower.offer(2.0));
        follower.reset();
        assert!(follower.offer(2.01));
    }
}
