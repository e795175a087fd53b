//! Playback and interaction state machine for the tour.
//!
//! The controller owns the only mutable copy of the playback state. It is
//! driven by two reducers: [`TourController::handle`] for user intents and
//! [`TourController::tick`] once per rendered frame. Neither performs side
//! effects; both return the effects the presentation layer should apply.

use bevy::prelude::*;

use crate::config::TourConfig;
use crate::geo::Metric;
use crate::tour::animation::{Autoplay, DirectJump};
use crate::tour::follow::CameraFollower;
use crate::tour::route::{clamp_progress, Route};

/// Slack when comparing the current progress against a waypoint, so an
/// exact hit counts as an arrival.
const CROSSING_EPSILON: f64 = 1e-9;

/// Why the tour is not playing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PauseReason {
    /// Not started yet, or the route has been flown to the end
    Idle,
    /// Stopped at a waypoint to show its popup
    Popup,
    /// Paused (or cancelled) by the user
    User,
}

/// Motion state. A direct jump can only exist while paused, so autoplay and
/// jumps are mutually exclusive by construction.
#[derive(Clone, Debug, PartialEq)]
pub enum Phase<P> {
    Playing(Autoplay),
    Paused {
        reason: PauseReason,
        jump: Option<DirectJump<P>>,
    },
}

/// User intent reported by the presentation layer.
#[derive(Message, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TourIntent {
    TogglePlayback,
    Play,
    Pause,
    SelectWaypoint(usize),
    ClosePopup,
    Cancel,
}

/// Side effect requested by the controller.
#[derive(Clone, Debug, PartialEq)]
pub enum TourEffect<P> {
    /// Pan the viewport to this point
    Recenter(P),
    /// Zoom out to at most this level
    ClampZoom(f32),
    PopupOpened(usize),
    PopupClosed(usize),
    Arrived(usize),
    Started,
    Paused(PauseReason),
    Finished,
}

/// Snapshot of everything the presentation layer displays.
#[derive(Clone, Debug, PartialEq)]
pub struct TourView<P> {
    pub position: P,
    pub heading: f64,
    pub progress: f64,
    pub active_index: usize,
    pub open_popup: Option<usize>,
    pub open_popup_id: Option<String>,
    pub is_playing: bool,
    pub pause_reason: Option<PauseReason>,
    pub jump_active: bool,
    pub remaining_distance: f64,
    pub total_distance: f64,
}

/// Work decided while the phase is borrowed, applied afterwards.
enum Step<P> {
    Autoplay { progress: f64, finished: bool },
    Jump { position: P, heading: f64, target: usize, landed: bool },
    Idle,
}

pub struct TourController<M: Metric> {
    route: Route<M>,
    ids: Vec<String>,
    waypoint_progresses: Vec<f64>,
    config: TourConfig,
    phase: Phase<M::Point>,
    progress: f64,
    active_index: usize,
    /// Lowest waypoint index autoplay has not arrived at yet
    next_arrival: usize,
    open_popup: Option<usize>,
    position: M::Point,
    heading: f64,
    follower: CameraFollower,
}

impl<M: Metric> TourController<M> {
    /// Build a controller over `(id, position)` stops in traversal order.
    pub fn new(stops: Vec<(String, M::Point)>, config: TourConfig) -> Self {
        let (ids, points): (Vec<String>, Vec<M::Point>) = stops.into_iter().unzip();
        let route = Route::<M>::new(points);
        let waypoint_progresses = route.waypoint_progresses();
        let (position, heading) = route.position_at_progress(0.0);
        let phase = if config.autoplay_on_start {
            Phase::Playing(Autoplay::new(0.0, config.autoplay_secs))
        } else {
            Phase::Paused {
                reason: PauseReason::Idle,
                jump: None,
            }
        };
        let follower = CameraFollower::new(config.recenter_interval_ms as f64 / 1000.0);

        Self {
            route,
            ids,
            waypoint_progresses,
            config,
            phase,
            progress: 0.0,
            active_index: 0,
            next_arrival: 1,
            open_popup: None,
            position,
            heading,
            follower,
        }
    }

    pub fn route(&self) -> &Route<M> {
        &self.route
    }

    pub fn phase(&self) -> &Phase<M::Point> {
        &self.phase
    }

    pub fn is_playing(&self) -> bool {
        matches!(self.phase, Phase::Playing(_))
    }

    pub fn pause_reason(&self) -> Option<PauseReason> {
        match self.phase {
            Phase::Playing(_) => None,
            Phase::Paused { reason, .. } => Some(reason),
        }
    }

    pub fn jump_active(&self) -> bool {
        matches!(self.phase, Phase::Paused { jump: Some(_), .. })
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn active_index(&self) -> usize {
        self.active_index
    }

    pub fn open_popup(&self) -> Option<usize> {
        self.open_popup
    }

    pub fn position(&self) -> M::Point {
        self.position
    }

    pub fn heading(&self) -> f64 {
        self.heading
    }

    pub fn view(&self) -> TourView<M::Point> {
        TourView {
            position: self.position,
            heading: self.heading,
            progress: self.progress,
            active_index: self.active_index,
            open_popup: self.open_popup,
            open_popup_id: self.open_popup.and_then(|i| self.ids.get(i).cloned()),
            is_playing: self.is_playing(),
            pause_reason: self.pause_reason(),
            jump_active: self.jump_active(),
            remaining_distance: self.route.remaining_distance(self.progress),
            total_distance: self.route.total(),
        }
    }

    // =========================================================================
    // Intents
    // =========================================================================

    /// Apply a user intent. Intents that are invalid in the current state
    /// are ignored and produce no effects.
    pub fn handle(&mut self, intent: TourIntent) -> Vec<TourEffect<M::Point>> {
        let mut effects = Vec::new();
        match intent {
            TourIntent::TogglePlayback => {
                if self.is_playing() {
                    self.pause(&mut effects);
                } else {
                    self.play(&mut effects);
                }
            }
            TourIntent::Play => {
                if self.is_playing() {
                    debug!("Play ignored: already playing");
                } else {
                    self.play(&mut effects);
                }
            }
            TourIntent::Pause => {
                if self.is_playing() {
                    self.pause(&mut effects);
                } else {
                    debug!("Pause ignored: already paused");
                }
            }
            TourIntent::SelectWaypoint(index) => self.select_waypoint(index, &mut effects),
            TourIntent::ClosePopup => self.close_popup(&mut effects),
            TourIntent::Cancel => self.cancel(&mut effects),
        }
        effects
    }

    fn play(&mut self, effects: &mut Vec<TourEffect<M::Point>>) {
        if self.progress >= 1.0 {
            info!("Replaying tour from the first waypoint");
            self.close_open_popup(effects);
            self.active_index = 0;
            self.next_arrival = 1;
            self.commit_progress(0.0);
        }
        self.start_autoplay(effects);
    }

    fn start_autoplay(&mut self, effects: &mut Vec<TourEffect<M::Point>>) {
        // Replacing the phase drops any jump still in flight
        self.phase = Phase::Playing(Autoplay::new(self.progress, self.config.autoplay_secs));
        self.follower.reset();
        info!("Tour playing from {:.0}%", self.progress * 100.0);
        effects.push(TourEffect::Started);
    }

    fn pause(&mut self, effects: &mut Vec<TourEffect<M::Point>>) {
        self.phase = Phase::Paused {
            reason: PauseReason::User,
            jump: None,
        };
        info!("Tour paused at {:.0}%", self.progress * 100.0);
        effects.push(TourEffect::Paused(PauseReason::User));
    }

    fn select_waypoint(&mut self, index: usize, effects: &mut Vec<TourEffect<M::Point>>) {
        let reason = match self.phase {
            Phase::Playing(_) => {
                debug!("Waypoint {} ignored: markers are inactive during autoplay", index);
                return;
            }
            Phase::Paused { reason, .. } => reason,
        };
        let Some(&to) = self.route.points().get(index) else {
            debug!("Waypoint {} ignored: out of range", index);
            return;
        };

        self.close_open_popup(effects);
        self.active_index = index;

        let jump = DirectJump::new::<M>(self.position, to, index, &self.config.jump);
        info!(
            "Flying to waypoint {} over {:.0} ms",
            self.ids.get(index).map(String::as_str).unwrap_or("?"),
            jump.duration_secs * 1000.0
        );
        // A jump already in flight is superseded here
        self.phase = Phase::Paused {
            reason,
            jump: Some(jump),
        };

        effects.push(TourEffect::Recenter(to));
        effects.push(TourEffect::ClampZoom(self.config.max_zoom_on_click));
    }

    fn close_popup(&mut self, effects: &mut Vec<TourEffect<M::Point>>) {
        if self.open_popup.is_none() {
            debug!("ClosePopup ignored: no popup open");
            return;
        }
        self.close_open_popup(effects);

        let resumes = matches!(
            self.phase,
            Phase::Paused {
                reason: PauseReason::Popup,
                jump: None,
            }
        );
        if resumes && self.config.pause_on_popup {
            self.start_autoplay(effects);
        }
    }

    fn cancel(&mut self, effects: &mut Vec<TourEffect<M::Point>>) {
        let moving = matches!(
            self.phase,
            Phase::Playing(_) | Phase::Paused { jump: Some(_), .. }
        );
        if !moving {
            debug!("Cancel ignored: nothing in motion");
            return;
        }
        self.phase = Phase::Paused {
            reason: PauseReason::User,
            jump: None,
        };
        info!("Tour motion cancelled");
        effects.push(TourEffect::Paused(PauseReason::User));
    }

    // =========================================================================
    // Frames
    // =========================================================================

    /// Advance whichever motion is active to the frame timestamp `now`
    /// (seconds, monotonic).
    pub fn tick(&mut self, now: f64) -> Vec<TourEffect<M::Point>> {
        let mut effects = Vec::new();

        let step = match &mut self.phase {
            Phase::Playing(autoplay) => {
                let (progress, finished) = autoplay.progress_at(now);
                Step::Autoplay { progress, finished }
            }
            Phase::Paused {
                jump: Some(jump), ..
            } => {
                let (position, landed) = jump.sample::<M>(now);
                Step::Jump {
                    position,
                    heading: jump.heading,
                    target: jump.target,
                    landed,
                }
            }
            Phase::Paused { jump: None, .. } => Step::Idle,
        };

        match step {
            Step::Autoplay { progress, finished } => {
                self.advance_autoplay(progress, finished, now, &mut effects)
            }
            Step::Jump {
                position,
                heading,
                target,
                landed,
            } => self.advance_jump(position, heading, target, landed, now, &mut effects),
            Step::Idle => {}
        }
        effects
    }

    fn advance_autoplay(
        &mut self,
        progress: f64,
        finished: bool,
        now: f64,
        effects: &mut Vec<TourEffect<M::Point>>,
    ) {
        if self.route.len() < 2 {
            self.finish(effects);
            return;
        }

        // Waypoints before `next_arrival` have been reached already, so
        // stops sharing a position still arrive one at a time.
        for index in self.next_arrival..self.waypoint_progresses.len() {
            let waypoint_progress = self.waypoint_progresses[index];
            if waypoint_progress > progress + CROSSING_EPSILON {
                break;
            }

            self.next_arrival = index + 1;
            self.active_index = index;
            self.show_popup(index, effects);
            effects.push(TourEffect::Arrived(index));

            if self.config.pause_on_popup {
                // Stop on the waypoint itself; later crossings from this frame
                // are picked up by the next run.
                self.commit_progress(waypoint_progress);
                self.phase = Phase::Paused {
                    reason: PauseReason::Popup,
                    jump: None,
                };
                info!(
                    "Arrived at {}, paused for popup",
                    self.ids.get(index).map(String::as_str).unwrap_or("?")
                );
                effects.push(TourEffect::Recenter(self.position));
                effects.push(TourEffect::Paused(PauseReason::Popup));
                return;
            }
        }

        self.commit_progress(progress);
        if self.follower.offer(now) {
            effects.push(TourEffect::Recenter(self.position));
        }

        if finished || self.progress >= 1.0 {
            self.finish(effects);
        }
    }

    fn advance_jump(
        &mut self,
        position: M::Point,
        heading: f64,
        target: usize,
        landed: bool,
        now: f64,
        effects: &mut Vec<TourEffect<M::Point>>,
    ) {
        self.position = position;
        self.heading = heading;

        if !landed {
            if self.follower.offer(now) {
                effects.push(TourEffect::Recenter(position));
            }
            return;
        }

        if let Phase::Paused { jump, .. } = &mut self.phase {
            *jump = None;
        }
        self.progress = self.route.progress_for_waypoint(target);
        self.active_index = target;
        self.next_arrival = target + 1;
        self.show_popup(target, effects);
        info!(
            "Landed at {}",
            self.ids.get(target).map(String::as_str).unwrap_or("?")
        );
        effects.push(TourEffect::Arrived(target));
        effects.push(TourEffect::Recenter(position));
    }

    fn finish(&mut self, effects: &mut Vec<TourEffect<M::Point>>) {
        if self.route.total() > 0.0 {
            self.commit_progress(1.0);
        }
        self.phase = Phase::Paused {
            reason: PauseReason::Idle,
            jump: None,
        };
        info!("Tour finished");
        effects.push(TourEffect::Finished);
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn commit_progress(&mut self, progress: f64) {
        self.progress = clamp_progress(progress);
        let (position, heading) = self.route.position_at_progress(self.progress);
        self.position = position;
        self.heading = heading;
    }

    fn show_popup(&mut self, index: usize, effects: &mut Vec<TourEffect<M::Point>>) {
        if self.open_popup == Some(index) {
            return;
        }
        self.close_open_popup(effects);
        self.open_popup = Some(index);
        effects.push(TourEffect::PopupOpened(index));
    }

    fn close_open_popup(&mut self, effects: &mut Vec<TourEffect<M::Point>>) {
        if let Some(index) = self.open_popup.take() {
            effects.push(TourEffect::PopupClosed(index));
        }
    }
}
