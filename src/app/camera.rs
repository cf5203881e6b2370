//! Camera transitions with cubic ease-out.
//!
//! A transition always starts from the viewpoint currently on screen, so a
//! new `go_to` issued mid-flight takes over smoothly from wherever the old
//! one had got to.

use std::time::{Duration, Instant};

use crate::story::route::MapPoint;

/// What the map panel is looking at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewpoint {
    pub center: MapPoint,
    /// Half-width of the visible area in map units.
    pub extent: f64,
}

impl Viewpoint {
    pub fn new(center: MapPoint, extent: f64) -> Self {
        Self { center, extent }
    }

    fn lerp(self, other: Viewpoint, t: f64) -> Viewpoint {
        Viewpoint {
            center: self.center.lerp(other.center, t),
            // Interpolate zoom geometrically so zooming feels uniform.
            extent: self.extent * (other.extent / self.extent).powf(t),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Transition {
    from: Viewpoint,
    to: Viewpoint,
    started: Instant,
    duration: Duration,
}

/// Time-based viewpoint animator.
#[derive(Debug, Clone)]
pub struct CameraTween {
    shown: Viewpoint,
    active: Option<Transition>,
}

impl CameraTween {
    pub fn new(initial: Viewpoint) -> Self {
        Self {
            shown: initial,
            active: None,
        }
    }

    /// Begin moving towards `to`, superseding any transition in flight.
    pub fn start(&mut self, to: Viewpoint, duration: Duration, now: Instant) {
        if duration.is_zero() {
            self.shown = to;
            self.active = None;
            return;
        }
        self.active = Some(Transition {
            from: self.shown,
            to,
            started: now,
            duration,
        });
    }

    /// Advance to `now`.  Call once per frame.
    pub fn tick(&mut self, now: Instant) {
        let Some(tr) = self.active else {
            return;
        };
        let t = now.saturating_duration_since(tr.started).as_secs_f64() / tr.duration.as_secs_f64();
        if t >= 1.0 {
            self.shown = tr.to;
            self.active = None;
            return;
        }
        // Ease-out cubic: 1 - (1-t)^3
        let eased = 1.0 - (1.0 - t).powi(3);
        self.shown = tr.from.lerp(tr.to, eased);
    }

    /// The viewpoint currently on screen.
    pub fn current(&self) -> Viewpoint {
        self.shown
    }

    /// Where the camera is heading (the current viewpoint when idle).
    pub fn target(&self) -> Viewpoint {
        self.active.map_or(self.shown, |tr| tr.to)
    }

    pub fn is_animating(&self) -> bool {
        self.active.is_some()
    }
}
