//! Inertial coasting after a flick
//!
//! Velocity decays quadratically over the deceleration time:
//!
//! ```text
//! decay(t) = 1 - min(1, (t - t0) / T)
//! v(t)     = v0 * decay(t)^2
//! ```
//!
//! Each tick pans by `v(t) * (t - t_prev)` pixels, so the distance covered
//! does not depend on the host's frame rate. The host drives ticks; the
//! controller never schedules anything itself.

use crate::input::Millis;
use crate::viewport::Viewport;

/// Below this |px/ms| the coast is considered settled
pub const SETTLE_VELOCITY: f64 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Coast {
    initial_velocity: f64,
    start_time: Millis,
    last_tick: Millis,
}

/// Result of a single inertia tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoastStep {
    /// Nothing was coasting
    Idle,
    /// Still moving; request another tick
    Coasting { changed: bool },
    /// Coasting stopped on this tick
    Settled { changed: bool },
}

#[derive(Debug, Clone)]
pub struct InertiaController {
    /// `None` disables coasting
    deceleration_time: Option<Millis>,
    coast: Option<Coast>,
}

impl InertiaController {
    pub fn new(deceleration_time: Option<Millis>) -> Self {
        Self {
            deceleration_time: deceleration_time.filter(|t| t.is_finite() && *t > 0.0),
            coast: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.coast.is_some()
    }

    pub fn deceleration_time(&self) -> Option<Millis> {
        self.deceleration_time
    }

    /// Begin coasting with `velocity` px/ms measured at `timestamp`
    ///
    /// Returns whether a coast actually started.
    pub fn start(&mut self, velocity: f64, timestamp: Millis) -> bool {
        if self.deceleration_time.is_none() || !velocity.is_finite() || velocity.abs() < SETTLE_VELOCITY {
            self.coast = None;
            return false;
        }
        log::debug!("InertiaController: coast started at {:.3}px/ms", velocity);
        self.coast = Some(Coast {
            initial_velocity: velocity,
            start_time: timestamp,
            last_tick: timestamp,
        });
        true
    }

    /// Stop coasting; returns whether a coast was in flight
    pub fn cancel(&mut self) -> bool {
        let was_active = self.coast.take().is_some();
        if was_active {
            log::debug!("InertiaController: coast cancelled");
        }
        was_active
    }

    /// Coasting velocity at `now` (px/ms), 0 when idle
    pub fn velocity(&self, now: Millis) -> f64 {
        match (self.coast, self.deceleration_time) {
            (Some(coast), Some(t)) => {
                let decay = Self::decay(now - coast.start_time, t);
                coast.initial_velocity * decay * decay
            }
            _ => 0.0,
        }
    }

    /// Advance the coast to `now` and pan the viewport
    pub fn tick(&mut self, now: Millis, viewport: &mut Viewport) -> CoastStep {
        let (Some(mut coast), Some(t)) = (self.coast, self.deceleration_time) else {
            return CoastStep::Idle;
        };

        let decay = Self::decay(now - coast.start_time, t);
        let velocity = coast.initial_velocity * decay * decay;
        if decay <= 0.0 || velocity.abs() < SETTLE_VELOCITY {
            return self.settle(false);
        }

        let dt = (now - coast.last_tick).max(0.0);
        coast.last_tick = now;
        self.coast = Some(coast);

        // Velocity is pointer motion; content follows the pointer
        let step = velocity * dt;
        let outcome = viewport.pan_by_pixels(-step);
        log::trace!("InertiaController: v={:.4}px/ms step={:.2}px", velocity, step);

        if outcome.clamped {
            return self.settle(outcome.changed);
        }
        CoastStep::Coasting {
            changed: outcome.changed,
        }
    }

    fn settle(&mut self, changed: bool) -> CoastStep {
        self.coast = None;
        log::debug!("InertiaController: settled");
        CoastStep::Settled { changed }
    }

    fn decay(elapsed: Millis, deceleration_time: Millis) -> f64 {
        1.0 - (elapsed.max(0.0) / deceleration_time).min(1.0)
    }
}

impl Default for InertiaController {
    fn default() -> Self {
        Self::new(Some(750.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wide_viewport() -> Viewport {
        let mut vp = Viewport::new(1_000_000, 100);
        vp.set_range(500_000, 501_000);
        vp
    }

    #[test]
    fn test_velocity_strictly_decreases_to_zero() {
        let mut inertia = InertiaController::new(Some(750.0));
        assert!(inertia.start(2.0, 0.0));

        let mut previous = inertia.velocity(0.0);
        for t in (16..750).step_by(16) {
            let v = inertia.velocity(t as f64);
            assert!(v < previous, "Velocity should fall at t={}", t);
            assert!(v > 0.0);
            previous = v;
        }
        assert_eq!(inertia.velocity(750.0), 0.0, "Zero at the deceleration time");
        assert_eq!(inertia.velocity(2000.0), 0.0);
    }

    #[test]
    fn test_coast_settles_by_deceleration_time() {
        let mut vp = wide_viewport();
        let mut inertia = InertiaController::new(Some(750.0));
        inertia.start(-1.0, 0.0);

        let mut settled_at = None;
        let mut t = 0.0;
        while t <= 1000.0 {
            t += 16.0;
            if let CoastStep::Settled { .. } = inertia.tick(t, &mut vp) {
                settled_at = Some(t);
                break;
            }
        }
        let settled_at = settled_at.expect("coast should settle");
        assert!(settled_at <= 750.0 + 16.0, "Settled late at {}", settled_at);
        assert!(!inertia.is_active());
        assert!(vp.start() > 500_000, "Leftward flick moves forward in the buffer");
        assert_eq!(inertia.tick(t + 16.0, &mut vp), CoastStep::Idle);
    }

    #[test]
    fn test_distance_independent_of_frame_rate() {
        let run = |interval: f64| {
            let mut vp = wide_viewport();
            let mut inertia = InertiaController::new(Some(500.0));
            inertia.start(-1.0, 0.0);
            let mut t = 0.0;
            while inertia.is_active() {
                t += interval;
                inertia.tick(t, &mut vp);
            }
            vp.start() as f64
        };

        let fast = run(4.0);
        let slow = run(16.0);
        // Integral of v0 * (1 - t/T)^2 is v0 * T / 3, about 167px = 1667 samples
        assert!((fast - slow).abs() < 200.0, "fast={} slow={}", fast, slow);
        assert!((fast - 501_667.0).abs() < 150.0, "fast={}", fast);
    }

    #[test]
    fn test_boundary_clamp_stops_on_same_tick() {
        let mut vp = Viewport::new(10_000, 100);
        vp.set_range(50, 1050);
        let mut inertia = InertiaController::new(Some(750.0));

        // Pointer flung right: window moves toward index 0
        inertia.start(5.0, 0.0);
        let step = inertia.tick(16.0, &mut vp);
        assert_eq!(step, CoastStep::Settled { changed: true });
        assert_eq!(vp.start(), 0);
        assert_eq!(inertia.velocity(17.0), 0.0, "Hard stop at the boundary");
        assert!(!inertia.is_active());
    }

    #[test]
    fn test_disabled_coasting_never_starts() {
        let mut vp = wide_viewport();
        let mut inertia = InertiaController::new(None);
        assert!(!inertia.start(3.0, 0.0));
        assert_eq!(inertia.tick(16.0, &mut vp), CoastStep::Idle);
    }

    #[test]
    fn test_cancel_preempts() {
        let mut vp = wide_viewport();
        let mut inertia = InertiaController::default();
        inertia.start(1.0, 0.0);
        inertia.tick(16.0, &mut vp);

        assert!(inertia.cancel());
        assert!(!inertia.cancel(), "Second cancel is a no-op");
        assert_eq!(inertia.tick(32.0, &mut vp), CoastStep::Idle);
    }
}
